// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hearth - a plugin host with a typed component registry.
//!
//! This is the binary entry point.

mod serve;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hearth_config::{ConfigError, HearthConfig};

/// Hearth - a plugin host with a typed component registry.
#[derive(Parser, Debug)]
#[command(name = "hearth", version, about, long_about = None)]
struct Cli {
    /// Load this file instead of the usual config hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the host and its admin API.
    Serve,
    /// Print registry statistics for the built-in plugin set as JSON.
    Stats,
    /// Validate the configuration and exit.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<HearthConfig, Vec<ConfigError>> {
    match path {
        Some(path) => hearth_config::load_and_validate_path(path),
        None => hearth_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            hearth_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Stats) => stats::run_stats(&config).await,
        Some(Commands::CheckConfig) => {
            println!(
                "hearth: config ok (host.name={}, http={}:{})",
                config.host.name, config.http.host, config.http.port
            );
            Ok(())
        }
        None => {
            println!("hearth: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
