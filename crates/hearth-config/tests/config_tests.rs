// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Hearth configuration system.

use std::io::Write;

use hearth_config::diagnostic::ConfigError;
use miette::Diagnostic;
use hearth_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_str,
    render_errors_to_string,
};

#[test]
fn valid_toml_deserializes_into_hearth_config() {
    let toml = r#"
[host]
name = "test-host"
log_level = "debug"

[http]
host = "0.0.0.0"
port = 8088
enable_plugin_endpoints = false
plugin_prefix = "/ext"

[plugins]
config_dir = "/srv/hearth/plugins"

[dispatch]
collaborator_timeout_ms = 250

[discovery]
enabled = false
timeout_ms = 1000
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.host.name, "test-host");
    assert_eq!(config.host.log_level, "debug");
    assert_eq!(config.http.host, "0.0.0.0");
    assert_eq!(config.http.port, 8088);
    assert!(!config.http.enable_plugin_endpoints);
    assert_eq!(config.http.plugin_prefix, "/ext");
    assert_eq!(config.plugins.config_dir, "/srv/hearth/plugins");
    assert_eq!(config.dispatch.collaborator_timeout_ms, 250);
    assert!(!config.discovery.enabled);
    assert_eq!(config.discovery.timeout_ms, 1000);
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_and_validate_str("").expect("empty config is valid");
    assert_eq!(config.host.name, "hearth");
    assert_eq!(config.http.plugin_prefix, "/plugins");
}

#[test]
fn unknown_key_gets_a_suggestion() {
    let errors = load_and_validate_str("[http]\nprot = 1\n").expect_err("unknown key");
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "prot");
            assert_eq!(suggestion.as_deref(), Some("port"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[plugin]\nconfig_dir = \"x\"\n").expect_err("bad section");
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[http]\nport = \"eighty\"\n").expect_err("bad type");
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn validation_errors_surface_through_str_loader() {
    let errors =
        load_and_validate_str("[dispatch]\ncollaborator_timeout_ms = 0\n").expect_err("zero");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn rendered_diagnostic_contains_help() {
    let errors = load_and_validate_str("[host]\nnaem = \"x\"\n").expect_err("typo");
    let help = errors[0].help().expect("unknown keys carry help").to_string();
    assert!(help.starts_with("did you mean `name`?"), "got: {help}");
    let rendered = render_errors_to_string(&errors);
    assert!(rendered.contains("naem"), "got: {rendered}");
}

#[test]
fn loads_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[plugins]\nconfig_dir = \"/opt/plugins\"").unwrap();
    let config = load_and_validate_path(file.path()).expect("file config loads");
    assert_eq!(config.plugins.config_dir, "/opt/plugins");
}
