// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up the admin routes, the plugin mount fallback, middleware, and
//! shared state.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::{delete, get, post, put},
};
use hearth_core::HearthError;
use hearth_registry::ComponentRegistry;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::mount::MountTable;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<ComponentRegistry>,
    pub mounts: Arc<MountTable>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(registry: Arc<ComponentRegistry>, mounts: Arc<MountTable>) -> Self {
        Self {
            registry,
            mounts,
            start_time: Instant::now(),
        }
    }
}

/// Gateway server configuration (mirrors `[http]` from hearth-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

async fn plugin_fallback(State(state): State<GatewayState>, req: Request<Body>) -> Response {
    state.mounts.dispatch(req).await
}

/// The full application router: admin API plus mounted plugin routes.
pub fn build_app(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::get_health))
        .route("/v1/registry/stats", get(handlers::get_stats))
        .route("/v1/plugins", get(handlers::get_plugins))
        .route("/v1/plugins/{name}", delete(handlers::delete_plugin))
        .route("/v1/components/{kind}", get(handlers::get_components))
        .route(
            "/v1/components/{kind}/{name}/enable",
            post(handlers::enable_component),
        )
        .route(
            "/v1/components/{kind}/{name}/disable",
            post(handlers::disable_component),
        )
        .route(
            "/v1/sessions/{session}/components/{kind}/{name}",
            put(handlers::put_session_override),
        )
        .route("/v1/sessions/{session}", delete(handlers::delete_session))
        .fallback(plugin_fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), HearthError> {
    let app = build_app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HearthError::Collaborator {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| HearthError::Collaborator {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
