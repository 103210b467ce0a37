// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the registry admin API.
//!
//! Handles GET /v1/health, GET /v1/registry/stats, GET /v1/plugins,
//! DELETE /v1/plugins/{name}, GET /v1/components/{kind},
//! POST /v1/components/{kind}/{name}/{enable|disable},
//! PUT /v1/sessions/{session}/components/{kind}/{name}, and
//! DELETE /v1/sessions/{session}.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hearth_core::{ComponentInfo, ComponentKind, HearthError, SessionId};
use hearth_registry::{PluginRecord, RegistryStats};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`HearthError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub HearthError);

impl From<HearthError> for ApiError {
    fn from(e: HearthError) -> Self {
        Self(e)
    }
}

/// HTTP status for each error class.
pub fn status_for(err: &HearthError) -> StatusCode {
    match err {
        HearthError::Validation(_) | HearthError::Config(_) => StatusCode::BAD_REQUEST,
        HearthError::NotFound(_) => StatusCode::NOT_FOUND,
        HearthError::Conflict { .. }
        | HearthError::DuplicatePlugin(_)
        | HearthError::PartialCascade { .. } => StatusCode::CONFLICT,
        HearthError::Dispatch { .. }
        | HearthError::Teardown { .. }
        | HearthError::Collaborator { .. } => StatusCode::BAD_GATEWAY,
        HearthError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        HearthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!(error = %self.0, "admin request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

fn parse_kind(raw: &str) -> Result<ComponentKind, ApiError> {
    ComponentKind::from_str(raw)
        .map_err(|_| ApiError(HearthError::Validation(format!("unknown component kind `{raw}`"))))
}

/// Response body for GET /v1/health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /v1/health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /v1/registry/stats
pub async fn get_stats(State(state): State<GatewayState>) -> Json<RegistryStats> {
    Json(state.registry.get_registry_stats().await)
}

/// GET /v1/plugins
pub async fn get_plugins(State(state): State<GatewayState>) -> Json<Vec<PluginRecord>> {
    Json(state.registry.get_all_plugins().await)
}

/// DELETE /v1/plugins/{name}
///
/// 200 with the teardown report when the plugin is gone, 409 with the report
/// when some components failed to tear down, 404 for unknown plugins.
pub async fn delete_plugin(
    State(state): State<GatewayState>,
    Path(name): Path<String>,
) -> Response {
    let report = state.registry.unregister_plugin(&name).await;
    if !report.found {
        return ApiError(HearthError::NotFound(format!("plugin `{name}`"))).into_response();
    }
    let status = if report.is_complete() {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(report)).into_response()
}

/// Query parameters for GET /v1/components/{kind}.
#[derive(Debug, Default, Deserialize)]
pub struct ComponentQuery {
    /// Resolve availability for this session.
    #[serde(default)]
    pub session: Option<String>,
    /// Include unavailable components.
    #[serde(default)]
    pub all: bool,
}

/// GET /v1/components/{kind}
pub async fn get_components(
    State(state): State<GatewayState>,
    Path(kind): Path<String>,
    Query(query): Query<ComponentQuery>,
) -> Result<Json<BTreeMap<String, ComponentInfo>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let components = if query.all {
        state.registry.get_components_by_type(kind).await
    } else {
        let session = query.session.map(SessionId);
        state
            .registry
            .get_enabled_components_by_type(kind, session.as_ref())
            .await
    };
    Ok(Json(components))
}

/// Response body for state changes.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub name: String,
    pub kind: ComponentKind,
    pub enabled: bool,
}

/// POST /v1/components/{kind}/{name}/enable
pub async fn enable_component(
    State(state): State<GatewayState>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Json<StateResponse>, ApiError> {
    set_enabled(&state, &kind, name, true).await
}

/// POST /v1/components/{kind}/{name}/disable
pub async fn disable_component(
    State(state): State<GatewayState>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Json<StateResponse>, ApiError> {
    set_enabled(&state, &kind, name, false).await
}

async fn set_enabled(
    state: &GatewayState,
    kind: &str,
    name: String,
    enabled: bool,
) -> Result<Json<StateResponse>, ApiError> {
    let kind = parse_kind(kind)?;
    state.registry.try_set_enabled(&name, kind, enabled).await?;
    Ok(Json(StateResponse { name, kind, enabled }))
}

/// Request body for PUT /v1/sessions/{session}/components/{kind}/{name}.
#[derive(Debug, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub enabled: bool,
}

/// PUT /v1/sessions/{session}/components/{kind}/{name}
pub async fn put_session_override(
    State(state): State<GatewayState>,
    Path((session, kind, name)): Path<(String, String, String)>,
    Json(body): Json<OverrideRequest>,
) -> Result<Json<StateResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let session = SessionId(session);
    if !kind.accepts_session_override() {
        return Err(ApiError(HearthError::Validation(format!(
            "{kind} components do not accept session overrides"
        ))));
    }
    if !state
        .registry
        .set_local_component_state(&session, &name, kind, body.enabled)
        .await
    {
        return Err(ApiError(HearthError::NotFound(format!("{kind}.{name}"))));
    }
    Ok(Json(StateResponse {
        name,
        kind,
        enabled: body.enabled,
    }))
}

/// Response body for DELETE /v1/sessions/{session}.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub session: String,
    pub cleared: usize,
}

/// DELETE /v1/sessions/{session}
pub async fn delete_session(
    State(state): State<GatewayState>,
    Path(session): Path<String>,
) -> Json<ClearedResponse> {
    let cleared = state.registry.clear_session(&SessionId(session.clone()));
    Json(ClearedResponse { session, cleared })
}
