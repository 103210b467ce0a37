// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime mount table for plugin routers.
//!
//! Plugin routers arrive after the server has started, so they cannot be
//! nested into the app at build time. [`MountTable`] keeps them in an
//! [`ArcSwap`]'d list and the app's fallback hands unmatched requests to
//! [`MountTable::dispatch`]. Several routers may share a prefix (one plugin,
//! several routers): they are tried in mount order and a 404 falls through
//! to the next one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hearth_core::{HearthError, HttpMount};
use tower::ServiceExt;
use tracing::{debug, info};

/// Largest request body buffered for plugin routes.
pub const MAX_PLUGIN_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Prefix owned by the admin API; plugins may not mount under it.
pub const RESERVED_PREFIX: &str = "/v1";

#[derive(Clone)]
struct Mounted {
    prefix: String,
    tags: Vec<String>,
    router: Router,
}

#[derive(Default)]
pub struct MountTable {
    mounts: ArcSwap<Vec<Mounted>>,
}

/// The part of `path` below `prefix`, if `path` is under it.
fn strip_mount_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(prefix, tags)` for every mounted router, in mount order.
    pub fn mounted(&self) -> Vec<(String, Vec<String>)> {
        self.mounts
            .load()
            .iter()
            .map(|m| (m.prefix.clone(), m.tags.clone()))
            .collect()
    }

    /// Route a request to the plugin routers mounted above its path.
    pub async fn dispatch(&self, req: Request<Body>) -> Response {
        let table = self.mounts.load_full();
        let path = req.uri().path().to_string();
        let mut candidates: Vec<(&Mounted, &str)> = table
            .iter()
            .filter_map(|m| strip_mount_prefix(&path, &m.prefix).map(|rest| (m, rest)))
            .collect();
        if candidates.is_empty() {
            return StatusCode::NOT_FOUND.into_response();
        }
        // Longest prefix first; stable sort keeps mount order within a prefix.
        candidates.sort_by_key(|(m, _)| std::cmp::Reverse(m.prefix.len()));

        let (parts, body) = req.into_parts();
        let Ok(bytes) = axum::body::to_bytes(body, MAX_PLUGIN_BODY_BYTES).await else {
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        };

        for (mounted, rest) in candidates {
            let path_and_query = match parts.uri.query() {
                Some(query) => format!("{rest}?{query}"),
                None => rest.to_string(),
            };
            let Ok(uri) = path_and_query.parse::<Uri>() else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let mut inner = Request::new(Body::from(bytes.clone()));
            *inner.method_mut() = parts.method.clone();
            *inner.uri_mut() = uri;
            *inner.version_mut() = parts.version;
            *inner.headers_mut() = parts.headers.clone();

            let response = match mounted.router.clone().oneshot(inner).await {
                Ok(response) => response,
                Err(never) => match never {},
            };
            if response.status() != StatusCode::NOT_FOUND {
                return response;
            }
            debug!(
                prefix = %mounted.prefix,
                path = %path,
                "plugin router did not match; trying next"
            );
        }
        StatusCode::NOT_FOUND.into_response()
    }
}

#[async_trait]
impl HttpMount for MountTable {
    async fn mount(
        &self,
        routes: Router,
        prefix: &str,
        tags: &[String],
    ) -> Result<(), HearthError> {
        if !prefix.starts_with('/') || (prefix.len() > 1 && prefix.ends_with('/')) {
            return Err(HearthError::collaborator(format!(
                "mount prefix `{prefix}` must start with `/` and have no trailing slash"
            )));
        }
        if strip_mount_prefix(prefix, RESERVED_PREFIX).is_some() {
            return Err(HearthError::collaborator(format!(
                "mount prefix `{prefix}` is reserved for the admin API"
            )));
        }
        let entry = Mounted {
            prefix: prefix.to_string(),
            tags: tags.to_vec(),
            router: routes,
        };
        self.mounts.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(entry.clone());
            Arc::new(next)
        });
        info!(prefix, ?tags, "plugin routes mounted");
        Ok(())
    }
}
