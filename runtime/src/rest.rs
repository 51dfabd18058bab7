// Copyright 2026 Pricewalk Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST wrapper.
//!
//! Thin by intent: validate the query, run one traversal with its own
//! session, relay the result as JSON. Traversal events are also streamed
//! as Server-Sent Events.

use crate::catalog::profile::SiteProfile;
use crate::config::{BrowserEndpoint, TraversalConfig};
use crate::error::TraversalError;
use crate::events::{self, EventBus};
use crate::renderer::BrowserConnector;
use crate::traversal::{Traversal, TraversalReport};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "pricewalk";

/// Where each request's browser endpoint comes from.
#[derive(Debug, Clone)]
pub enum EndpointSource {
    /// Remote endpoint, re-read from the environment per request.
    Remote,
    /// Local Chromium, re-read from the environment per request.
    Local,
    /// A fixed endpoint.
    Fixed(BrowserEndpoint),
}

impl EndpointSource {
    fn resolve(&self) -> BrowserEndpoint {
        match self {
            EndpointSource::Remote => BrowserEndpoint::remote_from_env(),
            EndpointSource::Local => BrowserEndpoint::local_from_env(),
            EndpointSource::Fixed(endpoint) => endpoint.clone(),
        }
    }
}

/// State shared by all handlers.
pub struct AppState {
    pub connector: Arc<dyn BrowserConnector>,
    pub endpoint: EndpointSource,
    pub events: Arc<EventBus>,
}

impl AppState {
    fn traversal(&self) -> Traversal {
        Traversal::new(
            Arc::clone(&self.connector),
            self.endpoint.resolve(),
            TraversalConfig::from_env(),
            SiteProfile::embedded().clone(),
            Arc::clone(&self.events),
        )
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/catalog", get(handle_catalog))
        .route("/api/v1/events", get(events_sse))
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server on the given port.
pub async fn start(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("REST API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// `{"status":"success","total_items":N,"data":[...]}`.
pub fn success_envelope(report: &TraversalReport) -> Value {
    json!({
        "status": "success",
        "total_items": report.total_items(),
        "data": report.items,
    })
}

/// `{"status":"error","message":...}`.
pub fn error_envelope(message: &str) -> Value {
    json!({
        "status": "error",
        "message": message,
    })
}

// ── Handlers ────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(json!({
        "status": "UP",
        "service": SERVICE_NAME,
    }))
}

#[derive(serde::Deserialize, Default)]
pub struct CatalogParams {
    pub url: Option<String>,
}

/// Run one traversal for `?url=`.
pub async fn handle_catalog(
    Query(params): Query<CatalogParams>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<Value>) {
    let url = match params.url.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_envelope("Missing or empty 'url' parameter")),
            )
        }
    };

    let request_id = uuid::Uuid::new_v4();
    info!(%request_id, "catalog request for {url}");

    match state.traversal().run(&url).await {
        Ok(report) => (StatusCode::OK, Json(success_envelope(&report))),
        Err(e) => {
            warn!(%request_id, code = e.code(), "catalog request failed: {e}");
            (status_for(&e), Json(error_envelope(&e.to_string())))
        }
    }
}

fn status_for(err: &TraversalError) -> StatusCode {
    match err {
        TraversalError::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// SSE query parameters.
#[derive(serde::Deserialize, Default)]
struct EventsParams {
    host: Option<String>,
}

/// Server-Sent Events endpoint for traversal events.
///
/// Optionally filters by target host via `?host=www.carrefour.pk`.
async fn events_sse(
    Query(params): Query<EventsParams>,
    State(state): State<Arc<AppState>>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.events.subscribe();
    let host_filter = params.host;

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(ref host) = host_filter {
                        if !events::event_matches_host(&event, host) {
                            continue;
                        }
                    }
                    if let Ok(json) = serde_json::to_string(&event) {
                        yield Ok(Event::default().data(json));
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(axum::response::sse::KeepAlive::default())
}
