//! HTTP handlers for operational endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::ErrorResponse;
use crate::application::hub::HubHandle;

#[derive(Clone)]
pub struct SystemState {
    hub: HubHandle,
    replica_id: Option<String>,
}

impl SystemState {
    pub fn new(hub: HubHandle, replica_id: Option<String>) -> Self {
        Self { hub, replica_id }
    }
}

/// GET / - Banner identifying the replica
pub async fn root(State(state): State<SystemState>) -> String {
    format!("So exotic! {}", state.replica_id.as_deref().unwrap_or_default())
}

/// GET /health - Liveness check
pub async fn health() -> &'static str {
    "I'm healthy!"
}

/// GET /metrics - Registry counters
pub async fn metrics(State(state): State<SystemState>) -> Response {
    match state.hub.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::service_unavailable("Hub is not running")),
        )
            .into_response(),
    }
}
