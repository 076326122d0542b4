//! HTTP routes for the broadcast endpoint.

use axum::{middleware, routing::post, Router};

use crate::adapters::http::middleware::{idempotency_middleware, IdempotencyCache};

use super::handlers::{broadcast_message, BroadcastHandlers};

/// Creates the broadcast router, mounted under `/v1/internal`.
///
/// Retries carrying the same `X-Idempotency-Key` are answered from `idempotency`
/// instead of broadcasting again.
pub fn broadcast_routes(handlers: BroadcastHandlers, idempotency: IdempotencyCache) -> Router {
    Router::new()
        .route("/broadcast-message", post(broadcast_message))
        .with_state(handlers)
        .route_layer(middleware::from_fn_with_state(idempotency, idempotency_middleware))
}
