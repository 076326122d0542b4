//! HTTP handlers for the broadcast endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::ErrorResponse;
use crate::application::handlers::{BroadcastMessageError, BroadcastMessageHandler};
use crate::ports::PublishError;

use super::dto::{
    BroadcastAcceptedResponse, BroadcastMessageRequest, InvalidInputResponse,
    ValidationErrorResponse,
};

#[derive(Clone)]
pub struct BroadcastHandlers {
    handler: Arc<BroadcastMessageHandler>,
}

impl BroadcastHandlers {
    pub fn new(handler: Arc<BroadcastMessageHandler>) -> Self {
        Self { handler }
    }
}

/// POST /v1/internal/broadcast-message - Broadcast a message to a topic
pub async fn broadcast_message(
    State(handlers): State<BroadcastHandlers>,
    payload: Result<Json<BroadcastMessageRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unable to parse broadcast request body");
            return (StatusCode::BAD_REQUEST, Json(InvalidInputResponse::default())).into_response();
        }
    };

    match handlers.handler.handle(req.into()).await {
        Ok(()) => (StatusCode::OK, Json(BroadcastAcceptedResponse::accepted())).into_response(),
        Err(e) => handle_broadcast_error(e),
    }
}

fn handle_broadcast_error(error: BroadcastMessageError) -> Response {
    match error {
        BroadcastMessageError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            Json(ValidationErrorResponse::from(errors)),
        )
            .into_response(),
        BroadcastMessageError::Publish(PublishError::HubUnavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::service_unavailable("Hub is not accepting broadcasts")),
        )
            .into_response(),
        BroadcastMessageError::Publish(e) => {
            tracing::error!(error = %e, "Broadcast submission failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(e.to_string())),
            )
                .into_response()
        }
    }
}
