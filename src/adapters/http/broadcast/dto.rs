//! HTTP DTOs for the broadcast endpoint.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{BroadcastMessageCommand, FieldError};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /v1/internal/broadcast-message`.
///
/// Both fields are optional here; presence is checked by the handler so the
/// caller gets one error per missing field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

impl From<BroadcastMessageRequest> for BroadcastMessageCommand {
    fn from(req: BroadcastMessageRequest) -> Self {
        Self {
            message: req.message,
            topic: req.topic,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastAcceptedResponse {
    pub ok: bool,
}

impl BroadcastAcceptedResponse {
    pub fn accepted() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

impl From<FieldError> for FieldErrorResponse {
    fn from(error: FieldError) -> Self {
        Self {
            field: error.field,
            message: error.message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldErrorResponse>,
}

impl From<Vec<FieldError>> for ValidationErrorResponse {
    fn from(errors: Vec<FieldError>) -> Self {
        Self {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }
}

/// Body returned when the request could not be parsed at all.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidInputResponse {
    pub error: String,
}

impl Default for InvalidInputResponse {
    fn default() -> Self {
        Self {
            error: "Invalid input.".to_string(),
        }
    }
}
