//! ConnectionGatekeeper port - admission control in front of the hub.
//!
//! The hub itself performs no authorization. The websocket endpoint asks the
//! gatekeeper first and only registers the connection when it is admitted.

use async_trait::async_trait;
use thiserror::Error;

/// Credentials presented by a client asking to open a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionRequest {
    /// Token from `Authorization: Bearer …` or the `token` query parameter.
    pub bearer_token: Option<String>,
}

impl AdmissionRequest {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }
}

/// Reasons a connection was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("Credentials required")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Port deciding whether a connection may be handed to the hub.
#[async_trait]
pub trait ConnectionGatekeeper: Send + Sync {
    async fn admit(&self, request: &AdmissionRequest) -> Result<(), AdmissionError>;
}
