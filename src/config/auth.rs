//! Websocket admission configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Admission configuration for websocket connections
///
/// Without a token every connection is admitted and authorization is
/// expected to happen in front of the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Shared bearer token required to open a websocket connection
    pub ws_token: Option<SecretString>,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.ws_token {
            Some(token) if token.expose_secret().trim().is_empty() => {
                Err(ValidationError::EmptyWsToken)
            }
            _ => Ok(()),
        }
    }
}
