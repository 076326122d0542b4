//! Gatekeeper that requires a shared bearer token.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::ports::{AdmissionError, AdmissionRequest, ConnectionGatekeeper};

/// Admits connections presenting exactly the configured token.
pub struct StaticTokenGatekeeper {
    token: SecretString,
}

impl StaticTokenGatekeeper {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl ConnectionGatekeeper for StaticTokenGatekeeper {
    async fn admit(&self, request: &AdmissionRequest) -> Result<(), AdmissionError> {
        let presented = request
            .bearer_token
            .as_deref()
            .ok_or(AdmissionError::MissingCredentials)?;

        let expected = self.token.expose_secret().as_bytes();
        if bool::from(presented.as_bytes().ct_eq(expected)) {
            tracing::debug!("Authorized new ws connection");
            Ok(())
        } else {
            tracing::warn!("Rejected ws connection with invalid token");
            Err(AdmissionError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gatekeeper() -> StaticTokenGatekeeper {
        StaticTokenGatekeeper::new(SecretString::new("s3cret".to_string()))
    }

    #[tokio::test]
    async fn matching_token_is_admitted() {
        let result = gatekeeper().admit(&AdmissionRequest::with_token("s3cret")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_token_is_refused() {
        let result = gatekeeper().admit(&AdmissionRequest::default()).await;
        assert_eq!(result, Err(AdmissionError::MissingCredentials));
    }

    #[tokio::test]
    async fn wrong_or_prefixed_token_is_refused() {
        let gatekeeper = gatekeeper();
        for token in ["nope", "s3cret-and-more", "s3cre", ""] {
            let result = gatekeeper.admit(&AdmissionRequest::with_token(token)).await;
            assert_eq!(result, Err(AdmissionError::InvalidCredentials), "token {:?}", token);
        }
    }
}
