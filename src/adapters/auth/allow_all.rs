//! Gatekeeper that admits every connection.

use async_trait::async_trait;

use crate::ports::{AdmissionError, AdmissionRequest, ConnectionGatekeeper};

/// Admits everything. Used when authorization is enforced in front of the
/// service, e.g. by a private network or proxy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllGatekeeper;

#[async_trait]
impl ConnectionGatekeeper for AllowAllGatekeeper {
    async fn admit(&self, _request: &AdmissionRequest) -> Result<(), AdmissionError> {
        tracing::debug!("Authorized new ws connection");
        Ok(())
    }
}
