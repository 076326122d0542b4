//! BroadcastPublisher port - how collaborators submit broadcasts.
//!
//! In-process collaborators publish straight into the hub mailbox, remote
//! ones (the issue-processing worker) go through the HTTP endpoint. Both
//! sides implement this trait so callers do not care which one they hold.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::hub::Topic;

/// Errors raised while submitting a broadcast.
///
/// None of these say anything about delivery: a successful publish only
/// means the hub accepted the broadcast.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Hub is not accepting commands")]
    HubUnavailable,

    #[error("Broadcast request failed: {0}")]
    Request(String),

    #[error("Broadcast rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait BroadcastPublisher: Send + Sync {
    async fn publish(&self, topic: &Topic, message: &str) -> Result<(), PublishError>;
}
