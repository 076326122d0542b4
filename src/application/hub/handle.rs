//! Cloneable submission handle for the hub mailbox.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::domain::foundation::ConnectionId;
use crate::domain::hub::Topic;
use crate::ports::{BroadcastPublisher, ConnectionSink, PublishError};

use super::command::Command;
use super::registry::HubStats;

/// Errors returned when submitting to the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    /// The hub loop has stopped and no longer reads its mailbox.
    #[error("Hub is closed")]
    Closed,
}

/// Handle used by every collaborator to talk to the hub.
///
/// Submissions are fire-and-forget: `Ok` means the command was queued, not
/// that anything was delivered. The hub loop stops once every handle is
/// dropped.
#[derive(Clone, Debug)]
pub struct HubHandle {
    mailbox: mpsc::Sender<Command>,
}

impl HubHandle {
    pub(crate) fn new(mailbox: mpsc::Sender<Command>) -> Self {
        Self { mailbox }
    }

    /// Create a handle together with the raw receiving end of its mailbox.
    ///
    /// Useful for driving collaborators without a running hub loop.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub async fn submit(&self, command: Command) -> Result<(), HubError> {
        self.mailbox.send(command).await.map_err(|_| HubError::Closed)
    }

    pub async fn register(
        &self,
        connection: ConnectionId,
        sink: Box<dyn ConnectionSink>,
    ) -> Result<(), HubError> {
        self.submit(Command::Register { connection, sink }).await
    }

    pub async fn unregister(&self, connection: ConnectionId) -> Result<(), HubError> {
        self.submit(Command::Unregister(connection)).await
    }

    pub async fn subscribe(&self, connection: ConnectionId, topic: Topic) -> Result<(), HubError> {
        self.submit(Command::Subscribe { connection, topic }).await
    }

    pub async fn unsubscribe(&self, connection: ConnectionId, topic: Topic) -> Result<(), HubError> {
        self.submit(Command::Unsubscribe { connection, topic }).await
    }

    pub async fn echo(&self, connection: ConnectionId, text: impl Into<String>) -> Result<(), HubError> {
        self.submit(Command::Echo {
            connection,
            text: text.into(),
        })
        .await
    }

    pub async fn broadcast(&self, topic: Topic, message: impl Into<String>) -> Result<(), HubError> {
        self.submit(Command::Broadcast {
            topic,
            message: message.into(),
        })
        .await
    }

    pub async fn touch(&self, connection: ConnectionId) -> Result<(), HubError> {
        self.submit(Command::Touch(connection)).await
    }

    /// Ask the hub loop for its current counters.
    ///
    /// Answered in mailbox order, so every command submitted earlier through
    /// this handle has been applied to the registry by the time it returns.
    pub async fn stats(&self) -> Result<HubStats, HubError> {
        let (reply, response) = oneshot::channel();
        self.submit(Command::Stats(reply)).await?;
        response.await.map_err(|_| HubError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.mailbox.is_closed()
    }
}

#[async_trait]
impl BroadcastPublisher for HubHandle {
    async fn publish(&self, topic: &Topic, message: &str) -> Result<(), PublishError> {
        self.broadcast(topic.clone(), message)
            .await
            .map_err(|_| PublishError::HubUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submissions_arrive_in_order() {
        let (hub, mut mailbox) = HubHandle::channel(8);
        let connection = ConnectionId::new();

        hub.subscribe(connection, Topic::from("t")).await.unwrap();
        hub.unsubscribe(connection, Topic::from("t")).await.unwrap();

        assert!(matches!(mailbox.recv().await, Some(Command::Subscribe { .. })));
        assert!(matches!(mailbox.recv().await, Some(Command::Unsubscribe { .. })));
    }

    #[tokio::test]
    async fn submit_after_mailbox_dropped_is_closed() {
        let (hub, mailbox) = HubHandle::channel(1);
        drop(mailbox);

        assert!(hub.is_closed());
        assert_eq!(hub.unregister(ConnectionId::new()).await, Err(HubError::Closed));
    }

    #[tokio::test]
    async fn publish_maps_closed_hub_to_unavailable() {
        let (hub, mailbox) = HubHandle::channel(1);
        drop(mailbox);

        let result = hub.publish(&Topic::from("t"), "hello").await;
        assert!(matches!(result, Err(PublishError::HubUnavailable)));
    }

    #[tokio::test]
    async fn stats_without_reply_is_closed() {
        let (hub, mut mailbox) = HubHandle::channel(1);
        let pending = tokio::spawn(async move { hub.stats().await });

        // Drop the reply sender without answering.
        let command = mailbox.recv().await;
        assert!(matches!(command, Some(Command::Stats(_))));
        drop(command);

        assert_eq!(pending.await.unwrap(), Err(HubError::Closed));
    }
}
