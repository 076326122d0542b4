//! Dispatch tasks: one write attempt against one connection.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::domain::foundation::ConnectionId;

use super::client_record::ConnectionSlot;
use super::command::Command;

/// What a dispatch task writes.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Text written back to its sender. Also counts as client activity.
    Echo(String),
    /// Broadcast payload encoded once and shared by every task.
    Broadcast(Arc<str>),
}

/// How a single dispatch attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// The connection was already closing; nothing was written.
    Skipped,
    /// The write failed; the connection is now closing and unregistered.
    Failed,
}

/// Perform one write attempt. Never retried.
///
/// On failure the connection is marked closing, closed best-effort, and an
/// `Unregister` is sent back into the hub mailbox.
pub async fn dispatch(
    connection: ConnectionId,
    slot: Arc<Mutex<ConnectionSlot>>,
    delivery: Delivery,
    mailbox: mpsc::WeakSender<Command>,
) -> DispatchOutcome {
    let mut guard = slot.lock().await;

    if guard.is_closing() {
        tracing::trace!(connection_id = %connection, "Connection is closing, skipping write");
        return DispatchOutcome::Skipped;
    }

    let text = match delivery {
        Delivery::Echo(text) => {
            guard.touch();
            text
        }
        Delivery::Broadcast(payload) => payload.to_string(),
    };

    let error = match guard.write(text).await {
        Ok(()) => return DispatchOutcome::Delivered,
        Err(e) => e,
    };

    tracing::warn!(connection_id = %connection, error = %error, "Write failed, closing connection");
    guard.mark_closing();
    if let Err(e) = guard.close().await {
        tracing::debug!(connection_id = %connection, error = %e, "Close after failed write also failed");
    }
    drop(guard);

    match mailbox.upgrade() {
        Some(mailbox) => {
            if mailbox.send(Command::Unregister(connection)).await.is_err() {
                tracing::debug!(connection_id = %connection, "Hub stopped before unregister");
            }
        }
        None => tracing::debug!(connection_id = %connection, "Hub stopped before unregister"),
    }

    DispatchOutcome::Failed
}

/// Release a connection that has just left the registry.
///
/// Skips connections a failed dispatch already closed.
pub async fn release(connection: ConnectionId, slot: Arc<Mutex<ConnectionSlot>>) {
    let mut guard = slot.lock().await;
    if guard.is_closing() {
        return;
    }

    guard.mark_closing();
    if let Err(e) = guard.close().await {
        tracing::debug!(connection_id = %connection, error = %e, "Close on unregister failed");
    }
}

/// Refresh liveness after a transport-level keepalive.
pub async fn touch(slot: Arc<Mutex<ConnectionSlot>>) {
    let mut guard = slot.lock().await;
    if !guard.is_closing() {
        guard.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::transport::{memory_transport, SinkEvent};
    use crate::application::hub::client_record::ClientRecord;

    fn record() -> (ClientRecord, crate::adapters::transport::MemoryPeer) {
        let (sink, peer) = memory_transport();
        (ClientRecord::new(Box::new(sink)), peer)
    }

    #[tokio::test]
    async fn broadcast_delivery_writes_payload() {
        let (record, mut peer) = record();
        let (tx, _rx) = mpsc::channel(4);
        let connection = ConnectionId::new();

        let outcome = dispatch(
            connection,
            record.slot(),
            Delivery::Broadcast(Arc::from(r#"{"topic":"t","message":"m"}"#)),
            tx.downgrade(),
        )
        .await;

        assert_eq!(outcome, DispatchOutcome::Delivered);
        assert_eq!(
            peer.next_event().await,
            Some(SinkEvent::Text(r#"{"topic":"t","message":"m"}"#.to_string()))
        );
    }

    #[tokio::test]
    async fn echo_refreshes_last_seen() {
        let (record, mut peer) = record();
        let (tx, _rx) = mpsc::channel(4);
        let before = record.slot().lock().await.last_seen();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let outcome = dispatch(
            ConnectionId::new(),
            record.slot(),
            Delivery::Echo("ping".to_string()),
            tx.downgrade(),
        )
        .await;

        assert_eq!(outcome, DispatchOutcome::Delivered);
        assert_eq!(peer.next_event().await, Some(SinkEvent::Text("ping".to_string())));
        assert!(before.is_before(&record.slot().lock().await.last_seen()));
    }

    #[tokio::test]
    async fn failed_write_marks_closing_closes_and_unregisters() {
        let (record, mut peer) = record();
        peer.fail_writes();
        let (tx, mut rx) = mpsc::channel(4);
        let connection = ConnectionId::new();

        let outcome = dispatch(
            connection,
            record.slot(),
            Delivery::Broadcast(Arc::from("payload")),
            tx.downgrade(),
        )
        .await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert!(record.slot().lock().await.is_closing());
        assert_eq!(peer.next_event().await, Some(SinkEvent::Closed));
        match rx.recv().await {
            Some(Command::Unregister(id)) => assert_eq!(id, connection),
            other => panic!("expected unregister, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn closing_connection_is_skipped() {
        let (record, mut peer) = record();
        record.slot().lock().await.mark_closing();
        let (tx, mut rx) = mpsc::channel(4);

        let outcome = dispatch(
            ConnectionId::new(),
            record.slot(),
            Delivery::Echo("ping".to_string()),
            tx.downgrade(),
        )
        .await;

        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert!(peer.try_next_event().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn release_closes_only_once() {
        let (record, mut peer) = record();

        release(ConnectionId::new(), record.slot()).await;
        release(ConnectionId::new(), record.slot()).await;

        assert_eq!(peer.next_event().await, Some(SinkEvent::Closed));
        assert!(peer.try_next_event().is_none());
    }
}
