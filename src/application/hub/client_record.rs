//! Per-connection state kept in the registry.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::domain::hub::Topic;
use crate::ports::{ConnectionSink, TransportError};

/// Write side and liveness of one connection.
///
/// Always accessed through the record's mutex, so at most one task writes
/// to a given connection at a time.
pub struct ConnectionSlot {
    sink: Box<dyn ConnectionSink>,
    last_seen: Timestamp,
    closing: bool,
}

impl ConnectionSlot {
    fn new(sink: Box<dyn ConnectionSink>) -> Self {
        Self {
            sink,
            last_seen: Timestamp::now(),
            closing: false,
        }
    }

    /// Once set, nothing is ever written to this connection again.
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn mark_closing(&mut self) {
        self.closing = true;
    }

    pub fn last_seen(&self) -> Timestamp {
        self.last_seen
    }

    /// Record activity from the client.
    pub fn touch(&mut self) {
        self.last_seen = Timestamp::now();
    }

    pub async fn write(&mut self, text: String) -> Result<(), TransportError> {
        self.sink.send_text(text).await
    }

    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.close().await
    }
}

/// Registry entry for a connection.
///
/// `subscribed_topics` is only touched by the hub loop, which owns the
/// registry. Everything that involves I/O sits behind `slot`.
pub struct ClientRecord {
    subscribed_topics: HashSet<Topic>,
    slot: Arc<Mutex<ConnectionSlot>>,
}

impl ClientRecord {
    pub fn new(sink: Box<dyn ConnectionSink>) -> Self {
        Self {
            subscribed_topics: HashSet::new(),
            slot: Arc::new(Mutex::new(ConnectionSlot::new(sink))),
        }
    }

    /// Returns `true` if the topic was newly added.
    pub fn subscribe(&mut self, topic: Topic) -> bool {
        self.subscribed_topics.insert(topic)
    }

    /// Returns `true` if the topic was present.
    pub fn unsubscribe(&mut self, topic: &Topic) -> bool {
        self.subscribed_topics.remove(topic)
    }

    pub fn is_subscribed(&self, topic: &Topic) -> bool {
        self.subscribed_topics.contains(topic)
    }

    pub fn subscribed_topics(&self) -> impl Iterator<Item = &Topic> {
        self.subscribed_topics.iter()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscribed_topics.len()
    }

    /// Shared handle to the locked write side, for dispatch tasks.
    pub fn slot(&self) -> Arc<Mutex<ConnectionSlot>> {
        Arc::clone(&self.slot)
    }
}
