//! In-memory implementation of the `ConnectionSink` port.
//!
//! Everything written to a [`MemorySink`] shows up on its paired
//! [`MemoryPeer`], which can also make subsequent writes fail.
//!
//! # Example
//!
//! ```ignore
//! let (sink, mut peer) = memory_transport();
//! hub.register(ConnectionId::new(), Box::new(sink)).await?;
//! peer.fail_writes();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ports::{ConnectionSink, TransportError};

/// Observable effect of a sink operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Text(String),
    Closed,
}

/// Create a connected sink/peer pair.
pub fn memory_transport() -> (MemorySink, MemoryPeer) {
    let (tx, rx) = mpsc::unbounded_channel();
    let fail_writes = Arc::new(AtomicBool::new(false));
    (
        MemorySink {
            events: tx,
            fail_writes: Arc::clone(&fail_writes),
        },
        MemoryPeer {
            events: rx,
            fail_writes,
        },
    )
}

/// Write half handed to the hub.
#[derive(Debug)]
pub struct MemorySink {
    events: mpsc::UnboundedSender<SinkEvent>,
    fail_writes: Arc<AtomicBool>,
}

#[async_trait]
impl ConnectionSink for MemorySink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Io("write failure injected".to_string()));
        }
        self.events
            .send(SinkEvent::Text(text))
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.events
            .send(SinkEvent::Closed)
            .map_err(|_| TransportError::Closed)
    }
}

/// Observing end of a [`MemorySink`].
#[derive(Debug)]
pub struct MemoryPeer {
    events: mpsc::UnboundedReceiver<SinkEvent>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryPeer {
    /// Make every later write on the sink fail. Closing still works.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub async fn next_event(&mut self) -> Option<SinkEvent> {
        self.events.recv().await
    }

    /// Wait at most `timeout` for the next event.
    pub async fn next_within(&mut self, timeout: Duration) -> Option<SinkEvent> {
        tokio::time::timeout(timeout, self.events.recv())
            .await
            .ok()
            .flatten()
    }

    pub fn try_next_event(&mut self) -> Option<SinkEvent> {
        self.events.try_recv().ok()
    }
}
