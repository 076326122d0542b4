//! Connection transport port - the read and write halves of a client connection.
//!
//! The hub never sees sockets directly. A connection's write half is handed
//! over as a boxed [`ConnectionSink`] on register, and its read half is
//! consumed by the connection reader as a stream of [`InboundFrame`]s.

use async_trait::async_trait;
use thiserror::Error;

/// A frame received from a client, independent of the transport library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// UTF-8 text payload.
    Text(String),
    /// Binary payload. Not part of the protocol.
    Binary(Vec<u8>),
    /// Transport-level keepalive ping.
    Ping(Vec<u8>),
    /// Transport-level keepalive pong.
    Pong(Vec<u8>),
    /// Peer initiated close.
    Close,
}

/// Errors raised by a connection transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection is already closed.
    #[error("Connection closed")]
    Closed,

    /// Any other I/O or protocol failure.
    #[error("Transport failure: {0}")]
    Io(String),
}

/// Write half of a client connection.
///
/// Implementations are used by at most one writer at a time: the hub keeps
/// every sink behind its connection's own lock.
#[async_trait]
pub trait ConnectionSink: Send {
    /// Write one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Send a close signal and release the transport.
    async fn close(&mut self) -> Result<(), TransportError>;
}
