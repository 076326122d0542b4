//! Connection reader: turns one connection's inbound frames into hub commands.

use futures::{Stream, StreamExt};

use crate::domain::foundation::ConnectionId;
use crate::domain::hub::{ClientFrame, ProtocolError};
use crate::ports::{InboundFrame, TransportError};

use super::handle::{HubError, HubHandle};

/// Why a connection reader stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderExit {
    /// The peer sent a close frame.
    PeerClosed,
    /// The inbound stream ended without a close frame.
    StreamEnded,
    /// Reading from the transport failed.
    Transport(TransportError),
    /// The client sent a frame outside the protocol.
    ProtocolViolation(ProtocolError),
    /// The hub stopped accepting commands.
    HubClosed,
}

/// Reads frames sequentially, so the commands of a single connection reach
/// the hub in the order the client sent them.
pub struct ConnectionReader {
    connection: ConnectionId,
    hub: HubHandle,
}

impl ConnectionReader {
    pub fn new(connection: ConnectionId, hub: HubHandle) -> Self {
        Self { connection, hub }
    }

    /// Consume `frames` until the connection ends, then unregister it.
    ///
    /// Every exit path unregisters, which also releases the write side.
    pub async fn run<S>(self, mut frames: S) -> ReaderExit
    where
        S: Stream<Item = Result<InboundFrame, TransportError>> + Unpin,
    {
        let exit = loop {
            let frame = match frames.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => break ReaderExit::Transport(e),
                None => break ReaderExit::StreamEnded,
            };

            let submitted = match frame {
                InboundFrame::Text(text) => match ClientFrame::decode(&text) {
                    Ok(frame) => self.forward(frame, text).await,
                    Err(e) => break ReaderExit::ProtocolViolation(e),
                },
                InboundFrame::Binary(data) => {
                    tracing::warn!(
                        connection_id = %self.connection,
                        bytes = data.len(),
                        "Received unsupported binary frame"
                    );
                    Ok(())
                }
                InboundFrame::Ping(_) => self.hub.touch(self.connection).await,
                InboundFrame::Pong(_) => Ok(()),
                InboundFrame::Close => break ReaderExit::PeerClosed,
            };

            if submitted.is_err() {
                break ReaderExit::HubClosed;
            }
        };

        match &exit {
            ReaderExit::PeerClosed | ReaderExit::StreamEnded => {
                tracing::debug!(connection_id = %self.connection, "Client disconnected");
            }
            ReaderExit::Transport(e) => {
                tracing::warn!(connection_id = %self.connection, error = %e, "Unexpected read error on connection");
            }
            ReaderExit::ProtocolViolation(e) => {
                tracing::error!(connection_id = %self.connection, error = %e, "Protocol violation, unregistering client");
            }
            ReaderExit::HubClosed => {
                tracing::debug!(connection_id = %self.connection, "Hub closed while reading");
            }
        }

        if self.hub.unregister(self.connection).await.is_err() {
            tracing::debug!(connection_id = %self.connection, "Hub closed before unregister");
        }

        exit
    }

    async fn forward(&self, frame: ClientFrame, text: String) -> Result<(), HubError> {
        match frame {
            ClientFrame::Ping => self.hub.echo(self.connection, text).await,
            ClientFrame::Subscribe(topic) => self.hub.subscribe(self.connection, topic).await,
            ClientFrame::Unsubscribe(topic) => self.hub.unsubscribe(self.connection, topic).await,
        }
    }
}
