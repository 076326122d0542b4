//! Commands accepted by the hub loop.

use std::fmt;

use tokio::sync::oneshot;

use crate::domain::foundation::ConnectionId;
use crate::domain::hub::Topic;
use crate::ports::ConnectionSink;

use super::registry::HubStats;

/// A request for the hub loop.
///
/// Commands are the only way into the registry. They are processed one at
/// a time in mailbox order.
pub enum Command {
    /// Add a connection, replacing any existing record for the same id.
    Register {
        connection: ConnectionId,
        sink: Box<dyn ConnectionSink>,
    },
    /// Remove a connection. Unknown ids are ignored.
    Unregister(ConnectionId),
    Subscribe {
        connection: ConnectionId,
        topic: Topic,
    },
    Unsubscribe {
        connection: ConnectionId,
        topic: Topic,
    },
    /// Write `text` back to the connection that sent it.
    Echo {
        connection: ConnectionId,
        text: String,
    },
    /// Deliver `message` to every connection subscribed to `topic`.
    Broadcast { topic: Topic, message: String },
    /// Transport-level keepalive seen on the connection.
    Touch(ConnectionId),
    /// Snapshot registry counters.
    Stats(oneshot::Sender<HubStats>),
}

impl Command {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Unregister(_) => "unregister",
            Command::Subscribe { .. } => "subscribe",
            Command::Unsubscribe { .. } => "unsubscribe",
            Command::Echo { .. } => "echo",
            Command::Broadcast { .. } => "broadcast",
            Command::Touch(_) => "touch",
            Command::Stats(_) => "stats",
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Register { connection, .. } => {
                f.debug_struct("Register").field("connection", connection).finish()
            }
            Command::Unregister(connection) => f.debug_tuple("Unregister").field(connection).finish(),
            Command::Subscribe { connection, topic } => f
                .debug_struct("Subscribe")
                .field("connection", connection)
                .field("topic", topic)
                .finish(),
            Command::Unsubscribe { connection, topic } => f
                .debug_struct("Unsubscribe")
                .field("connection", connection)
                .field("topic", topic)
                .finish(),
            Command::Echo { connection, text } => f
                .debug_struct("Echo")
                .field("connection", connection)
                .field("text", text)
                .finish(),
            Command::Broadcast { topic, message } => f
                .debug_struct("Broadcast")
                .field("topic", topic)
                .field("message", message)
                .finish(),
            Command::Touch(connection) => f.debug_tuple("Touch").field(connection).finish(),
            Command::Stats(_) => f.write_str("Stats"),
        }
    }
}
