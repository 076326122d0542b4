//! Application layer - the hub loop, its collaborators, and command handlers.
//!
//! - `hub` - Mailbox, registry, dispatch tasks and connection readers
//! - `handlers` - Boundary handlers that validate requests before they reach the hub

pub mod handlers;
pub mod hub;

pub use handlers::{BroadcastMessageCommand, BroadcastMessageError, BroadcastMessageHandler, FieldError};
pub use hub::{spawn_hub, ConnectionReader, HubError, HubHandle, HubStats, ReaderExit};
