//! Hub domain types.
//!
//! - [`topic`] - Opaque topic identifiers used to group connections
//! - [`protocol`] - Text frames exchanged with connected clients

pub mod protocol;
pub mod topic;

pub use protocol::{BroadcastFrame, ClientFrame, ProtocolError, PING_FRAME};
pub use topic::Topic;
