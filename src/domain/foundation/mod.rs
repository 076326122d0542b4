//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects that form the vocabulary of the hub.

mod ids;
mod timestamp;

pub use ids::ConnectionId;
pub use timestamp::Timestamp;
