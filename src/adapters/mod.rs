//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the hub to external systems:
//! - `auth` - Connection gatekeepers
//! - `http` - REST endpoints, middleware and the application router
//! - `relay` - HTTP client used by remote collaborators to submit broadcasts
//! - `transport` - In-memory connection transport
//! - `websocket` - Axum WebSocket endpoint feeding the hub

pub mod auth;
pub mod http;
pub mod relay;
pub mod transport;
pub mod websocket;

pub use auth::{AllowAllGatekeeper, StaticTokenGatekeeper};
pub use relay::{repository_update, HttpBroadcastPublisher, HttpPublisherConfig};
pub use transport::{memory_transport, MemoryPeer, MemorySink, SinkEvent};
