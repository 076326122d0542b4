//! WebSocket adapter feeding client connections into the hub.
//!
//! # Connection lifecycle
//!
//! ```text
//!   GET /ws ──► gatekeeper.admit() ──► upgrade
//!                                        │
//!                     ┌──────────────────┴──────────────────┐
//!                     ▼                                     ▼
//!        write half: WsSink                     read half: frame stream
//!        hub.register(id, sink)                 ConnectionReader::run()
//!        (owned by the hub from here on)        (unregisters on exit)
//! ```
//!
//! # Components
//!
//! - [`handler`] - Axum upgrade handler, sink adapter and frame mapping

pub mod handler;

pub use handler::{websocket_router, ws_handler, WebSocketState, WsQuery, WsSink};
