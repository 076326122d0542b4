//! HTTP adapters - REST endpoints and the application router.
//!
//! - `broadcast` - `POST /v1/internal/broadcast-message`
//! - `middleware` - Idempotent replays and panic recovery
//! - `system` - `GET /`, `/health`, `/metrics`
//! - `router` - Assembles every adapter and applies middleware

pub mod broadcast;
pub mod dto;
pub mod middleware;
pub mod router;
pub mod system;

pub use broadcast::{broadcast_routes, BroadcastHandlers};
pub use dto::ErrorResponse;
pub use router::app_router;
pub use system::{system_routes, SystemState};
