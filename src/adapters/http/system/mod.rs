//! HTTP adapter for operational endpoints: banner, health and hub metrics.

mod handlers;
mod routes;

pub use handlers::{health, metrics, root, SystemState};
pub use routes::system_routes;
