//! Connection gatekeeper adapters.
//!
//! Implementations of the `ConnectionGatekeeper` port:
//!
//! - `allow_all` - Admits every connection (authorization happens upstream)
//! - `static_token` - Requires a shared bearer token

mod allow_all;
mod static_token;

pub use allow_all::AllowAllGatekeeper;
pub use static_token::StaticTokenGatekeeper;
