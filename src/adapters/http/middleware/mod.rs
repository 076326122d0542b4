//! HTTP middleware.
//!
//! - `idempotency` - Replays the stored response for a repeated `X-Idempotency-Key`
//! - `recover` - Turns handler panics into a JSON 500

mod idempotency;
mod recover;

pub use idempotency::{idempotency_middleware, IdempotencyCache};
pub use recover::{catch_panic_layer, PanicHandler};
