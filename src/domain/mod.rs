//! Domain layer containing hub state and wire types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (connection identifiers, timestamps)
//! - `hub` - Topics and the client/broadcast frame protocol
//!
//! Nothing in this layer performs I/O. Tasks, channels and sockets live in
//! the `application` and `adapters` layers.

pub mod foundation;
pub mod hub;
