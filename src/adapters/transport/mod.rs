//! Connection transport adapters.
//!
//! - `memory` - Channel-backed sink for tests and in-process clients

mod memory;

pub use memory::{memory_transport, MemoryPeer, MemorySink, SinkEvent};
