//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the hub and the outside world. Adapters implement these ports.
//!
//! - `ConnectionSink` / `InboundFrame` - The two halves of a client transport
//! - `ConnectionGatekeeper` - Admission decision made before a connection reaches the hub
//! - `BroadcastPublisher` - Submission of broadcasts by external collaborators

mod broadcast_publisher;
mod connection_gatekeeper;
mod connection_transport;

pub use broadcast_publisher::{BroadcastPublisher, PublishError};
pub use connection_gatekeeper::{AdmissionError, AdmissionRequest, ConnectionGatekeeper};
pub use connection_transport::{ConnectionSink, InboundFrame, TransportError};
