//! Broadcast relay adapters.
//!
//! - `http_publisher` - Submits broadcasts to a remote hub over HTTP

mod http_publisher;

pub use http_publisher::{repository_update, HttpBroadcastPublisher, HttpPublisherConfig};
