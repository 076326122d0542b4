//! HTTP adapter for the internal broadcast endpoint.
//!
//! Collaborators that cannot hold a `HubHandle` (the issue-processing worker)
//! submit broadcasts here.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    BroadcastAcceptedResponse, BroadcastMessageRequest, FieldErrorResponse, InvalidInputResponse,
    ValidationErrorResponse,
};
pub use handlers::{broadcast_message, BroadcastHandlers};
pub use routes::broadcast_routes;
