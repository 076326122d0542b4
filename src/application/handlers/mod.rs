//! Command handlers sitting between the HTTP boundary and the hub.

mod broadcast_message;

pub use broadcast_message::{
    BroadcastMessageCommand, BroadcastMessageError, BroadcastMessageHandler, FieldError,
};
