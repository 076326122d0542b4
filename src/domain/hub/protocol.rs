//! Text frame protocol spoken over a client connection.
//!
//! Client → hub:
//! - the literal text `ping`, echoed back verbatim
//! - `{"type":"subscribe","topic":"<topic>"}`
//! - `{"type":"unsubscribe","topic":"<topic>"}`
//!
//! Hub → client:
//! - `{"topic":"<topic>","message":"<message>"}` for every broadcast
//!
//! Anything else is a protocol violation and ends the connection.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::topic::Topic;

/// Literal keepalive payload a client may send at any time.
pub const PING_FRAME: &str = "ping";

/// A decoded inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    Ping,
    Subscribe(Topic),
    Unsubscribe(Topic),
}

/// Reasons an inbound text frame could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Frame is not a JSON object of string fields: {0}")]
    InvalidJson(String),

    #[error("Frame has no `type` field")]
    MissingType,

    #[error("Frame has no `topic` field")]
    MissingTopic,

    #[error("Unrecognized frame type `{0}`")]
    UnknownType(String),
}

impl ClientFrame {
    /// Decode a text frame payload.
    ///
    /// Subscription frames must be flat JSON objects whose values are all
    /// strings. Unknown extra fields are ignored.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        if text == PING_FRAME {
            return Ok(ClientFrame::Ping);
        }

        let mut fields: HashMap<String, String> = serde_json::from_str(text)
            .map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

        let frame_type = fields.remove("type").ok_or(ProtocolError::MissingType)?;

        match frame_type.as_str() {
            "subscribe" => {
                let topic = fields.remove("topic").ok_or(ProtocolError::MissingTopic)?;
                Ok(ClientFrame::Subscribe(Topic::from(topic)))
            }
            "unsubscribe" => {
                let topic = fields.remove("topic").ok_or(ProtocolError::MissingTopic)?;
                Ok(ClientFrame::Unsubscribe(Topic::from(topic)))
            }
            _ => Err(ProtocolError::UnknownType(frame_type)),
        }
    }
}

/// Outbound frame delivered to every subscriber of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastFrame {
    pub topic: Topic,
    pub message: String,
}

impl BroadcastFrame {
    pub fn new(topic: Topic, message: impl Into<String>) -> Self {
        Self {
            topic,
            message: message.into(),
        }
    }

    /// Serialize to the JSON text written to subscribers.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
