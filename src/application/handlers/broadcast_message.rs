//! BroadcastMessageHandler - validates broadcast requests and submits them.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::domain::hub::Topic;
use crate::ports::{BroadcastPublisher, PublishError};

/// Request to broadcast `message` to every subscriber of `topic`.
///
/// Fields are optional so that missing and empty values are reported the
/// same way, as field errors.
#[derive(Debug, Clone, Default)]
pub struct BroadcastMessageCommand {
    pub message: Option<String>,
    pub topic: Option<String>,
}

/// One failed field of a broadcast request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn required(field: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("{} is a required field", field),
        }
    }
}

#[derive(Debug, Error)]
pub enum BroadcastMessageError {
    #[error("Invalid broadcast request ({} field errors)", .0.len())]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl BroadcastMessageCommand {
    /// Check both fields are present and non-empty.
    ///
    /// Errors are listed in `message`, `topic` order.
    pub fn validate(self) -> Result<(Topic, String), Vec<FieldError>> {
        let mut errors = Vec::new();

        let message = self.message.filter(|m| !m.is_empty());
        if message.is_none() {
            errors.push(FieldError::required("message"));
        }

        let topic = self.topic.filter(|t| !t.is_empty());
        if topic.is_none() {
            errors.push(FieldError::required("topic"));
        }

        match (topic, message) {
            (Some(topic), Some(message)) => Ok((Topic::from(topic), message)),
            _ => Err(errors),
        }
    }
}

/// Handler for inbound broadcast requests.
pub struct BroadcastMessageHandler {
    publisher: Arc<dyn BroadcastPublisher>,
}

impl BroadcastMessageHandler {
    pub fn new(publisher: Arc<dyn BroadcastPublisher>) -> Self {
        Self { publisher }
    }

    /// Validate, then hand the broadcast to the hub.
    ///
    /// Invalid requests never reach the publisher.
    pub async fn handle(&self, cmd: BroadcastMessageCommand) -> Result<(), BroadcastMessageError> {
        let (topic, message) = cmd.validate().map_err(|errors| {
            tracing::warn!(errors = errors.len(), "Unable to broadcast message, invalid input");
            BroadcastMessageError::Validation(errors)
        })?;

        self.publisher.publish(&topic, &message).await?;

        tracing::info!(topic = %topic, "Broadcasted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(Topic, String)>>,
        unavailable: bool,
    }

    #[async_trait]
    impl BroadcastPublisher for RecordingPublisher {
        async fn publish(&self, topic: &Topic, message: &str) -> Result<(), PublishError> {
            if self.unavailable {
                return Err(PublishError::HubUnavailable);
            }
            self.published
                .lock()
                .unwrap()
                .push((topic.clone(), message.to_string()));
            Ok(())
        }
    }

    fn command(message: Option<&str>, topic: Option<&str>) -> BroadcastMessageCommand {
        BroadcastMessageCommand {
            message: message.map(str::to_string),
            topic: topic.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn valid_request_is_published() {
        let publisher = Arc::new(RecordingPublisher::default());
        let handler = BroadcastMessageHandler::new(publisher.clone());

        handler
            .handle(command(Some("hello"), Some("repo-x-y")))
            .await
            .unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.as_slice(), &[(Topic::from("repo-x-y"), "hello".to_string())]);
    }

    #[tokio::test]
    async fn missing_fields_are_reported_without_publishing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let handler = BroadcastMessageHandler::new(publisher.clone());

        let result = handler.handle(command(None, None)).await;

        match result {
            Err(BroadcastMessageError::Validation(errors)) => {
                assert_eq!(
                    errors,
                    vec![FieldError::required("message"), FieldError::required("topic")]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_topic_is_a_field_error() {
        let handler = BroadcastMessageHandler::new(Arc::new(RecordingPublisher::default()));

        let result = handler.handle(command(Some("hello"), Some(""))).await;

        match result {
            Err(BroadcastMessageError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "topic");
                assert_eq!(errors[0].message, "topic is a required field");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unavailable_hub_is_a_publish_error() {
        let publisher = Arc::new(RecordingPublisher {
            unavailable: true,
            ..Default::default()
        });
        let handler = BroadcastMessageHandler::new(publisher);

        let result = handler.handle(command(Some("hello"), Some("t"))).await;

        assert!(matches!(
            result,
            Err(BroadcastMessageError::Publish(PublishError::HubUnavailable))
        ));
    }
}
