//! HTTP implementation of the `BroadcastPublisher` port.
//!
//! Used by processes that do not share memory with the hub, such as the
//! issue-processing worker, to reach `POST {base_url}/broadcast-message`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::domain::hub::Topic;
use crate::ports::{BroadcastPublisher, PublishError};

/// Configuration for the HTTP publisher.
#[derive(Debug, Clone)]
pub struct HttpPublisherConfig {
    /// Base URL of the hub's internal API, e.g. `http://hub:5001/v1/internal`.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpPublisherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct BroadcastBody<'a> {
    topic: &'a str,
    message: &'a str,
}

/// Publishes broadcasts to a remote hub.
pub struct HttpBroadcastPublisher {
    config: HttpPublisherConfig,
    client: Client,
}

impl HttpBroadcastPublisher {
    pub fn new(config: HttpPublisherConfig) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PublishError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn broadcast_url(&self) -> String {
        format!("{}/broadcast-message", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl BroadcastPublisher for HttpBroadcastPublisher {
    async fn publish(&self, topic: &Topic, message: &str) -> Result<(), PublishError> {
        let response = self
            .client
            .post(self.broadcast_url())
            .json(&BroadcastBody {
                topic: topic.as_str(),
                message,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Request(format!("Timed out after {:?}", self.config.timeout))
                } else if e.is_connect() {
                    PublishError::Request(format!("Connection failed: {}", e))
                } else {
                    PublishError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(topic = %topic, "Broadcast accepted by hub");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(topic = %topic, status = status.as_u16(), "Hub rejected broadcast");
        Err(PublishError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Broadcast announcing that a repository's issues changed at `at`.
///
/// Yields the repository topic and a `{"updated_at": <rfc3339>}` message.
pub fn repository_update(name: &str, owner: &str, at: Timestamp) -> (Topic, String) {
    let message = serde_json::json!({ "updated_at": at.as_datetime().to_rfc3339() }).to_string();
    (Topic::for_repository(name, owner), message)
}
