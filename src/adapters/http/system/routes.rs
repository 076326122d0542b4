//! HTTP routes for operational endpoints.

use axum::{routing::get, Router};

use super::handlers::{health, metrics, root, SystemState};

pub fn system_routes(state: SystemState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::adapters::transport::memory_transport;
    use crate::application::hub::{spawn_hub, HubHandle};
    use crate::domain::foundation::ConnectionId;
    use crate::domain::hub::Topic;

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (hub, _task) = spawn_hub(8);
        let (status, body) = get(system_routes(SystemState::new(hub, None)), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "I'm healthy!");
    }

    #[tokio::test]
    async fn banner_includes_replica_id() {
        let (hub, _task) = spawn_hub(8);
        let state = SystemState::new(hub, Some("replica-7".to_string()));
        let (status, body) = get(system_routes(state), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "So exotic! replica-7");
    }

    #[tokio::test]
    async fn metrics_reflect_registry() {
        let (hub, _task) = spawn_hub(8);
        let (sink, _peer) = memory_transport();
        let connection = ConnectionId::new();
        hub.register(connection, Box::new(sink)).await.unwrap();
        hub.subscribe(connection, Topic::from("t")).await.unwrap();

        let (status, body) = get(system_routes(SystemState::new(hub, None)), "/metrics").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"connections": 1, "subscriptions": 1, "topics": 1})
        );
    }

    #[tokio::test]
    async fn metrics_unavailable_when_hub_closed() {
        let (hub, mailbox) = HubHandle::channel(1);
        drop(mailbox);

        let (status, _) = get(system_routes(SystemState::new(hub, None)), "/metrics").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
