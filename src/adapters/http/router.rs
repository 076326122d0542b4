//! Application router assembly and middleware stack.

use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::adapters::http::middleware::{catch_panic_layer, IdempotencyCache};
use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::application::handlers::BroadcastMessageHandler;
use crate::application::hub::HubHandle;
use crate::config::ServerConfig;
use crate::ports::ConnectionGatekeeper;

use super::broadcast::{broadcast_routes, BroadcastHandlers};
use super::system::{system_routes, SystemState};

/// Build the full application router.
///
/// Compression and the request timeout only wrap plain HTTP routes; the
/// websocket route outlives any request timeout. Panics in any handler are
/// answered with a JSON 500.
pub fn app_router(
    hub: HubHandle,
    gatekeeper: Arc<dyn ConnectionGatekeeper>,
    server: &ServerConfig,
) -> Router {
    let broadcast_handler = Arc::new(BroadcastMessageHandler::new(Arc::new(hub.clone())));

    let http_routes = Router::new()
        .merge(system_routes(SystemState::new(
            hub.clone(),
            server.replica_id.clone(),
        )))
        .nest(
            "/v1/internal",
            broadcast_routes(
                BroadcastHandlers::new(broadcast_handler),
                IdempotencyCache::new(server.idempotency_lifetime()),
            ),
        )
        .layer(
            ServiceBuilder::new()
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(server.request_timeout())),
        );

    Router::new()
        .merge(http_routes)
        .merge(websocket_router(WebSocketState::new(hub, gatekeeper)))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(catch_panic_layer())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(&server.cors_origins_list())),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::adapters::auth::AllowAllGatekeeper;
    use crate::application::hub::{spawn_hub, Command};

    fn app(server: &ServerConfig) -> Router {
        let (hub, _task) = spawn_hub(8);
        app_router(hub, Arc::new(AllowAllGatekeeper), server)
    }

    #[tokio::test]
    async fn health_is_routed_and_gets_request_id() {
        let response = app(&ServerConfig::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn incoming_request_id_is_propagated() {
        let response = app(&ServerConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-123");
    }

    #[tokio::test]
    async fn broadcast_endpoint_is_nested_under_internal_prefix() {
        let response = app(&ServerConfig::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/internal/broadcast-message")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"message":"m","topic":"t"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn configured_origins_are_allowed() {
        let server = ServerConfig {
            cors_origins: Some("http://localhost:5173".to_string()),
            ..Default::default()
        };

        let response = app(&server)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = app(&ServerConfig::default())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn repeated_idempotency_key_does_not_broadcast_again() {
        let (hub, mut mailbox) = HubHandle::channel(8);
        let router = app_router(hub, Arc::new(AllowAllGatekeeper), &ServerConfig::default());

        let mut statuses = Vec::new();
        for _ in 0..2 {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/v1/internal/broadcast-message")
                        .header(header::CONTENT_TYPE, "application/json")
                        .header("x-idempotency-key", "3f1c7a52-worker-retry")
                        .body(Body::from(r#"{"message":"m","topic":"t"}"#))
                        .unwrap(),
                )
                .await
                .unwrap();
            statuses.push(response.status());
        }

        assert_eq!(statuses, vec![StatusCode::OK, StatusCode::OK]);
        assert!(matches!(mailbox.try_recv(), Ok(Command::Broadcast { .. })));
        assert!(mailbox.try_recv().is_err());
    }
}
