//! Idempotency middleware for retried POSTs.
//!
//! A request carrying `X-Idempotency-Key` runs its handler at most once per
//! key within the cache lifetime. Repeats get the stored response back with
//! `X-Idempotency-Replayed: true`. Concurrent repeats wait for the first one
//! to finish. Safe methods and requests without the header pass through.
//!
//! Server errors (5xx) are not stored, so a retry after one runs again.
//!
//! # Example
//!
//! ```ignore
//! let cache = IdempotencyCache::new(Duration::from_secs(30 * 60));
//!
//! let app = Router::new()
//!     .route("/broadcast-message", post(handler))
//!     .route_layer(middleware::from_fn_with_state(cache, idempotency_middleware));
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::Mutex;

use crate::adapters::http::dto::ErrorResponse;
use crate::domain::foundation::Timestamp;

pub static IDEMPOTENCY_KEY_HEADER: HeaderName = HeaderName::from_static("x-idempotency-key");
pub static IDEMPOTENCY_REPLAYED_HEADER: HeaderName =
    HeaderName::from_static("x-idempotency-replayed");

const MAX_KEY_LEN: usize = 128;
const MAX_STORED_BODY: usize = 1024 * 1024;

/// Response kept for replay.
#[derive(Debug, Clone)]
struct StoredResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl StoredResponse {
    fn replay(&self) -> Response {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
            .headers_mut()
            .insert(IDEMPOTENCY_REPLAYED_HEADER.clone(), HeaderValue::from_static("true"));
        response
    }
}

type Slot = Arc<Mutex<Option<StoredResponse>>>;

struct Entry {
    first_seen: Timestamp,
    slot: Slot,
}

impl Entry {
    fn is_expired(&self, now: &Timestamp, lifetime: Duration) -> bool {
        now.duration_since(&self.first_seen)
            .to_std()
            .map(|elapsed| elapsed >= lifetime)
            .unwrap_or(false)
    }
}

/// Responses by idempotency key, kept for `lifetime` after a key is first seen.
#[derive(Clone)]
pub struct IdempotencyCache {
    lifetime: Duration,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl IdempotencyCache {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Slot for `key`, created if absent. Expired entries are evicted first.
    async fn slot(&self, key: &str) -> Slot {
        let now = Timestamp::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| !entry.is_expired(&now, self.lifetime));

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            first_seen: now,
            slot: Arc::new(Mutex::new(None)),
        });
        Arc::clone(&entry.slot)
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

pub async fn idempotency_middleware(
    State(cache): State<IdempotencyCache>,
    request: Request,
    next: Next,
) -> Response {
    if is_safe(request.method()) {
        return next.run(request).await;
    }

    let key = match request.headers().get(&IDEMPOTENCY_KEY_HEADER) {
        None => return next.run(request).await,
        Some(value) => match value.to_str() {
            Ok(key) if !key.is_empty() && key.len() <= MAX_KEY_LEN => key.to_string(),
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request("Invalid X-Idempotency-Key header")),
                )
                    .into_response()
            }
        },
    };

    let slot = cache.slot(&key).await;
    let mut stored = slot.lock().await;

    if let Some(response) = stored.as_ref() {
        tracing::debug!(idempotency_key = %key, "Replaying stored response");
        return response.replay();
    }

    let (parts, body) = next.run(request).await.into_parts();
    let body = match to_bytes(body, MAX_STORED_BODY).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(idempotency_key = %key, error = %e, "Couldn't buffer response for replay");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Unable to read response")),
            )
                .into_response();
        }
    };

    if !parts.status.is_server_error() {
        *stored = Some(StoredResponse {
            status: parts.status,
            headers: parts.headers.clone(),
            body: body.clone(),
        });
    }

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{middleware, routing::post, Router};
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct Calls(Arc<AtomicUsize>);

    impl Calls {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    async fn counted(State(calls): State<Calls>) -> String {
        let n = calls.0.fetch_add(1, Ordering::SeqCst) + 1;
        format!("call {}", n)
    }

    async fn failing(State(calls): State<Calls>) -> StatusCode {
        calls.0.fetch_add(1, Ordering::SeqCst);
        StatusCode::SERVICE_UNAVAILABLE
    }

    fn app(cache: IdempotencyCache, calls: Calls) -> Router {
        Router::new()
            .route("/counted", post(counted).get(counted))
            .route("/failing", post(failing))
            .with_state(calls)
            .route_layer(middleware::from_fn_with_state(cache, idempotency_middleware))
    }

    fn request(method: &str, uri: &str, key: Option<&str>) -> Request {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header(&IDEMPOTENCY_KEY_HEADER, key);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(router: &Router, req: Request) -> (StatusCode, HeaderMap, String) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn long_lived() -> IdempotencyCache {
        IdempotencyCache::new(Duration::from_secs(30 * 60))
    }

    #[tokio::test]
    async fn repeated_key_runs_handler_once_and_replays() {
        let calls = Calls::default();
        let router = app(long_lived(), calls.clone());

        let (_, first_headers, first) = send(&router, request("POST", "/counted", Some("k1"))).await;
        let (status, headers, second) = send(&router, request("POST", "/counted", Some("k1"))).await;

        assert_eq!(calls.count(), 1);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, "call 1");
        assert_eq!(second, "call 1");
        assert!(first_headers.get(&IDEMPOTENCY_REPLAYED_HEADER).is_none());
        assert_eq!(headers[&IDEMPOTENCY_REPLAYED_HEADER], "true");
    }

    #[tokio::test]
    async fn distinct_or_missing_keys_run_every_time() {
        let calls = Calls::default();
        let router = app(long_lived(), calls.clone());

        send(&router, request("POST", "/counted", Some("a"))).await;
        send(&router, request("POST", "/counted", Some("b"))).await;
        send(&router, request("POST", "/counted", None)).await;
        send(&router, request("POST", "/counted", None)).await;

        assert_eq!(calls.count(), 4);
    }

    #[tokio::test]
    async fn safe_methods_bypass_the_cache() {
        let calls = Calls::default();
        let cache = long_lived();
        let router = app(cache.clone(), calls.clone());

        send(&router, request("GET", "/counted", Some("k"))).await;
        send(&router, request("GET", "/counted", Some("k"))).await;

        assert_eq!(calls.count(), 2);
        assert!(cache.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn server_errors_are_not_stored() {
        let calls = Calls::default();
        let router = app(long_lived(), calls.clone());

        send(&router, request("POST", "/failing", Some("k"))).await;
        let (status, headers, _) = send(&router, request("POST", "/failing", Some("k"))).await;

        assert_eq!(calls.count(), 2);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(headers.get(&IDEMPOTENCY_REPLAYED_HEADER).is_none());
    }

    #[tokio::test]
    async fn expired_keys_run_again() {
        let calls = Calls::default();
        let router = app(IdempotencyCache::new(Duration::ZERO), calls.clone());

        send(&router, request("POST", "/counted", Some("k"))).await;
        let (_, _, body) = send(&router, request("POST", "/counted", Some("k"))).await;

        assert_eq!(calls.count(), 2);
        assert_eq!(body, "call 2");
    }

    #[tokio::test]
    async fn oversized_key_is_rejected() {
        let calls = Calls::default();
        let router = app(long_lived(), calls.clone());
        let key = "k".repeat(MAX_KEY_LEN + 1);

        let (status, _, _) = send(&router, request("POST", "/counted", Some(&key))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(calls.count(), 0);
    }

    #[tokio::test]
    async fn concurrent_repeats_wait_for_the_first() {
        let calls = Calls::default();
        let router = app(long_lived(), calls.clone());

        let (a, b) = tokio::join!(
            send(&router, request("POST", "/counted", Some("k"))),
            send(&router, request("POST", "/counted", Some("k"))),
        );

        assert_eq!(calls.count(), 1);
        assert_eq!(a.2, b.2);
    }
}
