//! WebSocket upgrade handler for hub connections.
//!
//! Handles the HTTP → WebSocket upgrade and hands the connection to the hub:
//! 1. Ask the gatekeeper to admit the request
//! 2. Upgrade to WebSocket
//! 3. Register the write half with the hub
//! 4. Run the connection reader on the read half until disconnect

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;

use crate::adapters::http::dto::ErrorResponse;
use crate::application::hub::{ConnectionReader, HubHandle};
use crate::domain::foundation::ConnectionId;
use crate::ports::{
    AdmissionError, AdmissionRequest, ConnectionGatekeeper, ConnectionSink, InboundFrame,
    TransportError,
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub hub: HubHandle,
    pub gatekeeper: Arc<dyn ConnectionGatekeeper>,
}

impl WebSocketState {
    pub fn new(hub: HubHandle, gatekeeper: Arc<dyn ConnectionGatekeeper>) -> Self {
        Self { hub, gatekeeper }
    }
}

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
///
/// Admission is decided before the upgrade. A plain GET without upgrade
/// headers gets `426 Upgrade Required`.
pub async fn ws_handler(
    State(state): State<WebSocketState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let request = AdmissionRequest {
        bearer_token: bearer_token(&headers).or(query.token),
    };

    if let Err(e) = state.gatekeeper.admit(&request).await {
        return admission_error_response(e);
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected non-websocket request on /ws");
            return (
                StatusCode::UPGRADE_REQUIRED,
                Json(ErrorResponse::upgrade_required("Expected a websocket upgrade")),
            )
                .into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

/// Handle an established WebSocket connection.
///
/// The write half belongs to the hub once registered; this task only reads.
async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let (sender, receiver) = socket.split();
    let connection = ConnectionId::new();

    if hub.register(connection, Box::new(WsSink::new(sender))).await.is_err() {
        tracing::warn!(connection_id = %connection, "Hub closed, dropping new connection");
        return;
    }

    let frames = receiver.map(|result| {
        result
            .map(inbound_frame)
            .map_err(|e| TransportError::Io(e.to_string()))
    });

    let exit = ConnectionReader::new(connection, hub).run(frames).await;
    tracing::trace!(connection_id = %connection, exit = ?exit, "Connection reader finished");
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn admission_error_response(error: AdmissionError) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::unauthorized(error.to_string())),
    )
        .into_response()
}

fn inbound_frame(message: Message) -> InboundFrame {
    match message {
        Message::Text(text) => InboundFrame::Text(text),
        Message::Binary(data) => InboundFrame::Binary(data),
        Message::Ping(data) => InboundFrame::Ping(data),
        Message::Pong(data) => InboundFrame::Pong(data),
        Message::Close(_) => InboundFrame::Close,
    }
}

/// Write half of an axum WebSocket, as a hub connection sink.
pub struct WsSink {
    sender: SplitSink<WebSocket, Message>,
}

impl WsSink {
    pub fn new(sender: SplitSink<WebSocket, Message>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ConnectionSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sender
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sender
            .close()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router(state: WebSocketState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}
