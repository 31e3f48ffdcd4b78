//! # WebSocket Handler
//!
//! `GET /chat` upgrades to the streamed chat channel driven by
//! [`ChatGateway`].
//!
//! Frames are JSON text messages `{"event": "...", "data": {...}}`; see
//! [`shared::dto::socket`] for the event table.
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:3000/chat');
//! ws.onopen = () => ws.send(JSON.stringify({
//!   event: 'join:conversation',
//!   data: { conversationId: '5f0c8a6e-...' },
//! }));
//! ws.onmessage = (e) => console.log(JSON.parse(e.data));
//! ```

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use lib_core::Config;
use shared::dto::socket::ServerEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::chat::ChatGateway;

/// Outbound events buffered per connection.
const OUTBOUND_BUFFER: usize = 64;

pub async fn chat_websocket(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(gateway): State<Arc<ChatGateway>>,
    State(config): State<Arc<Config>>,
) -> Response {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    if let Some(origin) = origin {
        if !origin_allowed(&config.ws_cors_origins, origin) {
            warn!(origin = %origin, "[WS] Origin rejected");
            return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
        }
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let client_ip = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    info!(client_ip = ?client_ip, user_agent = ?user_agent, "[WS] Upgrade requested on /chat");

    ws.on_upgrade(move |socket| handle_chat_socket(socket, gateway, client_ip))
}

fn origin_allowed(allowed: &[String], origin: &str) -> bool {
    allowed.iter().any(|a| a == "*" || a.trim_end_matches('/') == origin.trim_end_matches('/'))
}

/// One connection: a send task draining gateway events into the socket, a
/// receive task feeding frames to the gateway. Whichever ends first aborts
/// the other; aborting the receive task cancels any turn in flight.
async fn handle_chat_socket(socket: WebSocket, gateway: Arc<ChatGateway>, client_ip: Option<String>) {
    let client_id = gateway.connect().await;
    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);
    let connection_start = Instant::now();
    let messages_sent = Arc::new(AtomicU64::new(0));
    let messages_received = Arc::new(AtomicU64::new(0));

    info!(client_id = %client_id, client_ip = ?client_ip, "[WS] Connected");

    let client_id_send = client_id.clone();
    let messages_sent_send = Arc::clone(&messages_sent);
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(client_id = %client_id_send, error = %e, "[WS] Serialize error");
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json.into())).await {
                warn!(client_id = %client_id_send, error = %e, "[WS] Send error");
                break;
            }
            messages_sent_send.fetch_add(1, Ordering::Relaxed);
        }
    });

    let client_id_recv = client_id.clone();
    let messages_received_recv = Arc::clone(&messages_received);
    let gateway_recv = Arc::clone(&gateway);
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    messages_received_recv.fetch_add(1, Ordering::Relaxed);
                    debug!(client_id = %client_id_recv, size = text.len(), "[WS] Frame received");
                    gateway_recv.handle_frame(&client_id_recv, text.as_str(), &out_tx).await;
                }
                Ok(Message::Close(frame)) => {
                    let reason = frame
                        .as_ref()
                        .map(|f| f.code.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    info!(client_id = %client_id_recv, reason = %reason, "[WS] Close received");
                    break;
                }
                Ok(Message::Binary(data)) => {
                    debug!(client_id = %client_id_recv, size = data.len(), "[WS] Binary frame ignored");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Err(e) => {
                    warn!(client_id = %client_id_recv, error = %e, "[WS] Receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        result = &mut send_task => {
            recv_task.abort();
            if let Err(e) = result {
                error!(client_id = %client_id, error = ?e, "[WS] Send task failed");
            }
            // Wait out the abort so no event handler races the disconnect below.
            let _ = recv_task.await;
        }
        result = &mut recv_task => {
            send_task.abort();
            if let Err(e) = result {
                error!(client_id = %client_id, error = ?e, "[WS] Receive task failed");
            }
            let _ = send_task.await;
        }
    }

    gateway.disconnect(&client_id).await;

    info!(
        client_id = %client_id,
        client_ip = ?client_ip,
        duration_ms = connection_start.elapsed().as_millis() as u64,
        messages_sent = messages_sent.load(Ordering::Relaxed),
        messages_received = messages_received.load(Ordering::Relaxed),
        "[WS] Disconnected"
    );
}
