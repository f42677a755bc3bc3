//! WebSocket handling
//!
//! One persistent connection per dashboard client. Each connection gets
//! an outbound channel for unicast replies and a forwarder task that
//! drains the broadcast hub, so every client observes all channel
//! lifecycle events for as long as it stays connected.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use zaplink_protocol::{ClientMessage, ServerMessage};

use crate::state::AppState;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Messages that can be sent through the WebSocket
enum OutboundMessage {
    /// JSON-serialized ServerMessage
    Json(ServerMessage),
    /// Raw pong response
    Pong(Bytes),
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
    info!(
        component = "websocket",
        event = "ws.connection.opened",
        connection_id = conn_id,
        "WebSocket connection opened"
    );

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Channel for sending messages to this client
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<OutboundMessage>(100);

    // Spawn task to forward messages to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let result = match msg {
                OutboundMessage::Json(server_msg) => match serde_json::to_string(&server_msg) {
                    Ok(json) => ws_tx.send(Message::Text(json.into())).await,
                    Err(e) => {
                        error!(
                            component = "websocket",
                            event = "ws.send.serialize_failed",
                            connection_id = conn_id,
                            error = %e,
                            "Failed to serialize server message"
                        );
                        continue;
                    }
                },
                OutboundMessage::Pong(data) => ws_tx.send(Message::Pong(data)).await,
            };

            if result.is_err() {
                debug!(
                    component = "websocket",
                    event = "ws.send.disconnected",
                    connection_id = conn_id,
                    "WebSocket send failed, client disconnected"
                );
                break;
            }
        }
    });

    // Every connection observes broadcast events from connect time
    spawn_broadcast_forwarder(state.hub().subscribe(), outbound_tx.clone(), conn_id);

    // Handle incoming messages
    while let Some(result) = ws_rx.next().await {
        let msg = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Ping(data)) => {
                let _ = outbound_tx.send(OutboundMessage::Pong(data)).await;
                continue;
            }
            Ok(Message::Close(_)) => {
                info!(
                    component = "websocket",
                    event = "ws.connection.close_frame",
                    connection_id = conn_id,
                    "Client sent close frame"
                );
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(
                    component = "websocket",
                    event = "ws.connection.error",
                    connection_id = conn_id,
                    error = %e,
                    "WebSocket error"
                );
                break;
            }
        };

        // The wire has no generic error event; malformed frames are dropped
        let client_msg: ClientMessage = match serde_json::from_str(&msg) {
            Ok(m) => m,
            Err(e) => {
                warn!(
                    component = "websocket",
                    event = "ws.message.parse_failed",
                    connection_id = conn_id,
                    error = %e,
                    payload_bytes = msg.len(),
                    "Failed to parse client message"
                );
                continue;
            }
        };

        handle_client_message(client_msg, &outbound_tx, &state, conn_id).await;
    }

    info!(
        component = "websocket",
        event = "ws.connection.closed",
        connection_id = conn_id,
        "WebSocket connection closed"
    );
    send_task.abort();
}

/// Send a ServerMessage through the outbound channel
async fn send_json(tx: &mpsc::Sender<OutboundMessage>, msg: ServerMessage) {
    let _ = tx.send(OutboundMessage::Json(msg)).await;
}

/// Spawn a task that drains a broadcast receiver and forwards events to
/// an outbound channel. When the outbound channel closes (client
/// disconnects), the task exits and the broadcast::Receiver is dropped —
/// automatic cleanup, no manual unsubscribe needed.
fn spawn_broadcast_forwarder(
    mut rx: broadcast::Receiver<ServerMessage>,
    outbound_tx: mpsc::Sender<OutboundMessage>,
    conn_id: u64,
) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if outbound_tx.send(OutboundMessage::Json(msg)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        component = "websocket",
                        event = "ws.broadcast.lagged",
                        connection_id = conn_id,
                        skipped = n,
                        "Broadcast subscriber lagged, skipped {n} messages"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Handle a client message
async fn handle_client_message(
    msg: ClientMessage,
    client_tx: &mpsc::Sender<OutboundMessage>,
    state: &Arc<AppState>,
    conn_id: u64,
) {
    match msg {
        ClientMessage::StartSession {
            name,
            phone,
            paired_by,
        } => {
            info!(
                component = "pairing",
                event = "pairing.start.requested",
                connection_id = conn_id,
                phone = %phone,
                paired_by = %paired_by,
                "Pairing requested"
            );

            match state
                .coordinator()
                .start_pairing(&name, &phone, &paired_by)
                .await
            {
                Ok(qr) => {
                    send_json(client_tx, ServerMessage::Qr { number: phone, qr }).await;
                }
                Err(err) => {
                    warn!(
                        component = "pairing",
                        event = "pairing.start.rejected",
                        connection_id = conn_id,
                        phone = %phone,
                        error = %err,
                        "Pairing request rejected"
                    );
                    send_json(
                        client_tx,
                        ServerMessage::PairingError {
                            number: phone,
                            message: err.to_string(),
                        },
                    )
                    .await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn start_session(phone: &str) -> ClientMessage {
        ClientMessage::StartSession {
            name: "Vendas Varejo".to_string(),
            phone: phone.to_string(),
            paired_by: "Admin".to_string(),
        }
    }

    #[tokio::test]
    async fn start_session_replies_with_unicast_qr() {
        let state = Arc::new(AppState::new(Duration::from_secs(8)));
        let (tx, mut rx) = mpsc::channel(8);

        handle_client_message(start_session("+5511912345678"), &tx, &state, 1).await;

        match rx.recv().await.expect("reply") {
            OutboundMessage::Json(ServerMessage::Qr { number, qr }) => {
                assert_eq!(number, "+5511912345678");
                assert!(qr.starts_with("data:image/svg+xml;base64,"));
            }
            _ => panic!("expected qr reply"),
        }
    }

    #[tokio::test]
    async fn duplicate_start_session_replies_with_pairing_error() {
        let state = Arc::new(AppState::new(Duration::from_secs(8)));
        let (tx, mut rx) = mpsc::channel(8);

        handle_client_message(start_session("+5511912345678"), &tx, &state, 1).await;
        let _ = rx.recv().await.expect("qr for first request");

        handle_client_message(start_session("+5511912345678"), &tx, &state, 2).await;
        match rx.recv().await.expect("error reply") {
            OutboundMessage::Json(ServerMessage::PairingError { number, message }) => {
                assert_eq!(number, "+5511912345678");
                assert!(message.contains("already registered"));
            }
            _ => panic!("expected pairing-error reply"),
        }
    }

    #[tokio::test]
    async fn invalid_start_session_replies_with_pairing_error() {
        let state = Arc::new(AppState::new(Duration::from_secs(8)));
        let (tx, mut rx) = mpsc::channel(8);

        handle_client_message(
            ClientMessage::StartSession {
                name: String::new(),
                phone: "+5511912345678".to_string(),
                paired_by: "Admin".to_string(),
            },
            &tx,
            &state,
            1,
        )
        .await;

        match rx.recv().await.expect("error reply") {
            OutboundMessage::Json(ServerMessage::PairingError { message, .. }) => {
                assert!(message.contains("required"));
            }
            _ => panic!("expected pairing-error reply"),
        }
        assert!(state.registry().list().await.is_empty());
    }
}
