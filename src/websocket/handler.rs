//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;

/// WebSocket upgrade handler
///
/// Upgrades the HTTP connection and starts message handling.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let hub = Arc::clone(&state.ws_hub);
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match hub.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Some(msg) = encode(&error_msg) {
                let _ = sender.send(msg).await;
            }
            return;
        }
    };

    let connected = encode(&ServerMessage::Connected {
        connection_id: connection_id.clone(),
    });
    let sent = match connected {
        Some(msg) => sender.send(msg).await.is_ok(),
        None => false,
    };
    if !sent {
        tracing::error!(connection_id = %connection_id, "Failed to send connected message");
        hub.unregister(&connection_id).await;
        return;
    }

    let conn_id_for_send = connection_id.clone();

    // Forward queued messages to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(frame) = encode(&msg) else {
                continue;
            };
            if sender.send(frame).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let state_for_recv = Arc::clone(&state);
    let conn_id_for_recv = connection_id.clone();

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&state_for_recv, &conn_id_for_recv, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

/// Handle a received WebSocket frame
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(state: &AppState, connection_id: &str, message: Message) -> bool {
    let hub = &state.ws_hub;
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    let reply = handle_client_message(state, connection_id, client_msg).await;
                    let _ = hub.send_to(connection_id, reply).await;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        error = %e,
                        "Invalid client message"
                    );
                    let error_msg = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = hub.send_to(connection_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_msg = ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            };
            let _ = hub.send_to(connection_id, error_msg).await;
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}

/// Produce the reply for a parsed client message
async fn handle_client_message(
    state: &AppState,
    connection_id: &str,
    message: ClientMessage,
) -> ServerMessage {
    let hub: &ConnectionHub = &state.ws_hub;
    match message {
        ClientMessage::Subscribe { topics } => match hub.subscribe(connection_id, topics).await {
            Ok(subscribed) => ServerMessage::Subscribed { topics: subscribed },
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "Subscribe error");
                ServerMessage::Error {
                    message: e.to_string(),
                }
            }
        },
        ClientMessage::Unsubscribe { topics } => {
            match hub.unsubscribe(connection_id, topics).await {
                Ok(unsubscribed) => ServerMessage::Unsubscribed {
                    topics: unsubscribed,
                },
                Err(e) => {
                    tracing::error!(
                        connection_id = %connection_id,
                        error = %e,
                        "Unsubscribe error"
                    );
                    ServerMessage::Error {
                        message: e.to_string(),
                    }
                }
            }
        }
        ClientMessage::Snapshot => ServerMessage::Snapshot {
            dashboard: state.dashboard(),
        },
        ClientMessage::Ping => ServerMessage::Pong,
    }
}
