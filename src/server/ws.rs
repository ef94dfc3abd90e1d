//! WebSocket transport: one connection equals one subscriber.
//!
//! Outbound, every notification the thread broadcasts is rendered and
//! written to the socket in FIFO order. Inbound, text frames are message
//! submissions (htmx `ws-send` form payloads). Closing the socket
//! unsubscribes the connection.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use super::AppState;

/// Fields htmx submits from the chat form.
#[derive(Debug, Deserialize)]
struct WsSubmission {
    msg: String,
    #[serde(default)]
    name: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(thread_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    info!(thread_id = %thread_id, "websocket upgrade request");
    ws.on_upgrade(move |socket| handle_socket(socket, state, thread_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, thread_id: String) {
    let thread = state.pool.get_or_create(&thread_id).await;
    let connection_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel();
    thread.subscribe(connection_id.clone(), tx).await;
    info!(thread_id = %thread_id, connection_id = %connection_id, "websocket connected");

    let (mut sender, mut receiver) = socket.split();

    let renderer = state.renderer.clone();
    let send_handle = tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            let fragment = renderer.render(&notification);
            if sender.send(WsMessage::Text(fragment)).await.is_err() {
                break;
            }
        }
    });

    let submit_thread = thread.clone();
    let receive_handle = tokio::spawn(async move {
        while let Some(Ok(frame)) = receiver.next().await {
            match frame {
                WsMessage::Text(text) => match serde_json::from_str::<WsSubmission>(&text) {
                    Ok(submission) if !submission.msg.trim().is_empty() => {
                        let author = submission.name.as_deref().unwrap_or("User");
                        submit_thread.submit_message(&submission.msg, author).await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!(error = %e, "ignoring unparseable websocket frame");
                    }
                },
                WsMessage::Close(_) => {
                    info!("client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_handle => debug!("send task completed"),
        _ = receive_handle => debug!("receive task completed"),
    }

    thread.unsubscribe(&connection_id).await;
    let remaining = thread.subscriber_count().await;
    debug!(thread_id = %thread_id, remaining, "websocket closed");
}
