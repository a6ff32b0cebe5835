use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::event::RideEvent;
use crate::presence::ChannelId;
use crate::state::AppState;

/// Messages a client may send over its socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Binds this connection as the push channel for a driver or rider.
    Register { id: Uuid },
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let channel = ChannelId::new();
    let (event_tx, event_rx) = mpsc::channel::<RideEvent>(state.notify_buffer_size);
    let (mut sender, mut receiver) = socket.split();

    info!(%channel, "websocket client connected");

    let mut send_task = tokio::spawn(async move {
        let mut events = ReceiverStream::new(event_rx);
        while let Some(event) = events.next().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize ride event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Register { id }) => {
                        recv_state.presence.register(id, channel, event_tx.clone());
                    }
                    Err(err) => warn!(%channel, error = %err, "ignoring malformed client message"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.presence.unregister(channel);
    info!(%channel, "websocket client disconnected");
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::ClientMessage;

    #[test]
    fn register_message_parses() {
        let id = Uuid::new_v4();
        let raw = format!(r#"{{"type":"register","id":"{id}"}}"#);

        let ClientMessage::Register { id: parsed } = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, id);
    }
}
