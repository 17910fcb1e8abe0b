use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use types::outbound::OutboundMessage;

/// Control messages accepted from presentation clients. Both are idempotent
/// to retry.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlMessage {
    /// Follow a different broadcast room.
    #[serde(rename_all = "camelCase")]
    ConfigureSource { room_id: String },
    /// Start (or restart) the game session.
    StartSession,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Greeting: tell the client which room is currently configured.
    let room_id = state.sources.lock().await.room_id().map(str::to_string);
    if send_json(&mut sender, &OutboundMessage::Config { room_id })
        .await
        .is_err()
    {
        return;
    }

    let mut events = state.engine.subscribe();

    loop {
        tokio::select! {
            broadcast = events.recv() => match broadcast {
                Ok(message) => {
                    if send_json(&mut sender, &message).await.is_err() {
                        break;
                    }
                }
                // A lagging observer skips missed messages; the next
                // snapshot carries the current state anyway.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "observer lagged, skipping messages");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = handle_control(&state, text.as_str()).await {
                        warn!(error = %e, "control message failed");
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "websocket receive error");
                    break;
                }
            },
        }
    }
}

async fn handle_control(state: &AppState, raw: &str) -> Result<(), AppError> {
    // Malformed input is the client's fault; the caller logs it and the
    // connection (and session) carry on.
    let control: ControlMessage = serde_json::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("unparseable control message: {e}")))?;

    match control {
        ControlMessage::ConfigureSource { room_id } => {
            let mut sources = state.sources.lock().await;
            sources.attach(&room_id).await?;
        }
        ControlMessage::StartSession => {
            state.engine.start_session().await?;
        }
    }
    Ok(())
}

async fn send_json(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    message: &OutboundMessage,
) -> Result<(), ()> {
    let payload = match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "failed to serialize outbound message");
            return Ok(());
        }
    };
    sender
        .send(Message::Text(payload.into()))
        .await
        .map_err(|_| ())
}
