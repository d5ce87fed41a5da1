use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::stream::StreamExt;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::event::{channel_name, RoomEvent};
use crate::shared::{AppError, AppState};

/// HTTP handler upgrading to a WebSocket that forwards a room's broadcast
/// events as JSON.
///
/// GET /rooms/{code}/events
///
/// The subscription only sees events published after it is established;
/// clients fetch a snapshot first and reconcile with it if they fall
/// behind, so a lagged subscriber is dropped from the buffer rather than
/// blocking the channel.
#[instrument(name = "room_events", skip(state, ws))]
pub async fn room_events(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    // Reject unknown codes before the upgrade
    let room = state.store.snapshot(&code).await?;
    let channel = channel_name(room.mode, &room.code);
    let receiver = state.event_bus.subscribe(&channel).await;

    info!(code = %room.code, channel = %channel, "Client subscribing to room events");
    Ok(ws.on_upgrade(move |socket| forward_events(socket, receiver)))
}

/// Pumps events from the room channel to the client until either side
/// disconnects
async fn forward_events(mut socket: WebSocket, mut receiver: broadcast::Receiver<RoomEvent>) {
    loop {
        tokio::select! {
            event = receiver.recv() => {
                match event {
                    Ok(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!(error = %e, "Failed to serialize room event");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json)).await.is_err() {
                            debug!("Client went away, closing event stream");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // The client's full-state reconciliation covers the gap
                        warn!(skipped = skipped, "Event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            inbound = socket.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // This stream is one-way; ignore client chatter
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket receive error");
                        break;
                    }
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}
