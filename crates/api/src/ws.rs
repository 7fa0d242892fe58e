//! WebSocket endpoint streaming a channel's broadcast events.
//!
//! The stream is outbound-only JSON: each [`SprintEvent`] is serialized
//! with its `type`/`data` envelope as it is published. There is no replay;
//! a client that attaches late pairs this stream with `GET /runs/{id}/days`
//! for the already-persisted part.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use daybreak_events::ChannelRegistry;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(
    Path(channel): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, channel, state.registry, state.shutdown))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Subscribes to the named broadcast channel.
///   2. Spawns a sender task forwarding events to the sink.
///   3. Waits for the client to close on the current task.
async fn handle_socket(
    socket: WebSocket,
    channel: String,
    registry: ChannelRegistry,
    shutdown: CancellationToken,
) {
    tracing::info!(channel = %channel, "WebSocket attached");

    let mut rx = registry.subscribe(&channel).await;
    let (mut sink, mut stream) = socket.split();

    // Sender task: forward broadcast events until the channel closes, the
    // client goes away, or shutdown asks us to hang up.
    let sender_channel = channel.clone();
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                event = rx.recv() => match event {
                    Ok(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(payload) => payload,
                            Err(e) => {
                                tracing::warn!(channel = %sender_channel, error = %e, "Unserializable event dropped");
                                continue;
                            }
                        };
                        if sink.send(Message::Text(payload.into())).await.is_err() {
                            tracing::debug!(channel = %sender_channel, "WebSocket sink closed");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // The client missed events; persisted days cover the gap.
                        tracing::warn!(channel = %sender_channel, skipped, "WebSocket receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });

    // Inbound loop: the stream is listen-only, so anything but close is
    // ignored.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(channel = %channel, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    send_task.abort();
    // Housekeeping: channels whose last subscriber just left get dropped.
    registry.purge_idle().await;
    tracing::info!(channel = %channel, "WebSocket detached");
}
