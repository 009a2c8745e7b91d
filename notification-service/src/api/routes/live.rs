//! Live notification channel over WebSocket.
//!
//! On connect the client receives `{"type":"init","data":[...]}` with the
//! most recent notifications, then one `{"type":"notification","data":{...}}`
//! per published notification. Client messages other than close are ignored.

use std::time::Duration;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::api::server::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Upgrade to the live channel.
pub async fn live_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let subscription = match state.hub.connect() {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(error = %e, "Failed to register live subscriber");
            return;
        }
    };
    let subscriber_id = subscription.id;
    let mut outbound = subscription.receiver;
    info!(subscriber = %subscriber_id, "WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();

    let mut heartbeat = tokio::time::interval_at(
        tokio::time::Instant::now() + HEARTBEAT_INTERVAL,
        HEARTBEAT_INTERVAL,
    );
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }

            payload = outbound.recv() => {
                let Some(payload) = payload else { break };
                if let Err(e) = sender.send(Message::Text(payload)).await {
                    debug!(subscriber = %subscriber_id, error = %e, "WebSocket send failed");
                    break;
                }
            }

            _ = heartbeat.tick() => {
                if sender.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(subscriber = %subscriber_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        }
    }

    state.hub.disconnect(&subscriber_id);
    info!(subscriber = %subscriber_id, "WebSocket client disconnected");
}
