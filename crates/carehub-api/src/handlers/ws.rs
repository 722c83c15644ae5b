//! WebSocket upgrade handler.
//!
//! One socket per browser tab. Text frames carry JSON events; malformed
//! frames earn the sender a typed `error` event and never touch engine
//! state. Closing the socket (or losing it) drives presence cleanup and
//! implicit call/meeting teardown.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use carehub_core::error::{AppError, ErrorKind};
use carehub_entity::identity::Identity;
use carehub_realtime::message::types::{ClientEvent, ServerEvent};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// JWT access token; required when `auth.require_token` is set.
    pub token: Option<String>,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrade.
    let identity = match query.token.as_deref() {
        Some(token) => Some(state.authenticator.authenticate(token)?),
        None if state.config.auth.require_token => {
            return Err(AppError::authentication("Missing access token").into())
        }
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(state, identity, socket)))
}

/// Drives one established connection until it closes.
async fn handle_socket(state: AppState, identity: Option<Identity>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (conn, mut outbound_rx) = state.engine.connect(identity);
    let conn_id = conn.id;

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Forward engine events to the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!(conn_id = %conn_id, error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Process inbound frames in arrival order.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => state.engine.handle_event(&conn, event).await,
                Err(e) => {
                    conn.send(ServerEvent::Error {
                        code: ErrorKind::Validation.to_string(),
                        message: format!("Malformed event: {e}"),
                    });
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.engine.disconnect(&conn_id).await;

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
