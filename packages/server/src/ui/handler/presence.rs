//! Presence connection handler.
//!
//! The presence connection is room independent: it only carries
//! notifications and online status changes to the user. Inbound frames are
//! ignored. The user is registered with the tracker only after the upgrade,
//! so counterparts never see a connection that did not open.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::stream::StreamExt;

use crate::{
    domain::Identity,
    infrastructure::dto::websocket::PresenceFrame,
    ui::{extract::ExtractCredentials, state::AppState},
    usecase::{ConnectPresenceError, PresenceSession},
};

use super::websocket::pusher_loop;

/// `GET /ws/join_app`
pub async fn join_app_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ExtractCredentials(credentials): ExtractCredentials,
) -> Result<impl IntoResponse, StatusCode> {
    let identity = state
        .connect_presence_usecase
        .authenticate(&credentials)
        .await
        .map_err(|e| {
            tracing::warn!("Presence connection rejected: {}", e);
            match e {
                ConnectPresenceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            }
        })?;

    let user_id = identity.user_id.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("Presence upgrade failed for '{}': {}", user_id, e);
        })
        .on_upgrade(move |socket| run_presence_session(socket, state, identity)))
}

async fn run_presence_session(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let PresenceSession {
        identity,
        token,
        events,
    } = state.connect_presence_usecase.connect(identity).await;

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop::<_, PresenceFrame>(events, sender, identity.user_id.to_string());
    let peer = identity.user_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Presence connection error from '{}': {}", peer, e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_presence_usecase
        .execute(&identity.user_id, token)
        .await;
}
