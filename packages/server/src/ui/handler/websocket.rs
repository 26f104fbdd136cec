//! Room connection handler and its pump.
//!
//! Each accepted room connection runs two tasks:
//!
//! - reader: inbound frames → `SendMessageUseCase`
//! - writer: outbound queue → JSON text frames
//!
//! Admission (identity and room checks) runs before the upgrade; the hub is
//! only joined once the socket exists. A join the hub refuses is answered
//! with a Close frame.
//!
//! The session waits for whichever ends first, aborts the other, and then
//! issues the single Leave for the connection. Once joined, only the writer
//! sends Close.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{MessageContent, RoomId},
    infrastructure::dto::websocket::ChatMessageFrame,
    ui::{extract::ExtractCredentials, state::AppState},
    usecase::{
        Admission, JoinRoomError, JoinedClient, MessageAuthor, SendMessageError,
        SendMessageUseCase,
    },
};

/// `GET /join_room/{room_id}`
///
/// Unknown identities and rooms are answered with a plain HTTP status; the
/// hub is not touched until the upgrade has completed.
pub async fn join_room_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    ExtractCredentials(credentials): ExtractCredentials,
) -> Result<impl IntoResponse, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|e| {
        tracing::warn!("Invalid room id: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let admission = state
        .join_room_usecase
        .execute(&credentials, room_id)
        .await
        .map_err(|e| {
            tracing::warn!("Join rejected: {}", e);
            join_error_status(&e)
        })?;

    let user_id = admission.identity.user_id.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade failed for '{}': {}", user_id, e);
        })
        .on_upgrade(move |socket| run_room_session(socket, state, admission)))
}

fn join_error_status(error: &JoinRoomError) -> StatusCode {
    match error {
        JoinRoomError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        JoinRoomError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        JoinRoomError::AlreadyJoined { .. } => StatusCode::CONFLICT,
        JoinRoomError::HubUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        JoinRoomError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Close frame for a join refused after the upgrade
fn join_error_close_frame(error: &JoinRoomError) -> CloseFrame {
    let (code, reason) = match error {
        JoinRoomError::AlreadyJoined { .. } => (close_code::POLICY, "already joined"),
        JoinRoomError::HubUnavailable => (close_code::AGAIN, "hub unavailable"),
        _ => (close_code::ERROR, "join failed"),
    };
    CloseFrame {
        code,
        reason: Utf8Bytes::from_static(reason),
    }
}

async fn run_room_session(mut socket: WebSocket, state: Arc<AppState>, admission: Admission) {
    let joined = match state.join_room_usecase.attach(admission).await {
        Ok(joined) => joined,
        Err(e) => {
            tracing::warn!("Join rejected after upgrade: {}", e);
            let frame = join_error_close_frame(&e);
            let _ = socket.send(Message::Close(Some(frame))).await;
            return;
        }
    };

    let JoinedClient {
        identity,
        ticket,
        outbound,
    } = joined;
    let author = MessageAuthor {
        room_id: ticket.room_id.clone(),
        user_id: identity.user_id.clone(),
        username: identity.username.clone(),
    };
    tracing::info!(
        "Client '{}' connected to room '{}' ({})",
        ticket.user_id,
        ticket.room_id,
        ticket.connection_id
    );

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop::<_, ChatMessageFrame>(outbound, sender, ticket.user_id.to_string());
    let mut recv_task = tokio::spawn(room_reader(
        receiver,
        state.send_message_usecase.clone(),
        author,
    ));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    tracing::info!(
        "Client '{}' disconnected from room '{}'",
        ticket.user_id,
        ticket.room_id
    );
    state.leave_room_usecase.execute(ticket);
}

async fn room_reader(
    mut receiver: SplitStream<WebSocket>,
    send_message_usecase: Arc<SendMessageUseCase>,
    author: MessageAuthor,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error from '{}': {}", author.user_id, e);
                break;
            }
        };

        let text = match msg {
            Message::Text(text) => text.as_str().to_string(),
            Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!("Non UTF-8 binary frame from '{}' skipped", author.user_id);
                    continue;
                }
            },
            Message::Close(_) => {
                tracing::info!("Client '{}' requested close", author.user_id);
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => continue,
        };

        let content = match MessageContent::new(text) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Invalid message from '{}' skipped: {}", author.user_id, e);
                continue;
            }
        };

        match send_message_usecase.execute(&author, content).await {
            Ok(message) => tracing::debug!(
                "Message from '{}' sent to room '{}'",
                message.from,
                message.room_id
            ),
            // Logged by the use case; the connection stays open
            Err(SendMessageError::PersistFailed(_)) => {}
            Err(SendMessageError::HubUnavailable) => {
                tracing::error!("Hub is not running, closing connection of '{}'", author.user_id);
                break;
            }
        }
    }
}

/// Drains `rx` into the socket as JSON text frames.
///
/// A closed queue means the hub (or tracker) dropped this connection; the
/// loop then sends Close and ends.
pub(super) fn pusher_loop<T, F>(
    mut rx: mpsc::Receiver<T>,
    mut sender: SplitSink<WebSocket, Message>,
    peer: String,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Serialize + From<T>,
{
    tokio::spawn(async move {
        while let Some(item) = rx.recv().await {
            let json = match serde_json::to_string(&F::from(item)) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to encode frame for '{}': {}", peer, e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                tracing::debug!("Failed to write to '{}': {}", peer, e);
                return;
            }
        }

        tracing::info!("Outbound queue of '{}' closed, closing connection", peer);
        let _ = sender.send(Message::Close(None)).await;
    })
}
