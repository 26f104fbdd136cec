//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{Participant, RoomId},
    infrastructure::dto::{
        http::{
            ConversationDto, CreateConversationRequest, CreateConversationResponse,
            HubStatusDto, RoomDetailDto, RoomSummaryDto,
        },
        websocket::ChatMessageFrame,
    },
    ui::{extract::ExtractCredentials, state::AppState},
    usecase::{ConversationError, GetRoomError, GetRoomMessagesError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Hub counters, live room count and online users
pub async fn debug_hub(State(state): State<Arc<AppState>>) -> Result<Json<HubStatusDto>, StatusCode> {
    let rooms = state
        .get_rooms_usecase
        .execute()
        .await
        .map_err(|e| get_room_error_status(&e))?;
    let online_users = state
        .presence
        .online_users()
        .await
        .into_iter()
        .map(|u| u.into_string())
        .collect();

    Ok(Json(HubStatusDto {
        active_rooms: rooms.len(),
        online_users,
        metrics: state.hub.metrics().into(),
    }))
}

/// Get list of live rooms
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, StatusCode> {
    let rooms = state
        .get_rooms_usecase
        .execute()
        .await
        .map_err(|e| get_room_error_status(&e))?;

    // Domain Model から DTO への変換
    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

/// Get live room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let room = state
        .get_room_detail_usecase
        .execute(&room_id)
        .await
        .map_err(|e| get_room_error_status(&e))?;
    Ok(Json(room.into()))
}

fn get_room_error_status(error: &GetRoomError) -> StatusCode {
    match error {
        GetRoomError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        GetRoomError::HubUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Create a conversation between the caller and the given participants
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    ExtractCredentials(credentials): ExtractCredentials,
    Json(request): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<CreateConversationResponse>), StatusCode> {
    let participants = request
        .participants
        .into_iter()
        .map(Participant::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::warn!("Invalid participant: {}", e);
            StatusCode::BAD_REQUEST
        })?;

    let conversation = state
        .create_conversation_usecase
        .execute(&credentials, participants)
        .await
        .map_err(|e| conversation_error_status(&e))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateConversationResponse {
            room_id: conversation.room_id.into_string(),
        }),
    ))
}

/// Conversations of the caller
pub async fn get_conversations(
    State(state): State<Arc<AppState>>,
    ExtractCredentials(credentials): ExtractCredentials,
) -> Result<Json<Vec<ConversationDto>>, StatusCode> {
    let conversations = state
        .get_conversations_usecase
        .execute(&credentials)
        .await
        .map_err(|e| conversation_error_status(&e))?;
    Ok(Json(conversations.into_iter().map(Into::into).collect()))
}

fn conversation_error_status(error: &ConversationError) -> StatusCode {
    match error {
        ConversationError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        ConversationError::InvalidParticipant(_) => StatusCode::BAD_REQUEST,
        ConversationError::Repository(e) => {
            tracing::error!("Conversation store error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Stored message history of a room, oldest first
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    ExtractCredentials(credentials): ExtractCredentials,
) -> Result<Json<Vec<ChatMessageFrame>>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let messages = state
        .get_room_messages_usecase
        .execute(&credentials, &room_id)
        .await
        .map_err(|e| match e {
            GetRoomMessagesError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GetRoomMessagesError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            GetRoomMessagesError::Forbidden(_) => StatusCode::FORBIDDEN,
            GetRoomMessagesError::Repository(e) => {
                tracing::error!("Message store error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;
    Ok(Json(messages.iter().map(ChatMessageFrame::from).collect()))
}
