//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

/// Live room, as listed by `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    /// Connected user ids, sorted
    pub members: Vec<String>,
    pub created_at: String,
}

/// Live room detail, `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub members: Vec<MemberDto>,
    /// Conversation participants, connected or not
    pub roster: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub user_id: String,
    pub username: String,
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationDto {
    pub room_id: String,
    pub participants: Vec<ParticipantDto>,
    pub created_at: String,
}

/// `POST /api/conversations` body. The caller is always added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConversationResponse {
    pub room_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubMetricsDto {
    pub joined: u64,
    pub rejected_joins: u64,
    pub left: u64,
    pub routed: u64,
    pub delivered: u64,
    pub dropped_unknown_room: u64,
    pub dropped_full: u64,
    pub evicted: u64,
    pub notifications: u64,
}

/// `GET /debug/hub`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStatusDto {
    pub active_rooms: usize,
    pub online_users: Vec<String>,
    pub metrics: HubMetricsDto,
}
