//! Conversion logic between DTOs and domain entities.

use std::sync::Arc;

use hiroba_shared::time::millis_to_rfc3339;

use crate::{
    domain::{
        ChatMessage, Conversation, MemberSnapshot, Participant, PresenceEvent, RoomSnapshot,
        UserId, Username, ValueObjectError,
    },
    infrastructure::{
        dto::{http, websocket},
        hub::HubMetricsSnapshot,
    },
};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<http::ParticipantDto> for Participant {
    type Error = ValueObjectError;

    fn try_from(dto: http::ParticipantDto) -> Result<Self, Self::Error> {
        Ok(Participant::new(
            UserId::new(dto.id)?,
            Username::new(dto.username)?,
        ))
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for websocket::ChatMessageFrame {
    fn from(model: &ChatMessage) -> Self {
        Self {
            id: model.id.as_ref().map(|id| id.as_str().to_string()),
            room_id: model.room_id.as_str().to_string(),
            username: model.username.as_str().to_string(),
            content: model.content.as_str().to_string(),
            user_id: model.from.as_str().to_string(),
            created_at: millis_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<Arc<ChatMessage>> for websocket::ChatMessageFrame {
    fn from(model: Arc<ChatMessage>) -> Self {
        Self::from(model.as_ref())
    }
}

impl From<PresenceEvent> for websocket::PresenceFrame {
    fn from(event: PresenceEvent) -> Self {
        match event {
            PresenceEvent::Notification {
                from,
                username,
                content,
            } => Self::Notification(websocket::NotificationFrame {
                user_id: from.into_string(),
                content: content.into_string(),
                username: username.into_string(),
                r#type: websocket::NotificationType::Notification,
            }),
            PresenceEvent::Online { user_id, online } => {
                Self::Online(websocket::OnlineStatusFrame {
                    user_id: user_id.into_string(),
                    online,
                })
            }
        }
    }
}

impl From<MemberSnapshot> for http::MemberDto {
    fn from(member: MemberSnapshot) -> Self {
        Self {
            user_id: member.user_id.into_string(),
            username: member.username.into_string(),
            connection_id: member.connection_id.to_string(),
        }
    }
}

impl From<RoomSnapshot> for http::RoomSummaryDto {
    fn from(room: RoomSnapshot) -> Self {
        Self {
            id: room.room_id.into_string(),
            members: room
                .members
                .into_iter()
                .map(|m| m.user_id.into_string())
                .collect(),
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<RoomSnapshot> for http::RoomDetailDto {
    fn from(room: RoomSnapshot) -> Self {
        Self {
            id: room.room_id.into_string(),
            members: room.members.into_iter().map(Into::into).collect(),
            roster: room.roster.into_iter().map(UserId::into_string).collect(),
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<Participant> for http::ParticipantDto {
    fn from(model: Participant) -> Self {
        Self {
            id: model.id.into_string(),
            username: model.username.into_string(),
        }
    }
}

impl From<Conversation> for http::ConversationDto {
    fn from(model: Conversation) -> Self {
        Self {
            room_id: model.room_id.into_string(),
            participants: model.participants.into_iter().map(Into::into).collect(),
            created_at: millis_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<HubMetricsSnapshot> for http::HubMetricsDto {
    fn from(snapshot: HubMetricsSnapshot) -> Self {
        Self {
            joined: snapshot.joined,
            rejected_joins: snapshot.rejected_joins,
            left: snapshot.left,
            routed: snapshot.routed,
            delivered: snapshot.delivered,
            dropped_unknown_room: snapshot.dropped_unknown_room,
            dropped_full: snapshot.dropped_full,
            evicted: snapshot.evicted,
            notifications: snapshot.notifications,
        }
    }
}
