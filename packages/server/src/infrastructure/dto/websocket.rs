//! WebSocket frame DTOs.
//!
//! Inbound room frames are raw message bodies and have no DTO.

use serde::{Deserialize, Serialize};

/// Chat message frame sent to room members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageFrame {
    /// Store-assigned id, omitted when the message was not persisted
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub room_id: String,
    pub username: String,
    pub content: String,
    pub user_id: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Notification,
}

/// New message in one of the user's rooms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFrame {
    pub user_id: String,
    pub content: String,
    pub username: String,
    #[serde(rename = "type")]
    pub r#type: NotificationType,
}

/// Online status change of a counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineStatusFrame {
    pub user_id: String,
    pub online: bool,
}

/// Any frame written to a presence connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresenceFrame {
    Notification(NotificationFrame),
    Online(OnlineStatusFrame),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_frame_omits_missing_id() {
        // テスト項目: 未永続化のメッセージは `_id` を含まない
        // given (前提条件):
        let frame = ChatMessageFrame {
            id: None,
            room_id: "r1".to_string(),
            username: "u1".to_string(),
            content: "hello".to_string(),
            user_id: "u1".to_string(),
            created_at: "2023-01-01T00:00:00.000Z".to_string(),
        };

        // when (操作):
        let value = serde_json::to_value(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "room_id": "r1",
                "username": "u1",
                "content": "hello",
                "user_id": "u1",
                "created_at": "2023-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_chat_frame_uses_underscore_id() {
        // テスト項目: 永続化済みのメッセージ ID は `_id` として出力される
        // given (前提条件):
        let frame = ChatMessageFrame {
            id: Some("m1".to_string()),
            room_id: "r1".to_string(),
            username: "u1".to_string(),
            content: "hello".to_string(),
            user_id: "u1".to_string(),
            created_at: "2023-01-01T00:00:00.000Z".to_string(),
        };

        // when (操作):
        let value = serde_json::to_value(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(value["_id"], "m1");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_presence_frames_wire_shape() {
        // テスト項目: Presence フレームが外部仕様どおりの形で出力される
        // given (前提条件):
        let notification = PresenceFrame::Notification(NotificationFrame {
            user_id: "u1".to_string(),
            content: "hello".to_string(),
            username: "Alice".to_string(),
            r#type: NotificationType::Notification,
        });
        let online = PresenceFrame::Online(OnlineStatusFrame {
            user_id: "u2".to_string(),
            online: false,
        });

        // when (操作):
        let notification = serde_json::to_value(&notification).unwrap();
        let online = serde_json::to_value(&online).unwrap();

        // then (期待する結果):
        assert_eq!(
            notification,
            json!({"user_id": "u1", "content": "hello", "username": "Alice", "type": "notification"})
        );
        assert_eq!(online, json!({"user_id": "u2", "online": false}));
    }

    #[test]
    fn test_presence_frame_deserializes_either_shape() {
        // テスト項目: クライアント側で受け取ったフレームを種類ごとに判別できる
        // given (前提条件):
        let raw = r#"{"user_id":"u2","online":true}"#;

        // when (操作):
        let frame: PresenceFrame = serde_json::from_str(raw).unwrap();

        // then (期待する結果):
        assert_eq!(
            frame,
            PresenceFrame::Online(OnlineStatusFrame {
                user_id: "u2".to_string(),
                online: true,
            })
        );
    }
}
