//! Entity 定義
//!
//! - `ChatMessage`: Room に送信されたメッセージ（生成後は不変）
//! - `Conversation`: 永続化された会話（Room の実体）
//! - `Client`: Room に接続中の 1 クライアント
//! - `PresenceEvent`: Presence 接続に送る通知

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use tokio::sync::mpsc;

use super::value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId, Username,
};

/// チャットメッセージ
///
/// Connection Pump の reader が生成し、永続化されたあと Hub に渡される。
/// Hub は `room_id` を読むだけで、内容を変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// 永続化層が採番した ID（未永続化の場合は `None`）
    pub id: Option<MessageId>,
    pub room_id: RoomId,
    pub from: UserId,
    pub username: Username,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

impl ChatMessage {
    pub fn new(
        room_id: RoomId,
        from: UserId,
        username: Username,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: None,
            room_id,
            from,
            username,
            content,
            created_at,
        }
    }

    /// 永続化層が採番した ID を付与したメッセージを返す
    pub fn with_id(self, id: MessageId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}

/// 会話の参加者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: UserId,
    pub username: Username,
}

impl Participant {
    pub fn new(id: UserId, username: Username) -> Self {
        Self { id, username }
    }
}

/// 会話（永続化層のレコード）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub room_id: RoomId,
    pub participants: Vec<Participant>,
    pub created_at: Timestamp,
}

impl Conversation {
    pub fn new(room_id: RoomId, participants: Vec<Participant>, created_at: Timestamp) -> Self {
        Self {
            room_id,
            participants,
            created_at,
        }
    }

    pub fn participant_ids(&self) -> HashSet<UserId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| &p.id == user_id)
    }
}

/// 指定ユーザーと会話を共有している他のユーザーを列挙する（ソート済み、重複なし）
pub fn counterparts_of(conversations: &[Conversation], user_id: &UserId) -> Vec<UserId> {
    conversations
        .iter()
        .flat_map(|c| c.participants.iter())
        .filter(|p| &p.id != user_id)
        .map(|p| p.id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// クライアントの送信キュー（Hub → writer loop）
///
/// 容量付き。Hub は `try_send` のみを使い、キューが満杯でもブロックしない。
pub type OutboundQueue = mpsc::Sender<Arc<ChatMessage>>;

/// Room に接続中のクライアント
///
/// Hub が登録情報として保持する。接続そのものと送信キューの受信側は
/// Connection Pump が所有する。
#[derive(Debug, Clone)]
pub struct Client {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub username: Username,
    pub room_id: RoomId,
    pub outbound: OutboundQueue,
}

impl Client {
    pub fn new(user_id: UserId, username: Username, room_id: RoomId, outbound: OutboundQueue) -> Self {
        Self {
            connection_id: ConnectionId::generate(),
            user_id,
            username,
            room_id,
            outbound,
        }
    }

    pub fn ticket(&self) -> LeaveTicket {
        LeaveTicket {
            room_id: self.room_id.clone(),
            user_id: self.user_id.clone(),
            connection_id: self.connection_id,
        }
    }
}

/// Leave 要求
///
/// 接続 ID が一致する場合にのみ退出させる。古い接続の Leave が
/// 新しい接続を追い出すことはない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveTicket {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub connection_id: ConnectionId,
}

/// Presence 接続に送る通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    /// 参加中の Room に新着メッセージがあった
    Notification {
        from: UserId,
        username: Username,
        content: MessageContent,
    },
    /// 相手のオンライン状態が変化した
    Online { user_id: UserId, online: bool },
}

/// Hub が保持する Room の状態のスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub members: Vec<MemberSnapshot>,
    pub roster: Vec<UserId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub user_id: UserId,
    pub username: Username,
    pub connection_id: ConnectionId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str) -> Participant {
        Participant::new(UserId::try_from(id).unwrap(), Username::try_from(id).unwrap())
    }

    fn conversation(room: &str, ids: &[&str]) -> Conversation {
        Conversation::new(
            RoomId::try_from(room).unwrap(),
            ids.iter().map(|id| participant(id)).collect(),
            Timestamp::new(0),
        )
    }

    #[test]
    fn test_counterparts_of_excludes_self_and_duplicates() {
        // テスト項目: 自分自身を除き、複数の会話に登場する相手は 1 度だけ列挙される
        // given (前提条件):
        let conversations = vec![
            conversation("r1", &["u1", "u2"]),
            conversation("r2", &["u1", "u3"]),
            conversation("r3", &["u2", "u1"]),
        ];
        let me = UserId::try_from("u1").unwrap();

        // when (操作):
        let result = counterparts_of(&conversations, &me);

        // then (期待する結果):
        let ids: Vec<&str> = result.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["u2", "u3"]);
    }

    #[test]
    fn test_chat_message_with_id_keeps_other_fields() {
        // テスト項目: ID を付与してもその他のフィールドは変わらない
        // given (前提条件):
        let message = ChatMessage::new(
            RoomId::try_from("r1").unwrap(),
            UserId::try_from("u1").unwrap(),
            Username::try_from("alice").unwrap(),
            MessageContent::try_from("hello").unwrap(),
            Timestamp::new(1000),
        );

        // when (操作):
        let stored = message.clone().with_id(MessageId::try_from("m1").unwrap());

        // then (期待する結果):
        assert_eq!(stored.id.as_ref().map(|id| id.as_str()), Some("m1"));
        assert_eq!(stored.content, message.content);
        assert_eq!(stored.room_id, message.room_id);
        assert_eq!(stored.created_at, message.created_at);
    }

    #[test]
    fn test_client_ticket_matches_client() {
        // テスト項目: Client から生成した LeaveTicket が同じ接続を指す
        // given (前提条件):
        let (tx, _rx) = mpsc::channel(1);
        let client = Client::new(
            UserId::try_from("u1").unwrap(),
            Username::try_from("alice").unwrap(),
            RoomId::try_from("r1").unwrap(),
            tx,
        );

        // when (操作):
        let ticket = client.ticket();

        // then (期待する結果):
        assert_eq!(ticket.connection_id, client.connection_id);
        assert_eq!(ticket.user_id, client.user_id);
        assert_eq!(ticket.room_id, client.room_id);
    }
}
