//! InMemory Message Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, MessageId, MessageRepository, RepositoryError, RoomId};

/// インメモリ Message Repository 実装
///
/// `capacity_per_room` を指定すると、Room ごとの保存件数がその値に達した時点で
/// `CapacityExceeded` を返す（永続化失敗時の振る舞いを確認するため）。
#[derive(Default)]
pub struct InMemoryMessageRepository {
    /// Key: Room ID, Value: 保存順のメッセージ
    messages: Mutex<HashMap<RoomId, Vec<ChatMessage>>>,
    capacity_per_room: Option<usize>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_per_room(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            capacity_per_room: Some(capacity),
        }
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &ChatMessage) -> Result<MessageId, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let stored = messages.entry(message.room_id.clone()).or_default();
        if self
            .capacity_per_room
            .is_some_and(|capacity| stored.len() >= capacity)
        {
            return Err(RepositoryError::CapacityExceeded(message.room_id.to_string()));
        }

        let id = MessageId::generate();
        stored.push(message.clone().with_id(id.clone()));
        Ok(id)
    }

    async fn list_by_room(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages.get(room_id).cloned().unwrap_or_default())
    }
}
