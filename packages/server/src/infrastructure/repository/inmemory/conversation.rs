//! InMemory Conversation Repository 実装
//!
//! ドメイン層が定義する ConversationRepository trait の具体的な実装。
//! Room が存在するかどうかは、このリポジトリに登録された会話だけで決まります。

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    Conversation, ConversationRepository, Participant, RepositoryError, RoomId, Timestamp, UserId,
};

/// インメモリ Conversation Repository 実装
pub struct InMemoryConversationRepository {
    /// Key: Room ID
    conversations: Mutex<HashMap<RoomId, Conversation>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryConversationRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// 既知の Room ID で会話を登録する（起動時のシードとテスト用）
    ///
    /// 同じ Room ID の会話は置き換えられる。
    pub async fn insert(&self, conversation: Conversation) {
        let mut conversations = self.conversations.lock().await;
        conversations.insert(conversation.room_id.clone(), conversation);
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_room(&self, room_id: &RoomId) -> Result<Conversation, RepositoryError> {
        let conversations = self.conversations.lock().await;
        conversations
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
    }

    async fn list_participants(
        &self,
        room_id: &RoomId,
    ) -> Result<HashSet<UserId>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        conversations
            .get(room_id)
            .map(Conversation::participant_ids)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
    }

    async fn find_by_participant(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        let mut found: Vec<Conversation> = conversations
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.room_id.cmp(&b.room_id))
        });
        Ok(found)
    }

    async fn create(
        &self,
        participants: Vec<Participant>,
    ) -> Result<Conversation, RepositoryError> {
        // 同じユーザーが複数回指定された場合は最初の指定を採用
        let mut seen = HashSet::new();
        let participants: Vec<Participant> = participants
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        if participants.is_empty() {
            return Err(RepositoryError::InvalidRecord(
                "conversation needs at least one participant".to_string(),
            ));
        }

        let conversation = Conversation::new(
            RoomId::generate(),
            participants,
            Timestamp::new(self.clock.now_millis()),
        );
        let mut conversations = self.conversations.lock().await;
        conversations.insert(conversation.room_id.clone(), conversation.clone());
        tracing::info!(
            "Conversation '{}' created with {} participant(s)",
            conversation.room_id,
            conversation.participants.len()
        );
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Username;
    use hiroba_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 会話の作成・検索
    // - 存在しない Room の扱い（Admission が 404 を返す根拠になる）
    //
    // 【なぜこのテストが必要か】
    // - Room が存在するかどうかの判断はこのリポジトリだけが行う
    // ========================================

    fn participant(id: &str) -> Participant {
        Participant::new(UserId::try_from(id).unwrap(), Username::try_from(id).unwrap())
    }

    fn create_test_repository() -> InMemoryConversationRepository {
        InMemoryConversationRepository::new(Arc::new(FixedClock::new(1_000)))
    }

    #[tokio::test]
    async fn test_create_and_find_room() {
        // テスト項目: 作成した会話を Room ID で取得できる
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let created = repo
            .create(vec![participant("u1"), participant("u2")])
            .await
            .unwrap();
        let found = repo.find_room(&created.room_id).await.unwrap();

        // then (期待する結果):
        assert_eq!(found, created);
        assert_eq!(found.created_at, Timestamp::new(1_000));
        assert_eq!(found.participants.len(), 2);
    }

    #[tokio::test]
    async fn test_create_deduplicates_participants() {
        // テスト項目: 重複した参加者は 1 人として登録される
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let created = repo
            .create(vec![participant("u1"), participant("u2"), participant("u1")])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(created.participants.len(), 2);
    }

    #[tokio::test]
    async fn test_create_without_participants_fails() {
        // テスト項目: 参加者のいない会話は作成できない
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let result = repo.create(Vec::new()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::InvalidRecord(_))));
    }

    #[tokio::test]
    async fn test_find_unknown_room() {
        // テスト項目: 存在しない Room は RoomNotFound になる
        // given (前提条件):
        let repo = create_test_repository();
        let room_id = RoomId::try_from("missing").unwrap();

        // when (操作):
        let found = repo.find_room(&room_id).await;
        let participants = repo.list_participants(&room_id).await;

        // then (期待する結果):
        assert_eq!(found, Err(RepositoryError::RoomNotFound("missing".to_string())));
        assert_eq!(
            participants,
            Err(RepositoryError::RoomNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_find_by_participant() {
        // テスト項目: 指定ユーザーが参加している会話だけが返される
        // given (前提条件):
        let repo = create_test_repository();
        repo.insert(Conversation::new(
            RoomId::try_from("r1").unwrap(),
            vec![participant("u1"), participant("u2")],
            Timestamp::new(1),
        ))
        .await;
        repo.insert(Conversation::new(
            RoomId::try_from("r2").unwrap(),
            vec![participant("u2"), participant("u3")],
            Timestamp::new(2),
        ))
        .await;

        // when (操作):
        let found = repo
            .find_by_participant(&UserId::try_from("u2").unwrap())
            .await
            .unwrap();
        let none = repo
            .find_by_participant(&UserId::try_from("u9").unwrap())
            .await
            .unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = found.iter().map(|c| c.room_id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_participants() {
        // テスト項目: 会話の参加者 ID の集合を取得できる
        // given (前提条件):
        let repo = create_test_repository();
        repo.insert(Conversation::new(
            RoomId::try_from("r1").unwrap(),
            vec![participant("u1"), participant("u2")],
            Timestamp::new(1),
        ))
        .await;

        // when (操作):
        let ids = repo
            .list_participants(&RoomId::try_from("r1").unwrap())
            .await
            .unwrap();

        // then (期待する結果):
        let expected: HashSet<UserId> = ["u1", "u2"]
            .into_iter()
            .map(|id| UserId::try_from(id).unwrap())
            .collect();
        assert_eq!(ids, expected);
    }
}
