//! Repository trait 定義
//!
//! ドメイン層が必要とする外部ストアへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::collections::HashSet;

use async_trait::async_trait;

use super::{ChatMessage, Conversation, MessageId, Participant, RepositoryError, RoomId, UserId};

/// メッセージの保存先
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存し、採番された ID を返す
    async fn insert(&self, message: &ChatMessage) -> Result<MessageId, RepositoryError>;

    /// Room のメッセージ履歴を古い順に取得
    async fn list_by_room(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError>;
}

/// 会話（Room）の保存先
///
/// Room が存在するかどうかの判断は、このリポジトリだけが行う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Room ID から会話を取得（存在しなければ `RoomNotFound`）
    async fn find_room(&self, room_id: &RoomId) -> Result<Conversation, RepositoryError>;

    /// 会話の参加者 ID を取得（Presence 通知の宛先に使う）
    async fn list_participants(&self, room_id: &RoomId)
    -> Result<HashSet<UserId>, RepositoryError>;

    /// 指定ユーザーが参加している会話を全て取得
    async fn find_by_participant(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError>;

    /// 新しい会話を作成
    async fn create(&self, participants: Vec<Participant>)
    -> Result<Conversation, RepositoryError>;
}
