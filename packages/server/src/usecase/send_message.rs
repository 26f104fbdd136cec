//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化 → Hub への配信依頼、の順序と永続化失敗時のポリシー
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗したメッセージを配信するかどうかは設定で切り替わる
//! - 配信されるメッセージには永続化層が採番した ID が付与されている必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：永続化して配信
//! - 異常系：永続化失敗（Suppress / Deliver）、Hub 停止

use std::sync::Arc;

use clap::ValueEnum;
use hiroba_shared::time::Clock;

use crate::domain::{
    ChatHub, ChatMessage, MessageContent, MessageRepository, RoomId, Timestamp, UserId,
    Username,
};

use super::error::SendMessageError;

/// 永続化に失敗したメッセージの扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PersistFailurePolicy {
    /// 配信しない（接続は維持する）
    #[default]
    Suppress,
    /// ID なしで配信する
    Deliver,
}

/// メッセージの送信者（接続ごとに固定）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAuthor {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub username: Username,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    message_repository: Arc<dyn MessageRepository>,
    hub: Arc<dyn ChatHub>,
    clock: Arc<dyn Clock>,
    persist_failure: PersistFailurePolicy,
}

impl SendMessageUseCase {
    pub fn new(
        message_repository: Arc<dyn MessageRepository>,
        hub: Arc<dyn ChatHub>,
        clock: Arc<dyn Clock>,
        persist_failure: PersistFailurePolicy,
    ) -> Self {
        Self {
            message_repository,
            hub,
            clock,
            persist_failure,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - Hub に配信を依頼したメッセージ
    /// * `Err(SendMessageError)` - 配信されなかった
    pub async fn execute(
        &self,
        author: &MessageAuthor,
        content: MessageContent,
    ) -> Result<ChatMessage, SendMessageError> {
        let message = ChatMessage::new(
            author.room_id.clone(),
            author.user_id.clone(),
            author.username.clone(),
            content,
            Timestamp::new(self.clock.now_millis()),
        );

        // 1. 永続化
        let message = match self.message_repository.insert(&message).await {
            Ok(id) => message.with_id(id),
            Err(e) => match self.persist_failure {
                PersistFailurePolicy::Suppress => {
                    tracing::error!(
                        "Failed to persist message from '{}' in room '{}': {}",
                        author.user_id,
                        author.room_id,
                        e
                    );
                    return Err(SendMessageError::PersistFailed(e));
                }
                PersistFailurePolicy::Deliver => {
                    tracing::warn!(
                        "Failed to persist message from '{}' in room '{}', delivering anyway: {}",
                        author.user_id,
                        author.room_id,
                        e
                    );
                    message
                }
            },
        };

        // 2. Hub に配信を依頼
        self.hub
            .route(message.clone())
            .await
            .map_err(|_| SendMessageError::HubUnavailable)?;

        Ok(message)
    }
}
