//! UseCase: Room のメッセージ履歴の取得
//!
//! 会話の参加者だけが履歴を取得できる。

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ConversationRepository, Credentials, IdentityResolver, MessageRepository,
    RepositoryError, RoomId,
};

use super::error::GetRoomMessagesError;

pub struct GetRoomMessagesUseCase {
    identity_resolver: Arc<dyn IdentityResolver>,
    conversation_repository: Arc<dyn ConversationRepository>,
    message_repository: Arc<dyn MessageRepository>,
}

impl GetRoomMessagesUseCase {
    pub fn new(
        identity_resolver: Arc<dyn IdentityResolver>,
        conversation_repository: Arc<dyn ConversationRepository>,
        message_repository: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            identity_resolver,
            conversation_repository,
            message_repository,
        }
    }

    /// 履歴を古い順に返す
    pub async fn execute(
        &self,
        credentials: &Credentials,
        room_id: &RoomId,
    ) -> Result<Vec<ChatMessage>, GetRoomMessagesError> {
        let identity = self.identity_resolver.resolve(credentials).await?;

        let conversation = self
            .conversation_repository
            .find_room(room_id)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound(id) => GetRoomMessagesError::RoomNotFound(id),
                other => GetRoomMessagesError::Repository(other),
            })?;
        if !conversation.has_participant(&identity.user_id) {
            return Err(GetRoomMessagesError::Forbidden(room_id.to_string()));
        }

        self.message_repository
            .list_by_room(room_id)
            .await
            .map_err(GetRoomMessagesError::Repository)
    }
}
