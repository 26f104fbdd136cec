//! UseCase: 呼び出し元が参加している会話の一覧

use std::sync::Arc;

use crate::domain::{Conversation, ConversationRepository, Credentials, IdentityResolver};

use super::error::ConversationError;

pub struct GetConversationsUseCase {
    identity_resolver: Arc<dyn IdentityResolver>,
    conversation_repository: Arc<dyn ConversationRepository>,
}

impl GetConversationsUseCase {
    pub fn new(
        identity_resolver: Arc<dyn IdentityResolver>,
        conversation_repository: Arc<dyn ConversationRepository>,
    ) -> Self {
        Self {
            identity_resolver,
            conversation_repository,
        }
    }

    pub async fn execute(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Conversation>, ConversationError> {
        let identity = self.identity_resolver.resolve(credentials).await?;
        Ok(self
            .conversation_repository
            .find_by_participant(&identity.user_id)
            .await?)
    }
}
