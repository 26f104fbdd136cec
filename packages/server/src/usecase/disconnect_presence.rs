//! UseCase: Presence 接続の終了

use std::sync::Arc;

use crate::domain::{
    ConversationRepository, PresenceEvent, PresencePushError, PresenceToken, PresenceTracker,
    UserId, counterparts_of,
};

/// Presence 接続終了のユースケース
pub struct DisconnectPresenceUseCase {
    conversation_repository: Arc<dyn ConversationRepository>,
    presence: Arc<dyn PresenceTracker>,
}

impl DisconnectPresenceUseCase {
    pub fn new(
        conversation_repository: Arc<dyn ConversationRepository>,
        presence: Arc<dyn PresenceTracker>,
    ) -> Self {
        Self {
            conversation_repository,
            presence,
        }
    }

    /// 登録を解除し、オンラインの相手にオフライン通知を送る
    ///
    /// 既に新しい接続に置き換えられていた場合は何も通知しない。
    ///
    /// # Returns
    ///
    /// 登録を解除できた場合は `true`
    pub async fn execute(&self, user_id: &UserId, token: PresenceToken) -> bool {
        if !self.presence.unregister(user_id, token).await {
            tracing::debug!("Presence entry of '{}' was already replaced", user_id);
            return false;
        }

        let conversations = match self.conversation_repository.find_by_participant(user_id).await
        {
            Ok(conversations) => conversations,
            Err(e) => {
                tracing::warn!(
                    "Failed to load conversations of '{}', skipping offline announcement: {}",
                    user_id,
                    e
                );
                Vec::new()
            }
        };
        for counterpart in counterparts_of(&conversations, user_id) {
            let event = PresenceEvent::Online {
                user_id: user_id.clone(),
                online: false,
            };
            match self.presence.push_to(&counterpart, event).await {
                Ok(()) | Err(PresencePushError::ClientNotFound(_)) => {}
                Err(e) => tracing::debug!("Offline status of '{}' not delivered: {}", user_id, e),
            }
        }

        tracing::info!("Presence connection of '{}' closed", user_id);
        true
    }
}
