//! UseCase: Presence 接続の開始
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectPresenceUseCase::authenticate() / connect() メソッド
//! - 登録後、会話を共有するオンラインの相手とオンライン状態を交換すること
//!
//! ### なぜこのテストが必要か
//! - 認証は upgrade 前、登録は upgrade 後に行い、開かなかった接続を相手に通知しない
//! - オフラインの相手には何も送らず、オンラインの相手とは双方向に通知する
//! - 会話の取得に失敗しても接続自体は確立する
//!
//! ### どのような状況を想定しているか
//! - 正常系：相手がオンライン / オフライン / キューが満杯
//! - 異常系：未認証、会話の取得失敗

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{
    ConversationRepository, Credentials, Identity, IdentityResolver, PresenceEvent,
    PresencePushError, PresenceToken, PresenceTracker, counterparts_of,
};

use super::error::ConnectPresenceError;

/// 登録済みの Presence 接続
#[derive(Debug)]
pub struct PresenceSession {
    pub identity: Identity,
    /// 登録解除に使う
    pub token: PresenceToken,
    pub events: mpsc::Receiver<PresenceEvent>,
}

/// Presence 接続開始のユースケース
pub struct ConnectPresenceUseCase {
    identity_resolver: Arc<dyn IdentityResolver>,
    conversation_repository: Arc<dyn ConversationRepository>,
    presence: Arc<dyn PresenceTracker>,
    channel_capacity: usize,
}

impl ConnectPresenceUseCase {
    pub fn new(
        identity_resolver: Arc<dyn IdentityResolver>,
        conversation_repository: Arc<dyn ConversationRepository>,
        presence: Arc<dyn PresenceTracker>,
        channel_capacity: usize,
    ) -> Self {
        Self {
            identity_resolver,
            conversation_repository,
            presence,
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// 接続元のユーザーを特定する（upgrade 前）
    ///
    /// Presence Tracker には何も登録しない。
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Identity, ConnectPresenceError> {
        Ok(self.identity_resolver.resolve(credentials).await?)
    }

    /// Presence Tracker に登録し、オンラインの相手とオンライン状態を交換する（upgrade 後）
    pub async fn connect(&self, identity: Identity) -> PresenceSession {
        // 1. Presence Tracker に登録
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let token = self.presence.register(identity.user_id.clone(), tx).await;

        // 2. オンラインの相手とオンライン状態を交換
        let conversations = match self
            .conversation_repository
            .find_by_participant(&identity.user_id)
            .await
        {
            Ok(conversations) => conversations,
            Err(e) => {
                tracing::warn!(
                    "Failed to load conversations of '{}', skipping online announcement: {}",
                    identity.user_id,
                    e
                );
                Vec::new()
            }
        };
        for counterpart in counterparts_of(&conversations, &identity.user_id) {
            let announcement = PresenceEvent::Online {
                user_id: identity.user_id.clone(),
                online: true,
            };
            // 接続を持っている相手 = オンラインの相手
            let counterpart_online = match self.presence.push_to(&counterpart, announcement).await {
                Ok(()) => true,
                Err(PresencePushError::ClientNotFound(_) | PresencePushError::ChannelClosed(_)) => {
                    false
                }
                Err(e) => {
                    tracing::debug!("Online status of '{}' not delivered: {}", identity.user_id, e);
                    true
                }
            };
            if !counterpart_online {
                continue;
            }

            let reply = PresenceEvent::Online {
                user_id: counterpart.clone(),
                online: true,
            };
            if let Err(e) = self.presence.push_to(&identity.user_id, reply).await {
                tracing::debug!("Online status of '{}' not delivered: {}", counterpart, e);
            }
        }

        tracing::info!("Presence connection of '{}' established", identity.user_id);
        PresenceSession {
            identity,
            token,
            events: rx,
        }
    }
}
