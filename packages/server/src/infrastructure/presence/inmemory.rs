//! インメモリ Presence Tracker 実装
//!
//! ## 責務
//!
//! - ユーザー ID と Presence 接続の送信チャンネルの対応を管理
//! - Presence 接続へのイベント送信（push_to）
//!
//! ## 設計ノート
//!
//! Hub のループ外（Presence 接続の開始・終了）からも更新されるため、Hub とは独立した
//! Mutex で保護します。送信は `try_send` のみで、ロックを保持したまま待機しません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{
    PresenceChannel, PresenceEvent, PresencePushError, PresenceToken, PresenceTracker, UserId,
};

struct PresenceEntry {
    token: PresenceToken,
    channel: PresenceChannel,
}

/// インメモリ Presence Tracker
#[derive(Default)]
pub struct InMemoryPresenceTracker {
    /// Key: ユーザー ID
    /// Value: 現在有効な Presence 接続
    entries: Mutex<HashMap<UserId, PresenceEntry>>,
}

impl InMemoryPresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceTracker for InMemoryPresenceTracker {
    async fn register(&self, user_id: UserId, channel: PresenceChannel) -> PresenceToken {
        let token = PresenceToken::generate();
        let mut entries = self.entries.lock().await;
        let replaced = entries
            .insert(user_id.clone(), PresenceEntry { token, channel })
            .is_some();
        if replaced {
            tracing::info!("Presence connection of '{}' replaced", user_id);
        } else {
            tracing::debug!("User '{}' registered to PresenceTracker", user_id);
        }
        token
    }

    async fn unregister(&self, user_id: &UserId, token: PresenceToken) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get(user_id) {
            Some(entry) if entry.token == token => {
                entries.remove(user_id);
                tracing::debug!("User '{}' unregistered from PresenceTracker", user_id);
                true
            }
            _ => false,
        }
    }

    async fn push_to(
        &self,
        user_id: &UserId,
        event: PresenceEvent,
    ) -> Result<(), PresencePushError> {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get(user_id) else {
            return Err(PresencePushError::ClientNotFound(user_id.to_string()));
        };

        match entry.channel.try_send(event) {
            Ok(()) => {
                tracing::debug!("Pushed presence event to '{}'", user_id);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Presence channel of '{}' is full, event dropped", user_id);
                Err(PresencePushError::ChannelFull(user_id.to_string()))
            }
            Err(TrySendError::Closed(_)) => {
                // 接続は既に終了している。古いエントリを残さない
                entries.remove(user_id);
                Err(PresencePushError::ChannelClosed(user_id.to_string()))
            }
        }
    }

    async fn is_online(&self, user_id: &UserId) -> bool {
        let entries = self.entries.lock().await;
        entries
            .get(user_id)
            .is_some_and(|entry| !entry.channel.is_closed())
    }

    async fn online_users(&self) -> Vec<UserId> {
        let entries = self.entries.lock().await;
        let mut users: Vec<UserId> = entries
            .iter()
            .filter(|(_, entry)| !entry.channel.is_closed())
            .map(|(user_id, _)| user_id.clone())
            .collect();
        users.sort();
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - register / unregister のトークン照合
    // - push_to: 登録済み・未登録・満杯・切断済みの各ケース
    //
    // 【なぜこのテストが必要か】
    // - Hub の配信ループと Presence 接続の開始・終了が並行して触る唯一の共有状態
    // - 切断済みの接続のエントリが残らないことを保証する必要がある
    // ========================================

    fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    fn online(id: &str) -> PresenceEvent {
        PresenceEvent::Online {
            user_id: user(id),
            online: true,
        }
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 登録済みユーザーにイベントを送信できる
        // given (前提条件):
        let tracker = InMemoryPresenceTracker::new();
        let (tx, mut rx) = mpsc::channel(4);
        tracker.register(user("alice"), tx).await;

        // when (操作):
        let result = tracker.push_to(&user("alice"), online("bob")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some(online("bob")));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 未登録ユーザーへの送信は ClientNotFound になる
        // given (前提条件):
        let tracker = InMemoryPresenceTracker::new();

        // when (操作):
        let result = tracker.push_to(&user("nobody"), online("bob")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(PresencePushError::ClientNotFound("nobody".to_string()))
        );
    }

    #[tokio::test]
    async fn test_push_to_full_channel_drops_event() {
        // テスト項目: 満杯のチャンネルへの送信はブロックせず ChannelFull になる
        // given (前提条件):
        let tracker = InMemoryPresenceTracker::new();
        let (tx, _rx) = mpsc::channel(1);
        tracker.register(user("alice"), tx).await;
        tracker.push_to(&user("alice"), online("bob")).await.unwrap();

        // when (操作):
        let result = tracker.push_to(&user("alice"), online("carol")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(PresencePushError::ChannelFull("alice".to_string()))
        );
        assert!(tracker.is_online(&user("alice")).await);
    }

    #[tokio::test]
    async fn test_push_to_closed_channel_evicts_entry() {
        // テスト項目: 切断済みの接続への送信でエントリが削除される
        // given (前提条件):
        let tracker = InMemoryPresenceTracker::new();
        let (tx, rx) = mpsc::channel(4);
        tracker.register(user("alice"), tx).await;
        drop(rx);

        // when (操作):
        let result = tracker.push_to(&user("alice"), online("bob")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(PresencePushError::ChannelClosed("alice".to_string()))
        );
        assert!(tracker.online_users().await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_with_stale_token_keeps_new_entry() {
        // テスト項目: 置き換えられた古い接続の登録解除では新しい接続のエントリは消えない
        // given (前提条件):
        let tracker = InMemoryPresenceTracker::new();
        let (old_tx, mut old_rx) = mpsc::channel(4);
        let (new_tx, _new_rx) = mpsc::channel(4);
        let old_token = tracker.register(user("alice"), old_tx).await;
        let new_token = tracker.register(user("alice"), new_tx).await;

        // when (操作):
        let removed_old = tracker.unregister(&user("alice"), old_token).await;

        // then (期待する結果):
        assert!(!removed_old);
        assert!(tracker.is_online(&user("alice")).await);
        // 置き換えによって古いチャンネルは閉じている
        assert_eq!(old_rx.recv().await, None);
        assert!(tracker.unregister(&user("alice"), new_token).await);
        assert!(!tracker.is_online(&user("alice")).await);
    }

    #[tokio::test]
    async fn test_online_users_sorted() {
        // テスト項目: オンラインユーザーがソートされて返される
        // given (前提条件):
        let tracker = InMemoryPresenceTracker::new();
        let (tx1, _rx1) = mpsc::channel(1);
        let (tx2, _rx2) = mpsc::channel(1);
        tracker.register(user("carol"), tx1).await;
        tracker.register(user("alice"), tx2).await;

        // when (操作):
        let users = tracker.online_users().await;

        // then (期待する結果):
        assert_eq!(users, vec![user("alice"), user("carol")]);
    }
}
