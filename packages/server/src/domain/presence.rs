//! Presence Tracker のインターフェース
//!
//! ユーザー ID から、そのユーザーの「全体用」接続（Room に依存しない通知用接続）への
//! 対応を管理します。1 ユーザーにつきエントリは高々 1 つです。

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{PresenceEvent, PresencePushError, UserId};

/// Presence 接続の送信チャンネル
pub type PresenceChannel = mpsc::Sender<PresenceEvent>;

/// 登録時に払い出されるトークン
///
/// 登録解除はトークンが一致する場合にのみ行われる。置き換え済みの古い接続が
/// 新しい接続のエントリを消すことはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresenceToken(Uuid);

impl PresenceToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceTracker: Send + Sync {
    /// 接続を登録する（既存のエントリは置き換えられる）
    async fn register(&self, user_id: UserId, channel: PresenceChannel) -> PresenceToken;

    /// 登録を解除する。トークンが一致して削除できた場合のみ `true`
    async fn unregister(&self, user_id: &UserId, token: PresenceToken) -> bool;

    /// 指定ユーザーの Presence 接続にイベントを送る（ブロックしない）
    async fn push_to(&self, user_id: &UserId, event: PresenceEvent)
    -> Result<(), PresencePushError>;

    async fn is_online(&self, user_id: &UserId) -> bool;

    /// オンラインのユーザー一覧（ソート済み）
    async fn online_users(&self) -> Vec<UserId>;
}
