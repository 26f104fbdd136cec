//! Hub のインターフェース
//!
//! Room のメンバー管理とブロードキャストを 1 つのループで直列化するコーディネータ。
//! UseCase 層はこの trait に依存し、Hub の実装（actor）には依存しない。

use std::collections::HashSet;

use async_trait::async_trait;

use super::{ChatMessage, Client, HubError, JoinError, LeaveTicket, RoomId, RoomSnapshot, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatHub: Send + Sync {
    /// クライアントを Room に参加させる
    ///
    /// `roster` は会話の参加者（Presence 通知の宛先）。Room が未生成なら
    /// この roster で生成される。同じユーザーが既に接続中なら `AlreadyJoined`。
    async fn join(&self, client: Client, roster: HashSet<UserId>) -> Result<(), JoinError>;

    /// クライアントを Room から退出させる（同期、ブロックしない）
    fn leave(&self, ticket: LeaveTicket);

    /// メッセージを Room のメンバーに配信する
    async fn route(&self, message: ChatMessage) -> Result<(), HubError>;

    /// 稼働中の全 Room のスナップショット
    async fn rooms(&self) -> Result<Vec<RoomSnapshot>, HubError>;

    /// 指定 Room のスナップショット
    async fn room(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, HubError>;
}
