//! UseCase: Room への参加（Admission）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() / attach() メソッド
//! - 認証 → Room の存在確認 → roster 取得（upgrade 前）と、Hub への登録（upgrade 後）
//!
//! ### なぜこのテストが必要か
//! - Admission が失敗した場合、Hub には何も登録されてはならない
//! - upgrade 前の Admission は Hub に触れない
//! - 重複接続の拒否が Hub から正しく伝わることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加と送信キューの受け渡し
//! - 異常系：未認証、存在しない Room、重複接続、Hub 停止

use std::{collections::HashSet, sync::Arc};

use tokio::sync::mpsc;

use crate::domain::{
    ChatHub, ChatMessage, Client, ConversationRepository, Credentials, Identity,
    IdentityResolver, JoinError, LeaveTicket, RepositoryError, RoomId, UserId,
};

use super::error::JoinRoomError;

/// Admission を通過した参加要求
///
/// Hub にはまだ登録されていない。upgrade が完了した後に
/// [`JoinRoomUseCase::attach`] へ渡す。
#[derive(Debug)]
pub struct Admission {
    pub identity: Identity,
    pub room_id: RoomId,
    roster: HashSet<UserId>,
}

/// Hub に登録済みのクライアント
///
/// `outbound` は Connection Pump の writer が所有する。
#[derive(Debug)]
pub struct JoinedClient {
    pub identity: Identity,
    pub ticket: LeaveTicket,
    pub outbound: mpsc::Receiver<Arc<ChatMessage>>,
}

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    identity_resolver: Arc<dyn IdentityResolver>,
    conversation_repository: Arc<dyn ConversationRepository>,
    hub: Arc<dyn ChatHub>,
    /// クライアントごとの送信キューの容量
    outbound_capacity: usize,
}

impl JoinRoomUseCase {
    pub fn new(
        identity_resolver: Arc<dyn IdentityResolver>,
        conversation_repository: Arc<dyn ConversationRepository>,
        hub: Arc<dyn ChatHub>,
        outbound_capacity: usize,
    ) -> Self {
        Self {
            identity_resolver,
            conversation_repository,
            hub,
            outbound_capacity: outbound_capacity.max(1),
        }
    }

    /// Admission を実行（upgrade 前）
    ///
    /// # Returns
    ///
    /// * `Ok(Admission)` - 認証済みで Room の存在を確認した参加要求
    /// * `Err(JoinRoomError)` - Admission 失敗
    ///
    /// どちらの場合も Hub には触れない。
    pub async fn execute(
        &self,
        credentials: &Credentials,
        room_id: RoomId,
    ) -> Result<Admission, JoinRoomError> {
        // 1. 認証
        let identity = self.identity_resolver.resolve(credentials).await?;

        // 2. Room の存在確認と roster の取得
        self.conversation_repository
            .find_room(&room_id)
            .await
            .map_err(repository_error)?;
        let roster = self
            .conversation_repository
            .list_participants(&room_id)
            .await
            .map_err(repository_error)?;

        Ok(Admission {
            identity,
            room_id,
            roster,
        })
    }

    /// Client を作成して Hub に登録する（upgrade 後）
    ///
    /// 失敗した場合 Hub には何も残らない。
    pub async fn attach(&self, admission: Admission) -> Result<JoinedClient, JoinRoomError> {
        let Admission {
            identity,
            room_id,
            roster,
        } = admission;

        let (tx, rx) = mpsc::channel(self.outbound_capacity);
        let client = Client::new(
            identity.user_id.clone(),
            identity.username.clone(),
            room_id,
            tx,
        );
        let ticket = client.ticket();
        self.hub.join(client, roster).await.map_err(|e| match e {
            JoinError::AlreadyJoined { room_id, user_id } => {
                JoinRoomError::AlreadyJoined { room_id, user_id }
            }
            JoinError::HubUnavailable => JoinRoomError::HubUnavailable,
        })?;

        Ok(JoinedClient {
            identity,
            ticket,
            outbound: rx,
        })
    }
}

fn repository_error(e: RepositoryError) -> JoinRoomError {
    match e {
        RepositoryError::RoomNotFound(room_id) => JoinRoomError::RoomNotFound(room_id),
        other => JoinRoomError::Repository(other),
    }
}
