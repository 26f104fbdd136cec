//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{IdentityError, RepositoryError, ValueObjectError};

/// Room への参加（Admission）エラー
///
/// いずれの場合も Client は生成されず、Hub には何も登録されない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] IdentityError),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("User '{user_id}' is already connected to room '{room_id}'")]
    AlreadyJoined { room_id: String, user_id: String },

    #[error("Hub is not running")]
    HubUnavailable,

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// メッセージ送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("Failed to persist message: {0}")]
    PersistFailed(RepositoryError),

    #[error("Hub is not running")]
    HubUnavailable,
}

/// Presence 接続の開始エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectPresenceError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] IdentityError),
}

/// 会話の作成・取得エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] IdentityError),

    #[error("Invalid participant: {0}")]
    InvalidParticipant(#[from] ValueObjectError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Room のメッセージ履歴の取得エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomMessagesError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] IdentityError),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("User is not a participant of room '{0}'")]
    Forbidden(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// 稼働中の Room の取得エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomError {
    #[error("Room '{0}' is not active")]
    RoomNotFound(String),

    #[error("Hub is not running")]
    HubUnavailable,
}
