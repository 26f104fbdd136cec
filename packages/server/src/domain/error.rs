//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is too long ({actual} > {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// 永続化層（外部ストア）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Message capacity exceeded for room '{0}'")]
    CapacityExceeded(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// 認証（Identity 解決）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("No credentials provided")]
    MissingCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid identity: {0}")]
    InvalidIdentity(#[from] ValueObjectError),
}

/// Presence 接続へのプッシュエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresencePushError {
    #[error("User '{0}' has no presence connection")]
    ClientNotFound(String),

    #[error("Presence channel of '{0}' is full")]
    ChannelFull(String),

    #[error("Presence channel of '{0}' is closed")]
    ChannelClosed(String),
}

/// Hub への Join エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("User '{user_id}' is already connected to room '{room_id}'")]
    AlreadyJoined { room_id: String, user_id: String },

    #[error("Hub is not running")]
    HubUnavailable,
}

/// Hub 呼び出しのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("Hub is not running")]
    Unavailable,
}
