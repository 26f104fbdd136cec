//! Identity 解決のインターフェース
//!
//! リクエストの資格情報を安定したユーザー ID に変換する。
//! Hub はこの結果を信頼し、資格情報を再検証しない。

use async_trait::async_trait;

use super::{IdentityError, UserId, Username};

/// リクエストから取り出した資格情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// `Authorization: Bearer <token>` または `?token=`
    pub bearer_token: Option<String>,
    /// `?user_id=`
    pub user_id: Option<String>,
    /// `?username=`
    pub username: Option<String>,
}

/// 解決済みのユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: Username,
    pub email: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, credentials: &Credentials) -> Result<Identity, IdentityError>;
}
