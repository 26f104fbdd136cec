//! インメモリ Identity Resolver 実装
//!
//! 次の順で資格情報を解決します。
//!
//! 1. Bearer トークン: 起動時に登録したトークン表を引く（未登録なら `InvalidToken`）
//! 2. クエリパラメータの `user_id`（`allow_query_identity` が有効な場合のみ）
//!
//! クエリで解決した場合、表示名は `username` パラメータ、無ければユーザー ID を使う。

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Credentials, Identity, IdentityError, IdentityResolver, UserId, Username};

pub struct InMemoryIdentityResolver {
    /// Key: Bearer トークン
    tokens: HashMap<String, Identity>,
    allow_query_identity: bool,
}

impl InMemoryIdentityResolver {
    pub fn new(allow_query_identity: bool) -> Self {
        Self {
            tokens: HashMap::new(),
            allow_query_identity,
        }
    }

    /// トークンとユーザーの対応を登録する（同じトークンは上書き）
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    fn resolve_query(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        let user_id = credentials
            .user_id
            .as_deref()
            .ok_or(IdentityError::MissingCredentials)?;
        let user_id = UserId::try_from(user_id)?;
        let username = match credentials.username.as_deref() {
            Some(name) => Username::try_from(name)?,
            None => Username::try_from(user_id.as_str())?,
        };
        Ok(Identity {
            user_id,
            username,
            email: None,
        })
    }
}

#[async_trait]
impl IdentityResolver for InMemoryIdentityResolver {
    async fn resolve(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        if let Some(token) = credentials.bearer_token.as_deref() {
            return self
                .tokens
                .get(token)
                .cloned()
                .ok_or(IdentityError::InvalidToken);
        }
        if !self.allow_query_identity {
            return Err(IdentityError::MissingCredentials);
        }
        self.resolve_query(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValueObjectError;

    fn identity(id: &str, name: &str) -> Identity {
        Identity {
            user_id: UserId::try_from(id).unwrap(),
            username: Username::try_from(name).unwrap(),
            email: Some(format!("{id}@example.com")),
        }
    }

    fn query(user_id: Option<&str>, username: Option<&str>) -> Credentials {
        Credentials {
            bearer_token: None,
            user_id: user_id.map(str::to_string),
            username: username.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_resolve_registered_token() {
        // テスト項目: 登録済みトークンからユーザーが解決される
        // given (前提条件):
        let resolver =
            InMemoryIdentityResolver::new(false).with_token("secret", identity("u1", "Alice"));
        let credentials = Credentials {
            bearer_token: Some("secret".to_string()),
            ..Default::default()
        };

        // when (操作):
        let result = resolver.resolve(&credentials).await;

        // then (期待する結果):
        assert_eq!(result, Ok(identity("u1", "Alice")));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token_is_rejected_even_with_query() {
        // テスト項目: 不明なトークンはクエリの user_id があっても拒否される
        // given (前提条件):
        let resolver = InMemoryIdentityResolver::new(true);
        let credentials = Credentials {
            bearer_token: Some("nope".to_string()),
            user_id: Some("u1".to_string()),
            username: None,
        };

        // when (操作):
        let result = resolver.resolve(&credentials).await;

        // then (期待する結果):
        assert_eq!(result, Err(IdentityError::InvalidToken));
    }

    #[tokio::test]
    async fn test_resolve_query_uses_user_id_as_default_username() {
        // テスト項目: username が無い場合は user_id が表示名になる
        // given (前提条件):
        let resolver = InMemoryIdentityResolver::new(true);

        // when (操作):
        let result = resolver.resolve(&query(Some("u1"), None)).await.unwrap();

        // then (期待する結果):
        assert_eq!(result.user_id.as_str(), "u1");
        assert_eq!(result.username.as_str(), "u1");
        assert_eq!(result.email, None);
    }

    #[tokio::test]
    async fn test_resolve_query_with_username() {
        // テスト項目: username パラメータが表示名として使われる
        // given (前提条件):
        let resolver = InMemoryIdentityResolver::new(true);

        // when (操作):
        let result = resolver
            .resolve(&query(Some("u1"), Some("Alice")))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(result.username.as_str(), "Alice");
    }

    #[tokio::test]
    async fn test_resolve_query_disabled() {
        // テスト項目: クエリによる解決が無効な場合は MissingCredentials になる
        // given (前提条件):
        let resolver = InMemoryIdentityResolver::new(false);

        // when (操作):
        let result = resolver.resolve(&query(Some("u1"), None)).await;

        // then (期待する結果):
        assert_eq!(result, Err(IdentityError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_resolve_blank_user_id_is_invalid() {
        // テスト項目: 空白のみの user_id は InvalidIdentity になる
        // given (前提条件):
        let resolver = InMemoryIdentityResolver::new(true);

        // when (操作):
        let result = resolver.resolve(&query(Some("  "), None)).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(IdentityError::InvalidIdentity(ValueObjectError::Empty {
                field: "user_id"
            }))
        );
    }
}
