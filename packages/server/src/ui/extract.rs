//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;

use crate::domain::Credentials;

#[derive(Debug, Default, Deserialize)]
struct CredentialsQuery {
    token: Option<String>,
    user_id: Option<String>,
    username: Option<String>,
}

/// Credentials from `Authorization: Bearer <token>` and the `token`, `user_id`
/// and `username` query parameters.
///
/// Never rejects: whether the credentials are sufficient is decided by the
/// identity resolver.
#[derive(Debug, Clone)]
pub struct ExtractCredentials(pub Credentials);

impl<S> FromRequestParts<S> for ExtractCredentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<CredentialsQuery>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();
        let header_token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        Ok(Self(Credentials {
            bearer_token: header_token.or(non_empty(query.token)),
            user_id: non_empty(query.user_id),
            username: non_empty(query.username),
        }))
    }
}

fn bearer_token(header: &str) -> Option<String> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    non_empty(Some(token.trim().to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
