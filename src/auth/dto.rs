use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::jwt::SignedToken;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub fingerprint: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub fingerprint: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_in: OffsetDateTime,
}

impl From<SignedToken> for TokenResponse {
    fn from(t: SignedToken) -> Self {
        Self {
            token: t.token,
            token_type: "Bearer",
            expires_in: t.expires_at,
        }
    }
}

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub access: TokenResponse,
    pub refresh: TokenResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_shape() {
        let resp = TokenResponse {
            token: "abc".into(),
            token_type: "Bearer",
            expires_in: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["token"], "abc");
        assert_eq!(json["token_type"], "Bearer");
        assert!(json["expires_in"].as_str().unwrap().starts_with("2023-11-14"));
    }
}
