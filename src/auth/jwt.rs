use std::str::FromStr;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload. The subject is a user id for access tokens and a refresh
/// session id for refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub kind: TokenKind,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let auth = &state.config.auth;
        let algorithm = Algorithm::from_str(&auth.algorithm).unwrap_or_else(|_| {
            warn!(algorithm = %auth.algorithm, "unknown jwt algorithm, falling back to HS256");
            Algorithm::HS256
        });
        Self {
            encoding: EncodingKey::from_secret(auth.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(auth.secret_key.as_bytes()),
            algorithm,
            access_ttl: auth.access_token_ttl,
            refresh_ttl: auth.refresh_token_ttl,
        }
    }
}

/// A signed token together with its expiry instant.
pub struct SignedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

impl JwtKeys {
    fn sign(&self, sub: Uuid, kind: TokenKind, ttl: Duration) -> Result<SignedToken, AppError> {
        let now = OffsetDateTime::now_utc();
        let expires_at = now + ttl;
        let claims = Claims {
            sub,
            exp: expires_at.unix_timestamp() as usize,
            iat: now.unix_timestamp() as usize,
            kind,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
        debug!(sub = %sub, kind = ?kind, "jwt signed");
        Ok(SignedToken { token, expires_at })
    }

    /// Access token, subject = user id.
    pub fn sign_access(&self, user_id: Uuid) -> Result<SignedToken, AppError> {
        self.sign(user_id, TokenKind::Access, self.access_ttl)
    }

    /// Refresh token, subject = refresh session id.
    pub fn sign_refresh(&self, session_id: Uuid) -> Result<SignedToken, AppError> {
        self.sign(session_id, TokenKind::Refresh, self.refresh_ttl)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(self.algorithm);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt verification failed");
            AppError::Unauthorized
        })?;
        Ok(data.claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    /// Resolves the refresh session id carried by a refresh token. Any
    /// decoding failure is reported as an invalid session, not a generic 401.
    pub fn refresh_session_id(&self, token: &str) -> Result<Uuid, AppError> {
        let claims = self.verify(token).map_err(|_| AppError::InvalidRefreshSession)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AppError::InvalidRefreshSession);
        }
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let signed = keys.sign_access(user_id).expect("sign access");
        let claims = keys.verify_access(&signed.token).expect("verify access");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Access);
        assert!(signed.expires_at > OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn refresh_token_carries_session_id() {
        let keys = make_keys();
        let session_id = Uuid::new_v4();
        let signed = keys.sign_refresh(session_id).expect("sign refresh");
        let resolved = keys.refresh_session_id(&signed.token).expect("resolve");
        assert_eq!(resolved, session_id);
    }

    #[tokio::test]
    async fn access_token_is_not_a_refresh_token() {
        let keys = make_keys();
        let signed = keys.sign_access(Uuid::new_v4()).unwrap();
        let err = keys.refresh_session_id(&signed.token).unwrap_err();
        assert!(matches!(err, AppError::InvalidRefreshSession));
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let keys = make_keys();
        let signed = keys.sign_refresh(Uuid::new_v4()).unwrap();
        let err = keys.verify_access(&signed.token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn tampered_token_rejected() {
        let keys = make_keys();
        let signed = keys.sign_access(Uuid::new_v4()).unwrap();
        let mut tampered = signed.token.clone();
        tampered.push('x');
        assert!(keys.verify(&tampered).is_err());
    }

    #[tokio::test]
    async fn expired_token_rejected() {
        let keys = make_keys();
        // sign with a ttl well past the default validation leeway
        let signed = keys
            .sign(Uuid::new_v4(), TokenKind::Access, Duration::minutes(-5))
            .unwrap();
        assert!(keys.verify(&signed.token).is_err());
    }
}
