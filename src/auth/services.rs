use axum::http::{header::USER_AGENT, HeaderMap};
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::dto::TokensResponse;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::verify_password;
use crate::auth::repo::{self, NewRefreshSession};
use crate::error::AppError;
use crate::users::repo::{self as users_repo, User};

/// Client metadata bound to a refresh session.
#[derive(Debug, Clone)]
pub struct SessionMeta {
    pub device: String,
    pub fingerprint: Uuid,
    pub ip: String,
}

pub fn session_meta(headers: &HeaderMap, fingerprint: Uuid) -> SessionMeta {
    let device = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_owned())
        .unwrap_or_else(|| "127.0.0.1".to_owned());
    SessionMeta {
        device,
        fingerprint,
        ip,
    }
}

/// Verifies credentials. Unknown username and wrong password produce the
/// same error so usernames cannot be enumerated.
pub async fn authenticate(db: &PgPool, username: &str, password: &str) -> Result<User, AppError> {
    let user = users_repo::get_by_username(db, username)
        .await
        .map_err(|e| match e {
            AppError::UsernameNotFound => AppError::BadCredentials,
            other => other,
        })?;
    if !verify_password(password, &user.hashed_password)? {
        return Err(AppError::BadCredentials);
    }
    Ok(user)
}

/// Creates a refresh session and signs a token pair. When the user already
/// holds the configured number of sessions, the oldest unexpired one is
/// evicted first; eviction and insert share one transaction.
pub async fn issue_tokens(
    db: &PgPool,
    keys: &JwtKeys,
    max_sessions: i64,
    user_id: Uuid,
    meta: SessionMeta,
) -> Result<TokensResponse, AppError> {
    let mut tx = db.begin().await?;
    if repo::count_by_user(&mut *tx, user_id).await? >= max_sessions {
        debug!(user_id = %user_id, "session cap reached, evicting oldest");
        repo::remove_oldest_active(&mut *tx, user_id).await?;
    }
    let session = repo::create(
        &mut *tx,
        NewRefreshSession {
            id: Uuid::new_v4(),
            user_id,
            device: meta.device,
            fingerprint: meta.fingerprint,
            ip: meta.ip,
            expires_at: OffsetDateTime::now_utc() + keys.refresh_ttl,
        },
    )
    .await?;
    tx.commit().await?;

    let access = keys.sign_access(user_id)?;
    let refresh = keys.sign_refresh(session.id)?;
    info!(user_id = %user_id, session_id = %session.id, "tokens issued");
    Ok(TokensResponse {
        access: access.into(),
        refresh: refresh.into(),
    })
}

/// Rotates a refresh session: the old session is checked (expiry,
/// fingerprint), deleted, and a fresh pair is issued. Refresh tokens are
/// single-use; a concurrent refresher losing the delete race observes
/// `RefreshSessionNotFound`.
pub async fn refresh_tokens(
    db: &PgPool,
    keys: &JwtKeys,
    max_sessions: i64,
    refresh_token: &str,
    meta: SessionMeta,
) -> Result<TokensResponse, AppError> {
    let session_id = keys.refresh_session_id(refresh_token)?;
    let old = repo::get_by_id(db, session_id).await?;

    if OffsetDateTime::now_utc() > old.expires_at {
        return Err(AppError::SessionExpired);
    }
    if old.fingerprint != meta.fingerprint {
        return Err(AppError::InvalidRefreshSession);
    }

    repo::remove_by_id(db, old.id).await?;
    issue_tokens(db, keys, max_sessions, old.user_id, meta).await
}

/// Deletes the session named by the token. Idempotent: logging out an
/// already-rotated session succeeds.
pub async fn logout(db: &PgPool, keys: &JwtKeys, refresh_token: &str) -> Result<(), AppError> {
    let session_id = keys.refresh_session_id(refresh_token)?;
    let removed = repo::remove_by_id(db, session_id).await?;
    debug!(session_id = %session_id, removed, "logout");
    Ok(())
}

pub async fn logout_all(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let removed = repo::remove_by_user(db, user_id).await?;
    info!(user_id = %user_id, removed, "all sessions removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_meta_reads_user_agent_and_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let fp = Uuid::new_v4();
        let meta = session_meta(&headers, fp);
        assert_eq!(meta.device, "curl/8.0");
        assert_eq!(meta.ip, "203.0.113.9");
        assert_eq!(meta.fingerprint, fp);
    }

    #[test]
    fn session_meta_defaults() {
        let meta = session_meta(&HeaderMap::new(), Uuid::new_v4());
        assert_eq!(meta.device, "");
        assert_eq!(meta.ip, "127.0.0.1");
    }
}
