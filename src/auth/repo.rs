use sqlx::{FromRow, PgExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// A live refresh session. One row per device/login; the refresh token's
/// subject points at the row id.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device: String,
    pub fingerprint: Uuid,
    pub ip: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub struct NewRefreshSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device: String,
    pub fingerprint: Uuid,
    pub ip: String,
    pub expires_at: OffsetDateTime,
}

pub async fn get_by_id(
    ex: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<RefreshSession, AppError> {
    sqlx::query_as::<_, RefreshSession>(
        "SELECT id, user_id, device, fingerprint, ip, expires_at, created_at, updated_at \
         FROM refresh_sessions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?
    .ok_or(AppError::RefreshSessionNotFound)
}

pub async fn create(
    ex: impl PgExecutor<'_>,
    new: NewRefreshSession,
) -> Result<RefreshSession, AppError> {
    let session = sqlx::query_as::<_, RefreshSession>(
        "INSERT INTO refresh_sessions (id, user_id, device, fingerprint, ip, expires_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, user_id, device, fingerprint, ip, expires_at, created_at, updated_at",
    )
    .bind(new.id)
    .bind(new.user_id)
    .bind(&new.device)
    .bind(new.fingerprint)
    .bind(&new.ip)
    .bind(new.expires_at)
    .fetch_one(ex)
    .await?;
    Ok(session)
}

/// Idempotent: removing an already-removed session is not an error. Returns
/// the number of rows deleted so callers racing on rotation can tell whether
/// they won.
pub async fn remove_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM refresh_sessions WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected())
}

pub async fn remove_by_user(ex: impl PgExecutor<'_>, user_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected())
}

/// Evicts the user's oldest unexpired session; used when the per-user
/// session cap is hit.
pub async fn remove_oldest_active(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query(
        "DELETE FROM refresh_sessions WHERE id IN ( \
           SELECT id FROM refresh_sessions \
           WHERE user_id = $1 AND expires_at > now() \
           ORDER BY created_at LIMIT 1)",
    )
    .bind(user_id)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn count_by_user(ex: impl PgExecutor<'_>, user_id: Uuid) -> Result<i64, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT count(*) FROM refresh_sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(ex)
            .await?;
    Ok(count)
}
