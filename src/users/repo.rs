use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const USER_COLUMNS: &str =
    "id, username, first_name, last_name, email, phone, hashed_password, created_at, updated_at";

pub async fn get_by_id(db: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, first_name, last_name, email, phone, hashed_password, \
         created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::UserNotFound)
}

pub async fn get_by_username(db: &PgPool, username: &str) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, first_name, last_name, email, phone, hashed_password, \
         created_at, updated_at FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::UsernameNotFound)
}

pub async fn search_by_username(
    db: &PgPool,
    username: &str,
    offset: i64,
    limit: i64,
) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username ILIKE $1 \
         ORDER BY username LIMIT $2 OFFSET $3"
    ))
    .bind(format!("%{username}%"))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hashed_password: String,
}

pub async fn create(db: &PgPool, new: NewUser) -> Result<User, AppError> {
    let created = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, username, first_name, last_name, email, phone, hashed_password) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
    ))
    .bind(new.id)
    .bind(&new.username)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.hashed_password)
    .fetch_one(db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::UserExists,
        _ => AppError::from(e),
    })?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            first_name: None,
            last_name: None,
            email: Some("alice@example.com".into()),
            phone: None,
            hashed_password: "$argon2id$secret".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("hashed_password"));
        assert!(json.contains("alice"));
    }
}
