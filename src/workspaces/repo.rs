use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// Access tier of a workspace member. Authorization is expressed as explicit
/// allow-lists per operation, not role inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "workspace_role", rename_all = "lowercase")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl sqlx::postgres::PgHasArrayType for WorkspaceRole {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_workspace_role")
    }
}

pub const OWNER_ONLY: &[WorkspaceRole] = &[WorkspaceRole::Owner];
pub const ADMIN_AND_ABOVE: &[WorkspaceRole] = &[WorkspaceRole::Owner, WorkspaceRole::Admin];
pub const EDITOR_AND_ABOVE: &[WorkspaceRole] = &[
    WorkspaceRole::Owner,
    WorkspaceRole::Admin,
    WorkspaceRole::Editor,
];

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkspaceMember {
    pub user_id: Uuid,
    pub workspace_id: i64,
    pub role: WorkspaceRole,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Member row joined with its user record.
#[derive(Debug, Clone, FromRow)]
pub struct MemberWithUser {
    pub user_id: Uuid,
    pub workspace_id: i64,
    pub role: WorkspaceRole,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub async fn get_by_id(db: &PgPool, id: i64) -> Result<Workspace, AppError> {
    sqlx::query_as::<_, Workspace>(
        "SELECT id, name, created_at, updated_at FROM workspaces WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::WorkspaceNotFound)
}

/// Workspaces where the user holds an active membership.
pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Workspace>, AppError> {
    let workspaces = sqlx::query_as::<_, Workspace>(
        "SELECT w.id, w.name, w.created_at, w.updated_at FROM workspaces w \
         WHERE w.id IN ( \
           SELECT workspace_id FROM workspace_members WHERE user_id = $1 AND active) \
         ORDER BY w.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(workspaces)
}

pub async fn create(ex: impl PgExecutor<'_>, name: &str) -> Result<Workspace, AppError> {
    let workspace = sqlx::query_as::<_, Workspace>(
        "INSERT INTO workspaces (name) VALUES ($1) RETURNING id, name, created_at, updated_at",
    )
    .bind(name)
    .fetch_one(ex)
    .await?;
    Ok(workspace)
}

pub async fn update(db: &PgPool, id: i64, name: &str) -> Result<Workspace, AppError> {
    sqlx::query_as::<_, Workspace>(
        "UPDATE workspaces SET name = $2, updated_at = now() WHERE id = $1 \
         RETURNING id, name, created_at, updated_at",
    )
    .bind(id)
    .bind(name)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::WorkspaceNotFound)
}

/// Members, projects and tasks go with the workspace (FK cascade).
pub async fn remove(db: &PgPool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM workspaces WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn is_member(
    db: &PgPool,
    user_id: Uuid,
    workspace_id: i64,
    roles: Option<&[WorkspaceRole]>,
) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS( \
           SELECT 1 FROM workspace_members \
           WHERE user_id = $1 AND workspace_id = $2 AND active \
             AND ($3::workspace_role[] IS NULL OR role = ANY($3)))",
    )
    .bind(user_id)
    .bind(workspace_id)
    .bind(roles.map(<[WorkspaceRole]>::to_vec))
    .fetch_one(db)
    .await?;
    Ok(exists)
}

const MEMBER_USER_COLUMNS: &str =
    "m.user_id, m.workspace_id, m.role, m.active, m.created_at, m.updated_at, \
     u.username, u.first_name, u.last_name";

pub async fn get_member(
    db: &PgPool,
    user_id: Uuid,
    workspace_id: i64,
) -> Result<MemberWithUser, AppError> {
    sqlx::query_as::<_, MemberWithUser>(&format!(
        "SELECT {MEMBER_USER_COLUMNS} FROM workspace_members m \
         JOIN users u ON u.id = m.user_id \
         WHERE m.user_id = $1 AND m.workspace_id = $2"
    ))
    .bind(user_id)
    .bind(workspace_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::WorkspaceMemberNotFound)
}

pub async fn list_members(db: &PgPool, workspace_id: i64) -> Result<Vec<MemberWithUser>, AppError> {
    let members = sqlx::query_as::<_, MemberWithUser>(&format!(
        "SELECT {MEMBER_USER_COLUMNS} FROM workspace_members m \
         JOIN users u ON u.id = m.user_id \
         WHERE m.workspace_id = $1 ORDER BY m.created_at DESC"
    ))
    .bind(workspace_id)
    .fetch_all(db)
    .await?;
    Ok(members)
}

pub async fn create_member(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    workspace_id: i64,
    role: WorkspaceRole,
    active: bool,
) -> Result<WorkspaceMember, AppError> {
    let member = sqlx::query_as::<_, WorkspaceMember>(
        "INSERT INTO workspace_members (user_id, workspace_id, role, active) \
         VALUES ($1, $2, $3, $4) \
         RETURNING user_id, workspace_id, role, active, created_at, updated_at",
    )
    .bind(user_id)
    .bind(workspace_id)
    .bind(role)
    .bind(active)
    .fetch_one(ex)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::WorkspaceMemberExists
        }
        _ => AppError::from(e),
    })?;
    Ok(member)
}

/// OWNER rows are immutable through this path.
pub async fn update_member(
    db: &PgPool,
    user_id: Uuid,
    workspace_id: i64,
    role: WorkspaceRole,
    active: bool,
) -> Result<WorkspaceMember, AppError> {
    let current: WorkspaceRole = sqlx::query_scalar(
        "SELECT role FROM workspace_members WHERE user_id = $1 AND workspace_id = $2",
    )
    .bind(user_id)
    .bind(workspace_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::WorkspaceMemberNotFound)?;

    if current == WorkspaceRole::Owner {
        return Err(AppError::WorkspaceMemberCannotBeUpdated);
    }

    let member = sqlx::query_as::<_, WorkspaceMember>(
        "UPDATE workspace_members SET role = $3, active = $4, updated_at = now() \
         WHERE user_id = $1 AND workspace_id = $2 \
         RETURNING user_id, workspace_id, role, active, created_at, updated_at",
    )
    .bind(user_id)
    .bind(workspace_id)
    .bind(role)
    .bind(active)
    .fetch_one(db)
    .await?;
    Ok(member)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&WorkspaceRole::Owner).unwrap(),
            "\"owner\""
        );
        let role: WorkspaceRole = serde_json::from_str("\"editor\"").unwrap();
        assert_eq!(role, WorkspaceRole::Editor);
    }

    #[test]
    fn allow_lists_are_strict_supersets() {
        assert!(ADMIN_AND_ABOVE.contains(&WorkspaceRole::Owner));
        assert!(EDITOR_AND_ABOVE.contains(&WorkspaceRole::Admin));
        assert!(!ADMIN_AND_ABOVE.contains(&WorkspaceRole::Editor));
        assert!(!EDITOR_AND_ABOVE.contains(&WorkspaceRole::Viewer));
        assert_eq!(OWNER_ONLY, &[WorkspaceRole::Owner]);
    }
}
