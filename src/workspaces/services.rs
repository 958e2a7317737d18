use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::repo as users_repo;
use crate::workspaces::repo::{self, MemberWithUser, Workspace, WorkspaceMember, WorkspaceRole};

/// Workspace authorization gate. Passes when the user has an active
/// membership whose role is in `roles` (None = any active member). Failure
/// is reported as `WorkspaceNotFound` so non-members cannot distinguish
/// "no access" from "no such workspace".
pub async fn ensure_member(
    db: &PgPool,
    user_id: Uuid,
    workspace_id: i64,
    roles: Option<&[WorkspaceRole]>,
) -> Result<(), AppError> {
    if repo::is_member(db, user_id, workspace_id, roles).await? {
        Ok(())
    } else {
        Err(AppError::WorkspaceNotFound)
    }
}

/// Checks that every referenced user is an active member of the workspace.
/// Used for author/manager/performer references on projects and tasks.
pub async fn ensure_members(
    db: &PgPool,
    user_ids: &[Option<Uuid>],
    workspace_id: i64,
) -> Result<(), AppError> {
    for user_id in user_ids.iter().flatten() {
        if !repo::is_member(db, *user_id, workspace_id, None).await? {
            return Err(AppError::WorkspaceMemberNotFound);
        }
    }
    Ok(())
}

/// Creates the workspace and its OWNER membership in one transaction.
pub async fn create_workspace(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
) -> Result<Workspace, AppError> {
    let mut tx = db.begin().await?;
    let workspace = repo::create(&mut *tx, name).await?;
    repo::create_member(&mut *tx, user_id, workspace.id, WorkspaceRole::Owner, true).await?;
    tx.commit().await?;
    info!(workspace_id = workspace.id, owner = %user_id, "workspace created");
    Ok(workspace)
}

/// Adds a member after confirming the target user exists.
pub async fn add_member(
    db: &PgPool,
    workspace_id: i64,
    user_id: Uuid,
    role: WorkspaceRole,
) -> Result<WorkspaceMember, AppError> {
    users_repo::get_by_id(db, user_id).await?;
    let member = repo::create_member(db, user_id, workspace_id, role, true).await?;
    info!(workspace_id, user_id = %user_id, role = ?role, "member added");
    Ok(member)
}

pub async fn edit_member(
    db: &PgPool,
    workspace_id: i64,
    user_id: Uuid,
    role: WorkspaceRole,
    active: bool,
) -> Result<WorkspaceMember, AppError> {
    repo::update_member(db, user_id, workspace_id, role, active).await
}

pub async fn get_member_with_user(
    db: &PgPool,
    workspace_id: i64,
    user_id: Uuid,
) -> Result<MemberWithUser, AppError> {
    repo::get_member(db, user_id, workspace_id).await
}
