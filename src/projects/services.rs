use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::projects::repo::{self, Project, ProjectUpdate, ProjectWithUsers};
use crate::workspaces::services::ensure_members;

/// Get, with the workspace-ownership check: a project from another
/// workspace is reported as not found.
pub async fn get_project(
    db: &PgPool,
    project_id: i64,
    workspace_id: i64,
) -> Result<ProjectWithUsers, AppError> {
    let project = repo::get_by_id(db, project_id).await?;
    if project.workspace_id != workspace_id {
        return Err(AppError::ProjectNotFound);
    }
    Ok(project)
}

pub async fn create_project(
    db: &PgPool,
    workspace_id: i64,
    name: &str,
    author_id: Uuid,
) -> Result<Project, AppError> {
    let project = repo::create(db, workspace_id, name, author_id).await?;
    info!(project_id = project.id, workspace_id, "project created");
    Ok(project)
}

/// Edits after verifying the project belongs to the claimed workspace and
/// that any referenced author/manager is an active workspace member.
pub async fn edit_project(
    db: &PgPool,
    project_id: i64,
    workspace_id: i64,
    update: ProjectUpdate,
) -> Result<Project, AppError> {
    if !repo::exists(db, project_id, workspace_id).await? {
        return Err(AppError::ProjectNotFound);
    }
    ensure_members(db, &[update.author_id, update.manager_id], workspace_id).await?;
    repo::update(db, project_id, update).await
}

pub async fn remove_project(
    db: &PgPool,
    project_id: i64,
    workspace_id: i64,
) -> Result<(), AppError> {
    if !repo::exists(db, project_id, workspace_id).await? {
        return Err(AppError::ProjectNotFound);
    }
    repo::remove(db, project_id).await?;
    info!(project_id, workspace_id, "project removed");
    Ok(())
}
