use sqlx::PgPool;
use tracing::info;

use crate::error::AppError;
use crate::projects::repo as projects_repo;
use crate::tasks::repo::{self, NewTask, Task, TaskUpdate, TaskWithRelations};
use crate::workspaces::services::ensure_members;

pub async fn get_task(
    db: &PgPool,
    task_id: i64,
    workspace_id: i64,
) -> Result<TaskWithRelations, AppError> {
    let task = repo::get_by_id(db, task_id).await?;
    if task.workspace_id != workspace_id {
        return Err(AppError::TaskNotFound);
    }
    Ok(task)
}

pub async fn create_task(db: &PgPool, new: NewTask) -> Result<Task, AppError> {
    let task = repo::create(db, new).await?;
    info!(task_id = task.id, workspace_id = task.workspace_id, "task created");
    Ok(task)
}

/// Edits after verifying existence in the workspace, that a referenced
/// project belongs to the same workspace, and that referenced users are
/// active members.
pub async fn edit_task(
    db: &PgPool,
    task_id: i64,
    workspace_id: i64,
    update: TaskUpdate,
) -> Result<Task, AppError> {
    if !repo::exists(db, task_id, workspace_id).await? {
        return Err(AppError::TaskNotFound);
    }
    if let Some(project_id) = update.project_id {
        if !projects_repo::exists(db, project_id, workspace_id).await? {
            return Err(AppError::ProjectNotFound);
        }
    }
    ensure_members(db, &[update.author_id, update.performer_id], workspace_id).await?;
    repo::update(db, task_id, update).await
}

pub async fn remove_task(db: &PgPool, task_id: i64, workspace_id: i64) -> Result<(), AppError> {
    if !repo::exists(db, task_id, workspace_id).await? {
        return Err(AppError::TaskNotFound);
    }
    repo::remove(db, task_id).await?;
    info!(task_id, workspace_id, "task removed");
    Ok(())
}
