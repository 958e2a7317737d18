use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::error::AppError;
use crate::projects::handlers::WorkspaceScope;
use crate::state::AppState;
use crate::tasks::dto::{CreateTaskRequest, EditTaskRequest, TaskResponse};
use crate::tasks::repo::{self, NewTask, TaskUpdate};
use crate::tasks::services;
use crate::workspaces::repo::{ADMIN_AND_ABOVE, EDITOR_AND_ABOVE};
use crate::workspaces::services::ensure_member;

#[instrument(skip(state, user))]
pub async fn get_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(scope): Query<WorkspaceScope>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, None).await?;
    let tasks = repo::list_by_workspace(&state.db, scope.workspace_id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

#[instrument(skip(state, user))]
pub async fn get_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<i64>,
    Query(scope): Query<WorkspaceScope>,
) -> Result<Json<TaskResponse>, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, None).await?;
    let task = services::get_task(&state.db, task_id, scope.workspace_id).await?;
    Ok(Json(task.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(scope): Query<WorkspaceScope>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, Some(EDITOR_AND_ABOVE)).await?;
    let task = services::create_task(
        &state.db,
        NewTask {
            name: payload.name,
            status: payload.status,
            priority: payload.priority,
            workspace_id: scope.workspace_id,
            author_id: user.id,
        },
    )
    .await?;
    Ok(Json(task.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn edit_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<i64>,
    Query(scope): Query<WorkspaceScope>,
    Json(payload): Json<EditTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, Some(EDITOR_AND_ABOVE)).await?;
    let task = services::edit_task(
        &state.db,
        task_id,
        scope.workspace_id,
        TaskUpdate {
            name: payload.name,
            description: payload.description,
            status: payload.status,
            priority: payload.priority,
            deadline: payload.deadline,
            project_id: payload.project_id,
            author_id: payload.author_id,
            performer_id: payload.performer_id,
        },
    )
    .await?;
    Ok(Json(task.into()))
}

#[instrument(skip(state, user))]
pub async fn remove_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<i64>,
    Query(scope): Query<WorkspaceScope>,
) -> Result<StatusCode, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, Some(ADMIN_AND_ABOVE)).await?;
    services::remove_task(&state.db, task_id, scope.workspace_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
