use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::error::AppError;
use crate::projects::dto::{CreateProjectRequest, EditProjectRequest, ProjectResponse};
use crate::projects::repo::ProjectUpdate;
use crate::projects::services;
use crate::state::AppState;
use crate::workspaces::repo::ADMIN_AND_ABOVE;
use crate::workspaces::services::ensure_member;

/// Workspace scope for project routes, supplied as `?workspace_id=`.
#[derive(Debug, Deserialize)]
pub struct WorkspaceScope {
    pub workspace_id: i64,
}

#[instrument(skip(state, user))]
pub async fn get_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(scope): Query<WorkspaceScope>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, None).await?;
    let projects = crate::projects::repo::list_by_workspace(&state.db, scope.workspace_id).await?;
    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

#[instrument(skip(state, user))]
pub async fn get_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<i64>,
    Query(scope): Query<WorkspaceScope>,
) -> Result<Json<ProjectResponse>, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, None).await?;
    let project = services::get_project(&state.db, project_id, scope.workspace_id).await?;
    Ok(Json(project.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(scope): Query<WorkspaceScope>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, Some(ADMIN_AND_ABOVE)).await?;
    let project =
        services::create_project(&state.db, scope.workspace_id, &payload.name, user.id).await?;
    Ok(Json(project.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn edit_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<i64>,
    Query(scope): Query<WorkspaceScope>,
    Json(payload): Json<EditProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, Some(ADMIN_AND_ABOVE)).await?;
    let project = services::edit_project(
        &state.db,
        project_id,
        scope.workspace_id,
        ProjectUpdate {
            name: payload.name,
            description: payload.description,
            author_id: payload.author_id,
            manager_id: payload.manager_id,
        },
    )
    .await?;
    Ok(Json(project.into()))
}

#[instrument(skip(state, user))]
pub async fn remove_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<i64>,
    Query(scope): Query<WorkspaceScope>,
) -> Result<StatusCode, AppError> {
    ensure_member(&state.db, user.id, scope.workspace_id, Some(ADMIN_AND_ABOVE)).await?;
    services::remove_project(&state.db, project_id, scope.workspace_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
