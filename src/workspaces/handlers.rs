use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;
use crate::workspaces::dto::{
    AddMemberRequest, EditMemberRequest, MemberResponse, WorkspaceRequest,
};
use crate::workspaces::repo::{self, Workspace, WorkspaceMember, ADMIN_AND_ABOVE, OWNER_ONLY};
use crate::workspaces::services::{self, ensure_member};

#[instrument(skip(state, user))]
pub async fn get_workspaces(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Workspace>>, AppError> {
    Ok(Json(repo::list_by_user(&state.db, user.id).await?))
}

#[instrument(skip(state, user, payload))]
pub async fn create_workspace(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<WorkspaceRequest>,
) -> Result<Json<Workspace>, AppError> {
    payload.validate()?;
    let workspace = services::create_workspace(&state.db, user.id, &payload.name).await?;
    Ok(Json(workspace))
}

#[instrument(skip(state, user))]
pub async fn get_workspace(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(workspace_id): Path<i64>,
) -> Result<Json<Workspace>, AppError> {
    ensure_member(&state.db, user.id, workspace_id, None).await?;
    Ok(Json(repo::get_by_id(&state.db, workspace_id).await?))
}

#[instrument(skip(state, user, payload))]
pub async fn edit_workspace(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(workspace_id): Path<i64>,
    Json(payload): Json<WorkspaceRequest>,
) -> Result<Json<Workspace>, AppError> {
    ensure_member(&state.db, user.id, workspace_id, Some(OWNER_ONLY)).await?;
    payload.validate()?;
    Ok(Json(repo::update(&state.db, workspace_id, &payload.name).await?))
}

#[instrument(skip(state, user))]
pub async fn remove_workspace(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(workspace_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    ensure_member(&state.db, user.id, workspace_id, Some(OWNER_ONLY)).await?;
    repo::remove(&state.db, workspace_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user))]
pub async fn get_members(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(workspace_id): Path<i64>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    ensure_member(&state.db, user.id, workspace_id, None).await?;
    let members = repo::list_members(&state.db, workspace_id).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

#[instrument(skip(state, user))]
pub async fn get_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((workspace_id, user_id)): Path<(i64, Uuid)>,
) -> Result<Json<MemberResponse>, AppError> {
    ensure_member(&state.db, user.id, workspace_id, None).await?;
    let member = services::get_member_with_user(&state.db, workspace_id, user_id).await?;
    Ok(Json(member.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn add_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(workspace_id): Path<i64>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<Json<WorkspaceMember>, AppError> {
    ensure_member(&state.db, user.id, workspace_id, Some(ADMIN_AND_ABOVE)).await?;
    let member =
        services::add_member(&state.db, workspace_id, payload.user_id, payload.role.into())
            .await?;
    Ok(Json(member))
}

#[instrument(skip(state, user, payload))]
pub async fn edit_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(workspace_id): Path<i64>,
    Json(payload): Json<EditMemberRequest>,
) -> Result<Json<WorkspaceMember>, AppError> {
    ensure_member(&state.db, user.id, workspace_id, Some(ADMIN_AND_ABOVE)).await?;
    let member = services::edit_member(
        &state.db,
        workspace_id,
        payload.user_id,
        payload.role.into(),
        payload.active,
    )
    .await?;
    Ok(Json(member))
}
