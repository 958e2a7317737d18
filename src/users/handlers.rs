use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::dto::{
    validate_search_username, CreateUserRequest, SearchUsersQuery, UserResponse,
};
use crate::users::repo::{self, NewUser};

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;
    let user = repo::create(
        &state.db,
        NewUser {
            id: Uuid::new_v4(),
            username: payload.username,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone: payload.phone,
            hashed_password,
        },
    )
    .await?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok(Json(user.into()))
}

#[instrument(skip_all)]
pub async fn get_current_user(
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(user.into()))
}

#[instrument(skip(state, _user))]
pub async fn search_users(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<SearchUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    validate_search_username(&query.username)?;
    let users =
        repo::search_by_username(&state.db, &query.username, query.offset, query.limit).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
