use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{info, instrument};

use crate::auth::dto::{LoginRequest, RefreshRequest, TokensResponse};
use crate::auth::extractors::{CurrentUser, RefreshToken};
use crate::auth::jwt::JwtKeys;
use crate::auth::services;
use crate::error::AppError;
use crate::state::AppState;

#[instrument(skip(state, headers, payload))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokensResponse>, AppError> {
    let user = services::authenticate(&state.db, &payload.username, &payload.password).await?;
    let keys = JwtKeys::from_ref(&state);
    let tokens = services::issue_tokens(
        &state.db,
        &keys,
        state.config.auth.max_refresh_sessions,
        user.id,
        services::session_meta(&headers, payload.fingerprint),
    )
    .await?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(tokens))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    RefreshToken(token): RefreshToken,
) -> Result<StatusCode, AppError> {
    let keys = JwtKeys::from_ref(&state);
    services::logout(&state.db, &keys, &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn logout_all(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, AppError> {
    services::logout_all(&state.db, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, headers, token, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    RefreshToken(token): RefreshToken,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokensResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let tokens = services::refresh_tokens(
        &state.db,
        &keys,
        state.config.auth.max_refresh_sessions,
        &token,
        services::session_meta(&headers, payload.fingerprint),
    )
    .await?;
    Ok(Json(tokens))
}
