use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::repo::{self, User};

fn bearer_token(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::to_owned)
}

/// Authenticated user, resolved from the `Authorization: Bearer` access
/// token. Rejects with 401 on a missing/invalid token or an unknown user.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers, AUTHORIZATION.as_str())
            .ok_or(AppError::Unauthorized)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_access(&token)?;

        let user = repo::get_by_id(&state.db, claims.sub).await.map_err(|e| {
            if matches!(e, AppError::UserNotFound) {
                warn!(user_id = %claims.sub, "valid token for unknown user");
                AppError::Unauthorized
            } else {
                e
            }
        })?;
        Ok(CurrentUser(user))
    }
}

/// Raw refresh token pulled from the `Refresh: Bearer <token>` header.
pub struct RefreshToken(pub String);

#[async_trait]
impl FromRequestParts<AppState> for RefreshToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers, "Refresh")
            .map(RefreshToken)
            .ok_or(AppError::InvalidRefreshSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_parses_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("Refresh", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers, "Refresh").as_deref(), Some("abc.def"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("Refresh", HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers, "Refresh").is_none());
        assert!(bearer_token(&HeaderMap::new(), "Refresh").is_none());
    }
}
