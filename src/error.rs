use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application error taxonomy. Every variant maps to a fixed HTTP status and
/// a user-facing message; handlers and repos return these directly and the
/// `IntoResponse` impl turns them into the JSON error envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("The requested username was not found")]
    UsernameNotFound,
    #[error("The requested user was not found")]
    UserNotFound,
    #[error("The requested workspace was not found")]
    WorkspaceNotFound,
    #[error("The requested workspace member was not found")]
    WorkspaceMemberNotFound,
    #[error("The requested project was not found")]
    ProjectNotFound,
    #[error("The requested task was not found")]
    TaskNotFound,
    #[error("Session not found")]
    RefreshSessionNotFound,

    #[error("Session has expired")]
    SessionExpired,
    #[error("Invalid session")]
    InvalidRefreshSession,
    #[error("Incorrect username or password")]
    BadCredentials,
    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("User already exists")]
    UserExists,
    #[error("The user is already a member of the workspace")]
    WorkspaceMemberExists,
    #[error("The member cannot be updated")]
    WorkspaceMemberCannotBeUpdated,

    #[error("validation failed")]
    Validation(Vec<String>),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UsernameNotFound
            | Self::UserNotFound
            | Self::WorkspaceNotFound
            | Self::WorkspaceMemberNotFound
            | Self::ProjectNotFound
            | Self::TaskNotFound
            | Self::RefreshSessionNotFound => StatusCode::NOT_FOUND,
            Self::SessionExpired
            | Self::InvalidRefreshSession
            | Self::BadCredentials
            | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UserExists
            | Self::WorkspaceMemberExists
            | Self::WorkspaceMemberCannotBeUpdated => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable kind string used in the `error` field of the envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UsernameNotFound => "UsernameNotFound",
            Self::UserNotFound => "UserNotFound",
            Self::WorkspaceNotFound => "WorkspaceNotFound",
            Self::WorkspaceMemberNotFound => "WorkspaceMemberNotFound",
            Self::ProjectNotFound => "ProjectNotFound",
            Self::TaskNotFound => "TaskNotFound",
            Self::RefreshSessionNotFound => "RefreshSessionNotFound",
            Self::SessionExpired => "SessionExpired",
            Self::InvalidRefreshSession => "InvalidRefreshSession",
            Self::BadCredentials => "BadCredentials",
            Self::Unauthorized => "Unauthorized",
            Self::UserExists => "UserExists",
            Self::WorkspaceMemberExists => "WorkspaceMemberExists",
            Self::WorkspaceMemberCannotBeUpdated => "WorkspaceMemberCannotBeUpdated",
            Self::Validation(_) => "ValidationError",
            Self::Internal(_) => "Internal",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(anyhow::Error::new(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(e) = &self {
            error!(error = %e, "internal error");
            let body = json!({"error": "Internal", "detail": "internal server error"});
            return (status, Json(body)).into_response();
        }
        let detail = match &self {
            Self::Validation(errors) => json!(errors),
            other => json!(other.to_string()),
        };
        (status, Json(json!({"error": self.kind(), "detail": detail}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_family_maps_to_404() {
        for e in [
            AppError::UsernameNotFound,
            AppError::UserNotFound,
            AppError::WorkspaceNotFound,
            AppError::WorkspaceMemberNotFound,
            AppError::ProjectNotFound,
            AppError::TaskNotFound,
            AppError::RefreshSessionNotFound,
        ] {
            assert_eq!(e.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn unauthorized_family_maps_to_401() {
        for e in [
            AppError::SessionExpired,
            AppError::InvalidRefreshSession,
            AppError::BadCredentials,
            AppError::Unauthorized,
        ] {
            assert_eq!(e.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn conflict_family_maps_to_409() {
        for e in [
            AppError::UserExists,
            AppError::WorkspaceMemberExists,
            AppError::WorkspaceMemberCannotBeUpdated,
        ] {
            assert_eq!(e.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn validation_maps_to_422_with_detail_list() {
        let e = AppError::Validation(vec!["bad username".into()]);
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.kind(), "ValidationError");
    }

    #[test]
    fn credentials_errors_share_one_message() {
        // wrong password and unknown username must be indistinguishable
        assert_eq!(
            AppError::BadCredentials.to_string(),
            "Incorrect username or password"
        );
    }

    #[test]
    fn internal_hides_detail() {
        let e = AppError::Internal(anyhow::anyhow!("connection refused: secret-host"));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
