use axum::{routing::get, Router};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/workspaces",
            get(handlers::get_workspaces).post(handlers::create_workspace),
        )
        .route(
            "/workspaces/:workspace_id",
            get(handlers::get_workspace)
                .put(handlers::edit_workspace)
                .delete(handlers::remove_workspace),
        )
        .route(
            "/workspaces/:workspace_id/members",
            get(handlers::get_members)
                .post(handlers::add_member)
                .put(handlers::edit_member),
        )
        .route(
            "/workspaces/:workspace_id/members/:user_id",
            get(handlers::get_member),
        )
}
