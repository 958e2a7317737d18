use axum::{routing::get, Router};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(handlers::get_projects).post(handlers::create_project),
        )
        .route(
            "/projects/:project_id",
            get(handlers::get_project)
                .put(handlers::edit_project)
                .delete(handlers::remove_project),
        )
}
