use axum::{routing::get, Router};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(handlers::get_tasks).post(handlers::create_task))
        .route(
            "/tasks/:task_id",
            get(handlers::get_task)
                .put(handlers::edit_task)
                .delete(handlers::remove_task),
        )
}
