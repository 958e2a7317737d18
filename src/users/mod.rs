use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/create", post(handlers::create_user))
        .route("/users/current", get(handlers::get_current_user))
        .route("/users/search", get(handlers::search_users))
}
