//! HTTP routes for user endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{current, login, logout, register, update, UserHandlers};

pub fn user_routes(handlers: UserHandlers) -> Router {
    Router::new()
        .route("/users", post(register).delete(logout))
        .route("/users/_login", post(login))
        .route("/users/_current", get(current).patch(update))
        .with_state(handlers)
}
