//! Defines the HTTP routes for authentication-related API endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{login, me, register};
use crate::app::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}
