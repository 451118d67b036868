//! Operator API, served on its own listener behind a bearer key.
//!
//! - `GET /admin/status`
//! - `GET /admin/token` (metadata only)
//! - `POST /admin/token/refresh`

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/token", get(get_token))
        .route("/admin/token/refresh", post(refresh_token))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
