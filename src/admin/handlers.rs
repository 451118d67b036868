use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::server::AppState;
use crate::token::Token;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// Token metadata. The credential itself is never exposed.
#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub present: bool,
    pub valid: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl From<&Token> for TokenStatus {
    fn from(token: &Token) -> Self {
        Self {
            present: !token.value.is_empty(),
            valid: token.is_valid(),
            expires_at: token.expires_at,
            fetched_at: token.fetched_at,
        }
    }
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_token(State(state): State<AppState>) -> Json<TokenStatus> {
    Json(TokenStatus::from(&state.gateway.tokens().snapshot()))
}

pub async fn refresh_token(State(state): State<AppState>) -> impl IntoResponse {
    match state.gateway.force_refresh().await {
        Ok(token) => (StatusCode::OK, Json(TokenStatus::from(&token))).into_response(),
        Err(e) => e.into_response(),
    }
}
