use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

/// Which structural check a 200 response failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("invalid JSON from upstream")]
    InvalidJson,

    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("missing 'items' list")]
    MissingItems,

    #[error("missing 'places' object")]
    MissingPlaces,

    #[error("missing reservation ID")]
    MissingReservationId,
}

/// Every way a proxied call can fail, as seen by the inbound caller.
///
/// `Display` carries operator detail for logs; `IntoResponse` only emits the
/// public message, so upstream internals and credential problems never leak.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Caller input rejected before any upstream call.
    #[error("{0}")]
    LocalValidation(String),

    #[error("legacy API unreachable: {0}")]
    Network(String),

    /// The token fetch itself failed.
    #[error("legacy API authentication failed: {0}")]
    UpstreamAuth(String),

    #[error("Upstream returned malformed response: {0}")]
    Malformed(Malformed),

    /// Upstream 422; the body is handed back unchanged.
    #[error("legacy API rejected the request as invalid")]
    UpstreamValidation(Value),

    #[error("legacy API unavailable (HTTP {status})")]
    UpstreamUnavailable { status: u16 },

    /// Other upstream 4xx. `body` is set when the endpoint passes client errors through.
    #[error("legacy API client error (HTTP {status})")]
    UpstreamClient { status: u16, body: Option<Value> },

    #[error("payment link generation failed: {0}")]
    PaymentLink(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::LocalValidation(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ProxyError::UpstreamClient { status, body: Some(_) } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            ProxyError::UpstreamClient { body: None, .. } => StatusCode::BAD_REQUEST,
            ProxyError::Network(_)
            | ProxyError::UpstreamAuth(_)
            | ProxyError::Malformed(_)
            | ProxyError::UpstreamUnavailable { .. }
            | ProxyError::PaymentLink(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// The message placed in the external `{"error": ...}` body.
    pub fn public_message(&self) -> String {
        match self {
            ProxyError::LocalValidation(message) => message.clone(),
            ProxyError::Network(_) => "Upstream service unreachable".to_string(),
            ProxyError::UpstreamAuth(_) => "Upstream authentication failed".to_string(),
            ProxyError::Malformed(check) => format!("Upstream returned malformed response: {}", check),
            ProxyError::UpstreamUnavailable { .. } => "Upstream service unavailable".to_string(),
            ProxyError::UpstreamValidation(_) | ProxyError::UpstreamClient { .. } => {
                "Upstream client error".to_string()
            }
            ProxyError::PaymentLink(_) => "Failed to generate payment link".to_string(),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::LocalValidation(_) => "local_validation",
            ProxyError::Network(_) => "network",
            ProxyError::UpstreamAuth(_) => "upstream_auth",
            ProxyError::Malformed(_) => "malformed",
            ProxyError::UpstreamValidation(_) => "upstream_validation",
            ProxyError::UpstreamUnavailable { .. } => "upstream_unavailable",
            ProxyError::UpstreamClient { .. } => "upstream_client",
            ProxyError::PaymentLink(_) => "payment_link",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ProxyError::UpstreamValidation(body) | ProxyError::UpstreamClient { body: Some(body), .. } => {
                (status, Json(body)).into_response()
            }
            other => (status, Json(json!({ "error": other.public_message() }))).into_response(),
        }
    }
}
