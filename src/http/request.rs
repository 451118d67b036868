//! Inbound request helpers.
//!
//! # Responsibilities
//! - Name the request ID header shared by the request-id layers and handlers
//! - Turn a raw body into the JSON object the gateway expects

use axum::http::HeaderMap;
use serde_json::{Map, Value};

use crate::proxy::ProxyError;

/// Header carrying the correlation ID, set on every request and echoed on the response.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request ID assigned by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Parse a body into a JSON object. An empty body counts as `{}`.
pub fn parse_payload(body: &[u8]) -> Result<Value, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(ProxyError::LocalValidation(
            "Request body must be a JSON object".to_string(),
        )),
        Err(_) => Err(ProxyError::LocalValidation("Invalid JSON body".to_string())),
    }
}
