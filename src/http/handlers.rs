//! Handlers for the `/legacy/*` routes.

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::Instrument;

use crate::http::request::{parse_payload, request_id};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::{Endpoint, ProxyError};

pub async fn autocomplete(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    proxy(&state, Endpoint::Autocomplete, &headers, &body).await
}

pub async fn quote(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    proxy(&state, Endpoint::Quote, &headers, &body).await
}

pub async fn create(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    proxy(&state, Endpoint::ReservationCreate, &headers, &body).await
}

pub async fn my_booking(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    proxy(&state, Endpoint::Booking, &headers, &body).await
}

async fn proxy(state: &AppState, endpoint: Endpoint, headers: &HeaderMap, body: &[u8]) -> Response {
    let start = Instant::now();
    let span = tracing::info_span!(
        "legacy_request",
        request_id = %request_id(headers),
        endpoint = endpoint.name(),
    );

    async move {
        let deadline = Duration::from_secs(state.config.timeouts.request_secs);
        let result = match parse_payload(body) {
            Ok(payload) => tokio::time::timeout(deadline, state.gateway.handle(endpoint, payload))
                .await
                .unwrap_or_else(|_| {
                    Err(ProxyError::Network(format!(
                        "inbound deadline of {}s exceeded",
                        deadline.as_secs()
                    )))
                }),
            Err(e) => Err(e),
        };

        let response = match result {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => {
                let status = e.status_code();
                if status.is_server_error() {
                    tracing::warn!(kind = e.kind(), status = status.as_u16(), error = %e, "Proxy request failed");
                } else {
                    tracing::info!(kind = e.kind(), status = status.as_u16(), error = %e, "Proxy request rejected");
                }
                e.into_response()
            }
        };

        let status = response.status().as_u16();
        metrics::record_request(endpoint.name(), status, start);
        tracing::debug!(status, latency_ms = start.elapsed().as_millis() as u64, "Proxy request completed");
        response
    }
    .instrument(span)
    .await
}
