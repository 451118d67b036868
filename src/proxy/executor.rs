//! Generic request execution against the legacy API.
//!
//! Every endpoint goes through the same state machine:
//!
//! ```text
//! ACQUIRING_TOKEN ──▶ CALLING ──401──▶ RETRYING ──▶ VALIDATING ──▶ DONE | FAILED
//!  (auth only)           │                              ▲
//!                        └──────────────────────────────┘
//! ```
//!
//! The retry happens at most once per inbound request. A second 401 is mapped
//! like any other client error.

use std::sync::Arc;

use serde_json::Value;

use super::error::{Malformed, ProxyError};
use super::mapper::{self, Validator};
use crate::observability::metrics;
use crate::token::{Token, TokenStore};
use crate::upstream::{LegacyApi, UpstreamError, UpstreamResponse};

/// The proxied legacy API capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Autocomplete,
    Quote,
    ReservationCreate,
    Booking,
}

impl Endpoint {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Autocomplete => "autocomplete",
            Endpoint::Quote => "quote",
            Endpoint::ReservationCreate => "create",
            Endpoint::Booking => "my_booking",
        }
    }

    /// Autocomplete uses the shared API key; everything else needs a bearer token.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Endpoint::Autocomplete)
    }

    pub fn client_error_policy(&self) -> ClientErrorPolicy {
        match self {
            Endpoint::Autocomplete | Endpoint::Booking => ClientErrorPolicy::PassThrough,
            Endpoint::Quote | Endpoint::ReservationCreate => ClientErrorPolicy::Generic,
        }
    }

    pub fn validator(&self) -> Option<Validator> {
        match self {
            Endpoint::Quote => Some(mapper::validate_quote),
            Endpoint::ReservationCreate => Some(mapper::validate_reservation_create),
            Endpoint::Autocomplete | Endpoint::Booking => None,
        }
    }
}

/// What to do with an upstream 4xx other than 401 and 422.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorPolicy {
    /// Return the upstream body with the upstream status.
    PassThrough,
    /// Replace with a generic 400.
    Generic,
}

/// One proxied call: which capability, with what payload, and how to judge the answer.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub endpoint: Endpoint,
    pub payload: Value,
    pub requires_auth: bool,
    pub validator: Option<Validator>,
    pub client_errors: ClientErrorPolicy,
}

impl ProxyRequest {
    /// A request using the endpoint's standard auth, validator and 4xx policy.
    pub fn new(endpoint: Endpoint, payload: Value) -> Self {
        Self {
            endpoint,
            payload,
            requires_auth: endpoint.requires_auth(),
            validator: endpoint.validator(),
            client_errors: endpoint.client_error_policy(),
        }
    }
}

/// A successful execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    /// Upstream body, passed through unchanged.
    pub body: Value,
    /// Token the successful call was made with. `None` for unauthenticated calls.
    pub token: Option<String>,
}

/// Why a token fetch happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// No valid token in the store.
    Missing,
    /// Upstream answered 401 with the stored token.
    Rejected,
    /// Operator request through the admin API.
    Manual,
}

impl RefreshReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshReason::Missing => "missing",
            RefreshReason::Rejected => "rejected",
            RefreshReason::Manual => "manual",
        }
    }
}

/// Runs proxy requests with token acquisition and a single 401 retry.
#[derive(Clone)]
pub struct ProxyExecutor {
    api: Arc<dyn LegacyApi>,
    tokens: TokenStore,
}

impl ProxyExecutor {
    pub fn new(api: Arc<dyn LegacyApi>, tokens: TokenStore) -> Self {
        Self { api, tokens }
    }

    pub fn api(&self) -> &Arc<dyn LegacyApi> {
        &self.api
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Execute one request through the full state machine.
    pub async fn execute(&self, request: &ProxyRequest) -> Result<Executed, ProxyError> {
        let endpoint = request.endpoint.name();

        let mut token = if request.requires_auth {
            Some(self.acquire_token().await?)
        } else {
            None
        };

        let mut response = self.call(request, token.as_deref()).await?;

        if request.requires_auth && response.status == 401 {
            tracing::info!(endpoint, "Legacy API rejected the token, refreshing and retrying once");
            let fresh = self.refresh_token(RefreshReason::Rejected).await?;
            token = Some(fresh.value);
            response = self.call(request, token.as_deref()).await?;
        }

        let body = interpret(request, &response)?;
        Ok(Executed { body, token })
    }

    /// A valid bearer value, fetching one only when the store has none.
    pub async fn acquire_token(&self) -> Result<String, ProxyError> {
        if let Some(token) = self.tokens.get_valid() {
            return Ok(token.value);
        }
        self.refresh_token(RefreshReason::Missing)
            .await
            .map(|token| token.value)
    }

    /// Fetch a new token unconditionally and store it.
    pub async fn refresh_token(&self, reason: RefreshReason) -> Result<Token, ProxyError> {
        match self.api.fetch_token().await {
            Ok(fetched) => {
                metrics::record_token_refresh(reason.as_str(), true);
                let token = self.tokens.replace(fetched.value, fetched.expires_at);
                tracing::info!(
                    reason = reason.as_str(),
                    expires_at = ?token.expires_at,
                    "Legacy API token refreshed"
                );
                Ok(token)
            }
            Err(e) => {
                metrics::record_token_refresh(reason.as_str(), false);
                tracing::error!(reason = reason.as_str(), error = %e, "Legacy API token fetch failed");
                Err(ProxyError::UpstreamAuth(e.to_string()))
            }
        }
    }

    async fn call(&self, request: &ProxyRequest, token: Option<&str>) -> Result<UpstreamResponse, ProxyError> {
        let endpoint = request.endpoint.name();
        let token = token.unwrap_or_default();
        let payload = request.payload.clone();

        let result = match request.endpoint {
            Endpoint::Autocomplete => {
                let keyword = payload.get("keyword").and_then(Value::as_str).unwrap_or_default();
                self.api.fetch_autocomplete(keyword).await
            }
            Endpoint::Quote => self.api.fetch_quote(token, payload).await,
            Endpoint::ReservationCreate => self.api.fetch_reservation_create(token, payload).await,
            Endpoint::Booking => self.api.fetch_booking(token, payload).await,
        };

        match result {
            Ok(response) => {
                metrics::record_upstream_call(endpoint, metrics::status_class(response.status));
                Ok(response)
            }
            Err(e) => {
                metrics::record_upstream_call(endpoint, "network");
                tracing::warn!(endpoint, error = %e, "Legacy API call failed");
                Err(match e {
                    UpstreamError::Network(detail) => ProxyError::Network(detail),
                    other => ProxyError::Network(other.to_string()),
                })
            }
        }
    }
}

/// Parse, validate and map a final upstream response.
fn interpret(request: &ProxyRequest, response: &UpstreamResponse) -> Result<Value, ProxyError> {
    let endpoint = request.endpoint.name();

    let body = response.json().map_err(|e| {
        tracing::warn!(endpoint, status = response.status, error = %e, "Legacy API returned invalid JSON");
        ProxyError::Malformed(Malformed::InvalidJson)
    })?;

    if response.status == 200 {
        if let Some(validate) = request.validator {
            validate(&body).map_err(|check| {
                tracing::warn!(endpoint, check = %check, "Legacy API response failed validation");
                ProxyError::Malformed(check)
            })?;
        }
    }

    map_status(response.status, body, request.client_errors)
}

/// Map an upstream status and parsed body onto the external contract.
pub fn map_status(status: u16, body: Value, policy: ClientErrorPolicy) -> Result<Value, ProxyError> {
    match status {
        422 => Err(ProxyError::UpstreamValidation(body)),
        500.. => Err(ProxyError::UpstreamUnavailable { status }),
        400..=499 => Err(ProxyError::UpstreamClient {
            status,
            body: match policy {
                ClientErrorPolicy::PassThrough => Some(body),
                ClientErrorPolicy::Generic => None,
            },
        }),
        _ => Ok(body),
    }
}
