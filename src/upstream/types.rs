//! Legacy API wire types and error definitions.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Tokens are treated as expired this long before the upstream says they are.
/// The legacy API documents that it may invalidate tokens up to a day early.
pub const TOKEN_EXPIRY_BUFFER_SECS: i64 = 86_400;

/// Lifetime assumed when the OAuth response omits `expires_in` (30 days).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 2_592_000;

/// Errors raised while talking to the legacy API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection failure or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx status from a call that requires success (token fetch).
    #[error("legacy API returned HTTP {status}")]
    Status { status: u16 },

    /// The OAuth endpoint answered 2xx with an unusable body.
    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),
}

impl UpstreamError {
    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            UpstreamError::Network(format!("request timed out: {}", error))
        } else {
            UpstreamError::Network(error.to_string())
        }
    }
}

/// Raw response of one business call. Parsed by the executor, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Convenience constructor for a JSON body.
    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A credential fresh from the OAuth endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for FetchedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OAuthResponse {
    pub token: Option<String>,
    pub expires_in: Option<i64>,
}

impl OAuthResponse {
    pub(crate) fn into_token(self, now: DateTime<Utc>) -> Result<FetchedToken, UpstreamError> {
        let value = self
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UpstreamError::InvalidTokenResponse("missing 'token' field".to_string()))?;
        let expires_in = self.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        Ok(FetchedToken {
            value,
            expires_at: token_expiry(now, expires_in)?,
        })
    }
}

/// Absolute expiry for a token issued at `now` with the given lifetime.
///
/// Lifetimes that do not fit a timestamp are an invalid token response.
pub fn token_expiry(now: DateTime<Utc>, expires_in_secs: i64) -> Result<DateTime<Utc>, UpstreamError> {
    expires_in_secs
        .checked_sub(TOKEN_EXPIRY_BUFFER_SECS)
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            UpstreamError::InvalidTokenResponse(format!("'expires_in' out of range: {}", expires_in_secs))
        })
}

/// Payment processors the legacy API can build links for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentProvider {
    Stripe,
    Paypal,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Stripe => "STRIPE",
            PaymentProvider::Paypal => "PAYPAL",
        }
    }
}

impl std::fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of `GET api/v1/reservation/payment/handler`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLinkRequest {
    pub reservation_id: String,
    pub provider: PaymentProvider,
    pub language: String,
    /// Relative path (scheme and host already stripped).
    pub success_url: Option<String>,
    /// Relative path (scheme and host already stripped).
    pub cancel_url: Option<String>,
}

impl PaymentLinkRequest {
    pub(crate) fn query(&self) -> Vec<(&'static str, &str)> {
        let mut query = vec![
            ("type", self.provider.as_str()),
            ("id", self.reservation_id.as_str()),
            ("language", self.language.as_str()),
        ];
        if let Some(url) = &self.success_url {
            query.push(("success_url", url.as_str()));
        }
        if let Some(url) = &self.cancel_url {
            query.push(("cancel_url", url.as_str()));
        }
        query
    }
}
