use async_trait::async_trait;
use serde_json::Value;

use super::types::{FetchedToken, PaymentLinkRequest, UpstreamError, UpstreamResponse};

/// Every capability of the legacy reservation API.
///
/// Business calls return the raw response whatever its status; only transport
/// failures are errors. Interpreting statuses is the executor's job.
#[async_trait]
pub trait LegacyApi: Send + Sync {
    /// Exchange the configured client credentials for a bearer token.
    async fn fetch_token(&self) -> Result<FetchedToken, UpstreamError>;

    /// Location search. Authenticated by the shared API key, not a token.
    async fn fetch_autocomplete(&self, keyword: &str) -> Result<UpstreamResponse, UpstreamError>;

    async fn fetch_quote(&self, token: &str, payload: Value) -> Result<UpstreamResponse, UpstreamError>;

    async fn fetch_reservation_create(
        &self,
        token: &str,
        payload: Value,
    ) -> Result<UpstreamResponse, UpstreamError>;

    async fn fetch_payment_link(
        &self,
        token: &str,
        request: &PaymentLinkRequest,
    ) -> Result<UpstreamResponse, UpstreamError>;

    /// Look up an existing booking by code/email.
    async fn fetch_booking(&self, token: &str, payload: Value) -> Result<UpstreamResponse, UpstreamError>;
}
