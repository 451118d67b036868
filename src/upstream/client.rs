//! reqwest implementation of the legacy API.
//!
//! # Responsibilities
//! - Build endpoint URLs from the configured base URL
//! - Attach `Content-Type`, bearer and `app-key` headers
//! - Inject configured defaults the caller left out
//! - Turn transport failures into `UpstreamError::Network`

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, RequestBuilder};
use serde_json::{json, Value};

use crate::config::LegacyApiConfig;
use super::traits::LegacyApi;
use super::types::{FetchedToken, OAuthResponse, PaymentLinkRequest, UpstreamError, UpstreamResponse};

const OAUTH_PATH: &str = "api/v1/oauth";
const AUTOCOMPLETE_PATH: &str = "api/v1/autocomplete-affiliates";
const QUOTE_PATH: &str = "api/v1/quote";
const CREATE_PATH: &str = "api/v1/create";
const PAYMENT_LINK_PATH: &str = "api/v1/reservation/payment/handler";
const BOOKING_PATH: &str = "api/v1/reservation/get";

/// HTTP client for the legacy reservation API.
pub struct LegacyClient {
    http: Client,
    base_url: String,
    api_key: String,
    user: String,
    secret: String,
    rate_group: Option<String>,
    site_id: Option<i64>,
}

impl LegacyClient {
    /// Create a client whose every call is bounded by `timeout`.
    pub fn new(config: &LegacyApiConfig, timeout: Duration) -> reqwest::Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .user_agent(concat!("legacy-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            user: config.user.clone(),
            secret: config.secret.clone(),
            rate_group: config.rate_group.clone(),
            site_id: config.site_id,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send(&self, endpoint: &'static str, request: RequestBuilder) -> Result<UpstreamResponse, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(UpstreamError::from_reqwest)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(UpstreamError::from_reqwest)?;

        tracing::debug!(endpoint, status, bytes = body.len(), "Legacy API responded");

        Ok(UpstreamResponse::new(status, body.to_vec()))
    }

    async fn post_authenticated(
        &self,
        endpoint: &'static str,
        path: &str,
        token: &str,
        payload: &Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let request = self.http.post(self.build_url(path)).bearer_auth(token).json(payload);
        self.send(endpoint, request).await
    }
}

/// Set `key` on an object payload unless the caller already supplied it.
pub fn inject_default(payload: &mut Value, key: &str, value: Value) {
    if let Value::Object(map) = payload {
        map.entry(key.to_string()).or_insert(value);
    }
}

#[async_trait]
impl LegacyApi for LegacyClient {
    async fn fetch_token(&self) -> Result<FetchedToken, UpstreamError> {
        let request = self
            .http
            .post(self.build_url(OAUTH_PATH))
            .json(&json!({ "user": self.user, "secret": self.secret }));
        let response = self.send("oauth", request).await?;

        if !response.is_success() {
            return Err(UpstreamError::Status {
                status: response.status,
            });
        }

        let parsed: OAuthResponse = serde_json::from_slice(&response.body)
            .map_err(|e| UpstreamError::InvalidTokenResponse(e.to_string()))?;
        parsed.into_token(Utc::now())
    }

    async fn fetch_autocomplete(&self, keyword: &str) -> Result<UpstreamResponse, UpstreamError> {
        let request = self
            .http
            .post(self.build_url(AUTOCOMPLETE_PATH))
            .header("app-key", &self.api_key)
            .json(&json!({ "keyword": keyword }));
        self.send("autocomplete", request).await
    }

    async fn fetch_quote(&self, token: &str, mut payload: Value) -> Result<UpstreamResponse, UpstreamError> {
        if let Some(rate_group) = &self.rate_group {
            inject_default(&mut payload, "rate_group", Value::from(rate_group.as_str()));
        }
        self.post_authenticated("quote", QUOTE_PATH, token, &payload).await
    }

    async fn fetch_reservation_create(
        &self,
        token: &str,
        mut payload: Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        if let Some(site_id) = self.site_id {
            inject_default(&mut payload, "site_id", Value::from(site_id));
        }
        self.post_authenticated("create", CREATE_PATH, token, &payload).await
    }

    async fn fetch_payment_link(
        &self,
        token: &str,
        request: &PaymentLinkRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let builder = self
            .http
            .get(self.build_url(PAYMENT_LINK_PATH))
            .bearer_auth(token)
            .query(&request.query());
        self.send("payment_link", builder).await
    }

    async fn fetch_booking(&self, token: &str, mut payload: Value) -> Result<UpstreamResponse, UpstreamError> {
        if let Some(site_id) = self.site_id {
            inject_default(&mut payload, "site_id", Value::from(site_id));
        }
        self.post_authenticated("my_booking", BOOKING_PATH, token, &payload).await
    }
}
