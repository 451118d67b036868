//! The four proxied capabilities, as called by the HTTP handlers.

use std::sync::Arc;

use serde_json::{json, Value};

use super::error::ProxyError;
use super::executor::{Endpoint, ProxyExecutor, ProxyRequest, RefreshReason};
use super::mapper::{self, PaymentMethod};
use crate::token::{Token, TokenStore};
use crate::upstream::{LegacyApi, PaymentLinkRequest, PaymentProvider};

/// Facade over [`ProxyExecutor`] adding per-endpoint input checks and the
/// reservation → payment-link chain.
#[derive(Clone)]
pub struct LegacyGateway {
    executor: ProxyExecutor,
    default_language: String,
}

impl LegacyGateway {
    pub fn new(api: Arc<dyn LegacyApi>, tokens: TokenStore, default_language: impl Into<String>) -> Self {
        Self {
            executor: ProxyExecutor::new(api, tokens),
            default_language: default_language.into(),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        self.executor.tokens()
    }

    /// Location search. Rejects a missing, null or empty keyword without
    /// calling upstream. Strings are forwarded untouched, numbers as text.
    pub async fn autocomplete(&self, payload: Value) -> Result<Value, ProxyError> {
        let keyword = match payload.get("keyword") {
            Some(Value::String(k)) if !k.is_empty() => k.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(ProxyError::LocalValidation("Keyword is required".to_string())),
        };

        let request = ProxyRequest::new(Endpoint::Autocomplete, json!({ "keyword": keyword }));
        Ok(self.executor.execute(&request).await?.body)
    }

    pub async fn quote(&self, payload: Value) -> Result<Value, ProxyError> {
        let request = ProxyRequest::new(Endpoint::Quote, payload);
        Ok(self.executor.execute(&request).await?.body)
    }

    /// Create a reservation. Online payment methods replace the reservation
    /// body with `{"payment_link": ...}`.
    pub async fn create_reservation(&self, payload: Value) -> Result<Value, ProxyError> {
        let method = PaymentMethod::from_payload(&payload);
        if method.is_none() {
            tracing::warn!(
                payment_method = ?payload.get("payment_method"),
                "Unrecognized payment method, no payment link will be generated"
            );
        }

        let request = ProxyRequest::new(Endpoint::ReservationCreate, payload.clone());
        let executed = self.executor.execute(&request).await?;

        let provider = match method {
            Some(PaymentMethod::Online(provider)) => provider,
            _ => return Ok(executed.body),
        };
        if executed.body.get("error").is_some() {
            return Ok(executed.body);
        }

        let reservation_id = mapper::extract_reservation_id(&executed.body)
            .ok_or_else(|| ProxyError::PaymentLink("created reservation has no identifier".to_string()))?;
        let token = executed.token.unwrap_or_default();

        let link = self.payment_link(&token, &payload, reservation_id, provider).await?;
        Ok(json!({ "payment_link": link }))
    }

    async fn payment_link(
        &self,
        token: &str,
        payload: &Value,
        reservation_id: String,
        provider: PaymentProvider,
    ) -> Result<String, ProxyError> {
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        let request = PaymentLinkRequest {
            reservation_id,
            provider,
            language: text("language").unwrap_or(self.default_language.as_str()).to_string(),
            success_url: text("success_url").map(mapper::to_relative_path),
            cancel_url: text("cancel_url").map(mapper::to_relative_path),
        };

        let response = self
            .executor
            .api()
            .fetch_payment_link(token, &request)
            .await
            .map_err(|e| ProxyError::PaymentLink(e.to_string()))?;

        if !response.is_success() {
            return Err(ProxyError::PaymentLink(format!("HTTP {}", response.status)));
        }

        let body = response
            .json()
            .map_err(|e| ProxyError::PaymentLink(format!("invalid JSON: {}", e)))?;

        let url = body
            .get("url")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ProxyError::PaymentLink("response has no 'url'".to_string()))?;

        tracing::info!(
            reservation_id = %request.reservation_id,
            provider = %provider,
            "Payment link generated"
        );
        Ok(url.to_string())
    }

    pub async fn my_booking(&self, payload: Value) -> Result<Value, ProxyError> {
        let request = ProxyRequest::new(Endpoint::Booking, payload);
        Ok(self.executor.execute(&request).await?.body)
    }

    /// Route a payload to the capability behind `endpoint`.
    pub async fn handle(&self, endpoint: Endpoint, payload: Value) -> Result<Value, ProxyError> {
        match endpoint {
            Endpoint::Autocomplete => self.autocomplete(payload).await,
            Endpoint::Quote => self.quote(payload).await,
            Endpoint::ReservationCreate => self.create_reservation(payload).await,
            Endpoint::Booking => self.my_booking(payload).await,
        }
    }

    /// Replace the stored token regardless of its validity.
    pub async fn force_refresh(&self) -> Result<Token, ProxyError> {
        self.executor.refresh_token(RefreshReason::Manual).await
    }
}
