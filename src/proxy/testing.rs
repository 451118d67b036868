//! Recording `LegacyApi` double for executor and gateway tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::upstream::{FetchedToken, LegacyApi, PaymentLinkRequest, UpstreamError, UpstreamResponse};

type Reply = Result<UpstreamResponse, UpstreamError>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Token,
    Autocomplete(String),
    Quote { token: String, payload: Value },
    Create { token: String, payload: Value },
    PaymentLink { token: String, request: PaymentLinkRequest },
    Booking { token: String, payload: Value },
}

/// Replies are consumed in order. Token fetches that were not queued succeed
/// with `token-1`, `token-2`, ...; business calls that were not queued fail
/// with a network error.
#[derive(Default)]
pub(crate) struct MockLegacyApi {
    tokens: Mutex<VecDeque<Result<FetchedToken, UpstreamError>>>,
    replies: Mutex<VecDeque<Reply>>,
    payment_replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl MockLegacyApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_token_error(&self, error: UpstreamError) {
        self.tokens.lock().unwrap().push_back(Err(error));
    }

    pub fn push_reply(&self, status: u16, body: Value) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(UpstreamResponse::json_body(status, &body)));
    }

    pub fn push_raw_reply(&self, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(UpstreamResponse::new(status, body)));
    }

    pub fn push_network_error(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(UpstreamError::Network("connection refused".into())));
    }

    pub fn push_payment_reply(&self, status: u16, body: Value) {
        self.payment_replies
            .lock()
            .unwrap()
            .push_back(Ok(UpstreamResponse::json_body(status, &body)));
    }

    pub fn push_payment_network_error(&self) {
        self.payment_replies
            .lock()
            .unwrap()
            .push_back(Err(UpstreamError::Network("timed out".into())));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn token_fetches(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Token).count()
    }

    /// Business calls, payment links included.
    pub fn business_calls(&self) -> usize {
        self.calls().iter().filter(|c| **c != Call::Token).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_reply(queue: &Mutex<VecDeque<Reply>>) -> Reply {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::Network("no reply queued".into())))
    }
}

#[async_trait]
impl LegacyApi for MockLegacyApi {
    async fn fetch_token(&self) -> Result<FetchedToken, UpstreamError> {
        self.record(Call::Token);
        let queued = self.tokens.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            Ok(FetchedToken {
                value: format!("token-{}", self.token_fetches()),
                expires_at: Utc::now() + Duration::days(29),
            })
        })
    }

    async fn fetch_autocomplete(&self, keyword: &str) -> Result<UpstreamResponse, UpstreamError> {
        self.record(Call::Autocomplete(keyword.to_string()));
        Self::next_reply(&self.replies)
    }

    async fn fetch_quote(&self, token: &str, payload: Value) -> Result<UpstreamResponse, UpstreamError> {
        self.record(Call::Quote {
            token: token.to_string(),
            payload,
        });
        Self::next_reply(&self.replies)
    }

    async fn fetch_reservation_create(
        &self,
        token: &str,
        payload: Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.record(Call::Create {
            token: token.to_string(),
            payload,
        });
        Self::next_reply(&self.replies)
    }

    async fn fetch_payment_link(
        &self,
        token: &str,
        request: &PaymentLinkRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.record(Call::PaymentLink {
            token: token.to_string(),
            request: request.clone(),
        });
        Self::next_reply(&self.payment_replies)
    }

    async fn fetch_booking(&self, token: &str, payload: Value) -> Result<UpstreamResponse, UpstreamError> {
        self.record(Call::Booking {
            token: token.to_string(),
            payload,
        });
        Self::next_reply(&self.replies)
    }
}
