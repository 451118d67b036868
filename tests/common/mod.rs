//! Shared utilities for integration tests.
//!
//! A `wiremock` server plays the legacy API; the real gateway is started on
//! ephemeral ports and driven with `reqwest`.

#![allow(dead_code)]

use std::net::SocketAddr;

use legacy_gateway::config::GatewayConfig;
use legacy_gateway::{HttpServer, Shutdown};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ADMIN_KEY: &str = "test-admin-key";
pub const API_KEY: &str = "test-api-key";

/// Thirty days, comfortably past the one-day expiry buffer.
pub const TOKEN_TTL_SECS: i64 = 2_592_000;

/// Gateway config pointing at `upstream`.
pub fn config(upstream: &MockServer) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.legacy.base_url = upstream.uri();
    config.legacy.api_key = API_KEY.into();
    config.legacy.user = "svc".into();
    config.legacy.secret = "s3cret".into();
    config.legacy.rate_group = Some("premium".into());
    config.legacy.site_id = Some(123);
    config.timeouts.upstream_secs = 2;
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.into();
    config
}

/// Answer the OAuth endpoint with `token`, at most `times` times.
pub async fn mount_token(upstream: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "expires_in": TOKEN_TTL_SECS,
        })))
        .up_to_n_times(times)
        .mount(upstream)
        .await;
}

/// Requests the legacy API received on `route`.
pub async fn received_on(upstream: &MockServer, route: &str) -> Vec<wiremock::Request> {
    upstream
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == route)
        .collect()
}

pub struct TestGateway {
    pub addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestGateway {
    pub async fn start(config: GatewayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let admin_addr = admin_listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server = HttpServer::new(config).unwrap();
        let receiver = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, Some(admin_listener), receiver).await;
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        Self {
            addr,
            admin_addr,
            client,
            shutdown,
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.addr, route)
    }

    pub fn admin_url(&self, route: &str) -> String {
        format!("http://{}{}", self.admin_addr, route)
    }

    pub async fn post(&self, route: &str, body: Value) -> reqwest::Response {
        self.client.post(self.url(route)).json(&body).send().await.unwrap()
    }

    pub async fn admin_get(&self, route: &str) -> reqwest::Response {
        self.client
            .get(self.admin_url(route))
            .bearer_auth(ADMIN_KEY)
            .send()
            .await
            .unwrap()
    }

    pub async fn admin_post(&self, route: &str) -> reqwest::Response {
        self.client
            .post(self.admin_url(route))
            .bearer_auth(ADMIN_KEY)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
