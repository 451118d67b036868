//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the legacy API client, token store and gateway from config
//! - Create the Axum router for the `/legacy/*` endpoints
//! - Wire up middleware (request ID, tracing, body limit)
//! - Serve plain TCP or TLS, plus the optional admin listener
//! - Stop on the shared shutdown signal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderName, routing::post, Router};
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::X_REQUEST_ID;
use crate::proxy::LegacyGateway;
use crate::token::TokenStore;
use crate::upstream::LegacyClient;

/// Grace period for in-flight TLS connections after shutdown is signalled.
const TLS_DRAIN_SECS: u64 = 10;

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build legacy API client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to load token cache: {0}")]
    TokenCache(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: LegacyGateway,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the legacy gateway.
pub struct HttpServer {
    router: Router,
    admin_router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a server talking to the legacy API described by `config`.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let client = LegacyClient::new(&config.legacy, Duration::from_secs(config.timeouts.upstream_secs))?;

        let tokens = match &config.legacy.token_cache_path {
            Some(path) => TokenStore::load_from_file(path)?,
            None => TokenStore::new(),
        };

        let gateway = LegacyGateway::new(Arc::new(client), tokens, config.legacy.default_language.clone());
        Ok(Self::with_gateway(config, gateway))
    }

    /// Create a server around an existing gateway.
    pub fn with_gateway(config: GatewayConfig, gateway: LegacyGateway) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            gateway,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state.clone());
        let admin_router = setup_admin_router(state);
        Self {
            router,
            admin_router,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The inbound deadline is enforced by the handlers so that it surfaces as
    /// a JSON 502 like any other unreachable upstream.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let x_request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/legacy/autocomplete/", post(handlers::autocomplete))
            .route("/legacy/autocomplete", post(handlers::autocomplete))
            .route("/legacy/quote/", post(handlers::quote))
            .route("/legacy/quote", post(handlers::quote))
            .route("/legacy/create/", post(handlers::create))
            .route("/legacy/create", post(handlers::create))
            .route("/legacy/my-booking/", post(handlers::my_booking))
            .route("/legacy/my-booking", post(handlers::my_booking))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        self.spawn_admin(admin_listener, &shutdown);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        admin_listener: Option<TcpListener>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        self.spawn_admin(admin_listener, &shutdown);

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    fn spawn_admin(&self, listener: Option<TcpListener>, shutdown: &broadcast::Receiver<()>) {
        let Some(listener) = listener else {
            return;
        };

        let router = self.admin_router.clone();
        let mut shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            if let Ok(addr) = listener.local_addr() {
                tracing::info!(address = %addr, "Admin API starting");
            }
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.recv().await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Admin API stopped with error");
            }
        });
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
