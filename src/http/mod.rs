//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → handlers.rs (parse body, span per request, metrics)
//!     → proxy::LegacyGateway
//!     → ProxyError / JSON body → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, ServerError};
