//! Legacy Reservation Gateway Library
//!
//! Authentication-and-retry proxy in front of a third-party reservation API.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod token;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::LegacyGateway;
