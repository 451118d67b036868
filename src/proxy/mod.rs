//! Authentication-and-retry proxy for the legacy reservation API.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → gateway.rs (input checks, payment-link chaining)
//!     → executor.rs (token acquisition, one-shot 401 retry, status mapping)
//!         → token::TokenStore (shared credential slot)
//!         → upstream::LegacyApi (one call per capability)
//!     → mapper.rs (per-endpoint body validation, reservation ID extraction)
//!     → error.rs (ProxyError → external status and body)
//! ```
//!
//! # Design Decisions
//! - One parameterized executor serves every endpoint; endpoints differ only
//!   in auth, validator and 4xx policy
//! - Upstream 5xx bodies and credential errors never reach the caller
//! - A 200 body carrying an `error` key is a business outcome, not a failure

pub mod error;
pub mod executor;
pub mod gateway;
pub mod mapper;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Malformed, ProxyError};
pub use executor::{ClientErrorPolicy, Endpoint, Executed, ProxyExecutor, ProxyRequest, RefreshReason};
pub use gateway::LegacyGateway;
