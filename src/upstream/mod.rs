//! Legacy reservation API client subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyExecutor / LegacyGateway
//!     → traits.rs (LegacyApi: one method per upstream capability)
//!     → client.rs (reqwest: URL, headers, default injection, timeout)
//!     → types.rs (UpstreamResponse | UpstreamError)
//! ```
//!
//! # Design Decisions
//! - HTTP error statuses are data, not errors; only transport failures are `Err`
//! - The trait is the seam tests replace with a recording double
//! - Timeouts surface as `UpstreamError::Network`, never as a status

pub mod client;
pub mod traits;
pub mod types;

pub use client::LegacyClient;
pub use traits::LegacyApi;
pub use types::{FetchedToken, PaymentLinkRequest, PaymentProvider, UpstreamError, UpstreamResponse};
