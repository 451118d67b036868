//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers, executor, token store produce:
//!     → logging.rs (structured log events, request ID span per request)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
