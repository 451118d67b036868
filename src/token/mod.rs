//! Legacy API credential cache.
//!
//! # Data Flow
//! ```text
//! ProxyExecutor
//!     → store.get_valid()      (lock-free read of the slot)
//!     → [absent or rejected]   fetch_token() on the legacy API
//!     → store.replace(..)      (serialized swap + optional file write)
//! ```
//!
//! # Design Decisions
//! - Exactly one slot; refreshing overwrites it, nothing deletes it
//! - Last writer wins; two requests refreshing at once is harmless
//! - No background refresh: only inbound requests trigger one

pub mod store;

pub use store::{Token, TokenStore};
