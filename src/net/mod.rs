//! Network layer subsystem.
//!
//! Plain TCP listeners are bound in `main`; this module only covers the
//! optional TLS termination handed to `axum-server`.

pub mod tls;
