//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, TlsConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {message}")]
    Env { name: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: TOML file (if given), then process environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto a config.
///
/// `lookup` abstracts the environment so tests do not have to mutate process state.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("LEGACY_API_BASE_URL") {
        config.legacy.base_url = v;
    }
    if let Some(v) = lookup("LEGACY_API_KEY") {
        config.legacy.api_key = v;
    }
    if let Some(v) = lookup("LEGACY_API_USER") {
        config.legacy.user = v;
    }
    if let Some(v) = lookup("LEGACY_API_SECRET") {
        config.legacy.secret = v;
    }
    if let Some(v) = lookup("LEGACY_API_RATE_GROUP") {
        config.legacy.rate_group = non_empty(v);
    }
    if let Some(v) = lookup("LEGACY_API_SITE_ID") {
        config.legacy.site_id = match non_empty(v) {
            Some(raw) => Some(raw.trim().parse().map_err(|e| ConfigError::Env {
                name: "LEGACY_API_SITE_ID",
                message: format!("'{}' is not an integer: {}", raw, e),
            })?),
            None => None,
        };
    }
    if let Some(v) = lookup("LEGACY_API_TIMEOUT_SECS") {
        config.timeouts.upstream_secs = v.trim().parse().map_err(|e| ConfigError::Env {
            name: "LEGACY_API_TIMEOUT_SECS",
            message: format!("'{}' is not a number of seconds: {}", v, e),
        })?;
    }
    if let Some(v) = lookup("LEGACY_TOKEN_CACHE_PATH") {
        config.legacy.token_cache_path = non_empty(v);
    }
    if let Some(v) = lookup("LEGACY_API_LANGUAGE").and_then(non_empty) {
        config.legacy.default_language = v;
    }
    if let Some(v) = lookup("GATEWAY_BIND_ADDRESS") {
        config.listener.bind_address = v;
    }
    if let (Some(cert_path), Some(key_path)) = (lookup("GATEWAY_TLS_CERT"), lookup("GATEWAY_TLS_KEY")) {
        config.listener.tls = Some(TlsConfig { cert_path, key_path });
    }
    if let Some(v) = lookup("GATEWAY_ADMIN_API_KEY") {
        config.admin.api_key = v;
    }

    Ok(config)
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
