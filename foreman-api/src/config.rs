//! API Configuration Module
//!
//! Configuration is loaded from environment variables with sensible defaults
//! for development.

use foreman_core::{ApprovalPolicy, Backoff, EngineConfig};
use std::time::Duration;

/// API configuration for binding, CORS, and the escalation webhook.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host (default `0.0.0.0`).
    pub bind: String,

    /// Bind port (default 3000).
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Escalation webhook endpoint; None disables the webhook notifier.
    pub webhook_url: Option<String>,

    /// Shared secret for webhook HMAC signatures.
    pub webhook_secret: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(), // Empty = allow all
            webhook_url: None,
            webhook_secret: None,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `FOREMAN_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `FOREMAN_API_PORT`: Bind port (default: 3000)
    /// - `FOREMAN_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `FOREMAN_WEBHOOK_URL`: Escalation webhook endpoint
    /// - `FOREMAN_WEBHOOK_SECRET`: HMAC secret for webhook signatures
    pub fn from_env() -> Self {
        let bind =
            std::env::var("FOREMAN_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("FOREMAN_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let cors_origins = std::env::var("FOREMAN_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let webhook_url = std::env::var("FOREMAN_WEBHOOK_URL").ok();
        let webhook_secret = std::env::var("FOREMAN_WEBHOOK_SECRET").ok();

        Self {
            bind,
            port,
            cors_origins,
            webhook_url,
            webhook_secret,
        }
    }
}

/// Build the engine configuration from environment variables.
///
/// Environment variables:
/// - `FOREMAN_MAX_ATTEMPTS`: Failures tolerated before escalation (default: 3)
/// - `FOREMAN_BACKOFF_INITIAL_MS`: First retry delay (default: 250)
/// - `FOREMAN_BACKOFF_MAX_MS`: Retry delay cap (default: 5000)
/// - `FOREMAN_APPROVAL_POLICY`: `full_cycle` (default) or `single_attempt`
pub fn engine_config_from_env() -> EngineConfig {
    let mut config = EngineConfig::default();

    if let Some(max_attempts) = std::env::var("FOREMAN_MAX_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        config.retry.max_attempts = max_attempts;
    }

    let initial = std::env::var("FOREMAN_BACKOFF_INITIAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(250u64);
    let max = std::env::var("FOREMAN_BACKOFF_MAX_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5_000u64);
    config.retry.backoff = Backoff::Exponential {
        initial: Duration::from_millis(initial),
        max: Duration::from_millis(max),
        multiplier: 2.0,
    };

    if let Ok(policy) = std::env::var("FOREMAN_APPROVAL_POLICY") {
        config.approval = match policy.as_str() {
            "single_attempt" => ApprovalPolicy::SingleAttempt,
            _ => ApprovalPolicy::FullCycle,
        };
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(config.cors_origins.is_empty());
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_engine_defaults_validate() {
        // Without env overrides this mirrors EngineConfig::default()
        let config = engine_config_from_env();
        assert!(config.validate().is_ok());
    }
}
