//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the secrets service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SecretsConfig {
    /// Listener configuration (bind address, body limit, client address source).
    pub listener: ListenerConfig,

    /// Server limits advertised to clients and enforced at the boundary.
    pub limits: ServerCapabilities,

    /// Per-client rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Timing-safe retrieval settings.
    pub retrieval: RetrievalConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Reference message store settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Take the client address from X-Real-IP / X-Forwarded-For.
    /// Only enable behind a reverse proxy that overwrites these headers.
    pub trust_forwarded_headers: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 64 * 1024,
            trust_forwarded_headers: false,
        }
    }
}

/// Immutable server limits, shared read-only by every handler.
///
/// Serialized as-is by `GET /v1/params`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerCapabilities {
    /// Exact PIN length accepted by create and retrieve.
    pub pin_size: usize,

    /// Failed PIN attempts allowed before a message is destroyed.
    pub max_pin_attempts: u32,

    /// Longest expiration a message may request, in seconds.
    #[serde(rename = "max_exp_sec")]
    pub max_exp_secs: u64,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            pin_size: 5,
            max_pin_attempts: 3,
            max_exp_secs: 24 * 60 * 60,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Requests admitted per client identity within one window.
    pub requests_per_window: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// How often stale client windows are swept from memory.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_window: 5,
            window_ms: 1000,
            sweep_interval_secs: 60,
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Minimum latency of every well-formed retrieval, in milliseconds.
    pub min_latency_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { min_latency_ms: 250 }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// In-memory store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Interval between expired-message purges, in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: SecretsConfig = toml::from_str("").unwrap();
        assert_eq!(config.limits, ServerCapabilities::default());
        assert_eq!(config.rate_limit.requests_per_window, 5);
        assert_eq!(config.retrieval.min_latency_ms, 250);
    }

    #[test]
    fn test_partial_table_keeps_other_defaults() {
        let config: SecretsConfig = toml::from_str(
            r#"
            [limits]
            pin_size = 4
            max_exp_sec = 600
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.pin_size, 4);
        assert_eq!(config.limits.max_exp_secs, 600);
        assert_eq!(config.limits.max_pin_attempts, 3);
    }

    #[test]
    fn test_capabilities_json_field_names() {
        let json = serde_json::to_value(ServerCapabilities::default()).unwrap();
        assert_eq!(json["pin_size"], 5);
        assert_eq!(json["max_pin_attempts"], 3);
        assert_eq!(json["max_exp_sec"], 86400);
    }
}
