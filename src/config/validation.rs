//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SecretsConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::SecretsConfig;

/// Largest PIN length the service accepts as configuration.
pub const MAX_PIN_SIZE: usize = 64;

/// Longest message lifetime the service accepts as configuration (ten years).
pub const MAX_EXP_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check a parsed configuration for values the service cannot run with.
pub fn validate_config(config: &SecretsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be > 0"));
    }

    let limits = &config.limits;
    if limits.pin_size == 0 || limits.pin_size > MAX_PIN_SIZE {
        errors.push(ValidationError::new(
            "limits.pin_size",
            format!("must be within 1..={}", MAX_PIN_SIZE),
        ));
    }
    if limits.max_pin_attempts == 0 {
        errors.push(ValidationError::new("limits.max_pin_attempts", "must be > 0"));
    }
    if limits.max_exp_secs == 0 || limits.max_exp_secs > MAX_EXP_SECS {
        errors.push(ValidationError::new(
            "limits.max_exp_sec",
            format!("must be within 1..={}", MAX_EXP_SECS),
        ));
    }

    if config.rate_limit.requests_per_window == 0 {
        errors.push(ValidationError::new("rate_limit.requests_per_window", "must be > 0"));
    }
    if config.rate_limit.window_ms == 0 {
        errors.push(ValidationError::new("rate_limit.window_ms", "must be > 0"));
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::new("rate_limit.sweep_interval_secs", "must be > 0"));
    }

    if config.retrieval.min_latency_ms == 0 {
        errors.push(ValidationError::new("retrieval.min_latency_ms", "must be > 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    if config.store.cleanup_interval_secs == 0 {
        errors.push(ValidationError::new("store.cleanup_interval_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&SecretsConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = SecretsConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.limits.pin_size = 0;
        config.limits.max_pin_attempts = 0;
        config.rate_limit.window_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "limits.pin_size",
                "limits.max_pin_attempts",
                "rate_limit.window_ms",
            ]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = SecretsConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_pin_size_upper_bound() {
        let mut config = SecretsConfig::default();
        config.limits.pin_size = MAX_PIN_SIZE + 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_max_exp_upper_bound() {
        let mut config = SecretsConfig::default();
        config.limits.max_exp_secs = MAX_EXP_SECS;
        assert!(validate_config(&config).is_ok());

        config.limits.max_exp_secs = 1_000_000_000_000_000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "limits.max_exp_sec");
    }
}
