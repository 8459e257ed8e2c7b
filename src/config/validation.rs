//! Configuration validation.
//!
//! Semantic checks on a syntactically valid config. Returns all validation
//! errors, not just the first; runs before the config is accepted into the
//! system.

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &'static str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field,
        message: message.into(),
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            format!("not a valid socket address: {}", config.listener.bind_address),
        ));
    }

    if config.cache.ttl_secs == 0 {
        errors.push(err("cache.ttl_secs", "must be greater than zero"));
    }
    if config.cache.sweep_interval_secs == 0 {
        errors.push(err("cache.sweep_interval_secs", "must be greater than zero"));
    }
    if config.cache.max_entries == Some(0) {
        errors.push(err("cache.max_entries", "must be greater than zero when set"));
    }

    if config.upstream.max_sockets == 0 {
        errors.push(err("upstream.max_sockets", "must be greater than zero"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_ms == 0 {
            errors.push(err("rate_limit.window_ms", "must be greater than zero"));
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(err("rate_limit.max_requests", "must be greater than zero"));
        }
    }

    for name in &config.headers.strip_request_extra {
        if name.parse::<axum::http::header::HeaderName>().is_err() {
            errors.push(err(
                "headers.strip_request_extra",
                format!("not a valid header name: {name}"),
            ));
        }
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(err("limits.max_body_bytes", "must be greater than zero"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(err(
            "observability.metrics_address",
            format!(
                "not a valid socket address: {}",
                config.observability.metrics_address
            ),
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
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "nonsense".into();
        config.cache.ttl_secs = 0;
        config.upstream.max_sockets = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"cache.ttl_secs"));
        assert!(fields.contains(&"upstream.max_sockets"));
    }

    #[test]
    fn test_disabled_rate_limit_skips_window_checks() {
        let mut config = ProxyConfig::default();
        config.rate_limit.enabled = false;
        config.rate_limit.window_ms = 0;
        config.rate_limit.max_requests = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bad_strip_header_name() {
        let mut config = ProxyConfig::default();
        config.headers.strip_request_extra = vec!["ref\nerer".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "headers.strip_request_extra");
    }
}
