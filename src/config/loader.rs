//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults plus environment overrides, for
/// deployments running without a config file.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply recognized environment variables on top of the loaded config.
///
/// Unparseable values are ignored with a warning rather than failing
/// startup; validation still runs on the final result.
pub fn apply_env_overrides(config: &mut ProxyConfig) {
    if let Some(port) = parse_env::<u16>("PORT") {
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }
    if let Some(ttl) = parse_env::<u64>("CACHE_TTL") {
        config.cache.ttl_secs = ttl;
    }
    if let Some(window) = parse_env::<u64>("RATE_LIMIT_WINDOW_MS") {
        config.rate_limit.window_ms = window;
    }
    if let Some(max) = parse_env::<u32>("RATE_LIMIT_MAX") {
        config.rate_limit.max_requests = max;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Ok(file) = env::var("LOG_FILE") {
        config.observability.log_file = Some(file);
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}
