//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, URL_PLACEHOLDER};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < 100 {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if value > 300_000 {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - no proxy is configured, or a proxy lacks a name or the `{url}` placeholder
    /// - any timeout is under 100ms or over 5 minutes
    /// - `user_agent` is empty
    /// - a cache or extraction bound is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proxies.is_empty() {
            return Err(invalid("proxies", "at least one proxy is required"));
        }
        for proxy in &self.proxies {
            if proxy.name.trim().is_empty() {
                return Err(invalid("proxies", "proxy name must not be empty"));
            }
            if !proxy.endpoint.contains(URL_PLACEHOLDER) {
                return Err(invalid("proxies", format!("endpoint for {} lacks {URL_PLACEHOLDER}", proxy.name)));
            }
        }

        check_timeout("race_timeout_ms", self.race_timeout_ms)?;
        check_timeout("sequential_timeout_ms", self.sequential_timeout_ms)?;
        check_timeout("stylesheet_timeout_ms", self.stylesheet_timeout_ms)?;

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.cache_retention_days == 0 {
            return Err(invalid("cache_retention_days", "must be greater than 0"));
        }
        if self.cache_max_entries == 0 {
            return Err(invalid("cache_max_entries", "must be greater than 0"));
        }
        if self.cache_eviction_batch == 0 {
            return Err(invalid("cache_eviction_batch", "must be greater than 0"));
        }
        if self.max_paragraphs == 0 {
            return Err(invalid("max_paragraphs", "must be greater than 0"));
        }
        if self.discovered_cap == 0 {
            return Err(invalid("discovered_cap", "must be greater than 0"));
        }

        if self.max_stylesheets > 0 && !self.extract_styles {
            tracing::debug!(
                max_stylesheets = self.max_stylesheets,
                "max_stylesheets is set but extract_styles is off; no stylesheets will be fetched"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProxyDescriptor, ResponseFormat};

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_no_proxies() {
        let config = AppConfig { proxies: Vec::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "proxies"));
    }

    #[test]
    fn test_validate_proxy_without_placeholder() {
        let config = AppConfig {
            proxies: vec![ProxyDescriptor::new("bad", "https://proxy.test/", ResponseFormat::RawText)],
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "proxies"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { sequential_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "sequential_timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { race_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "race_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_zero_bounds() {
        let config = AppConfig { cache_max_entries: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "cache_max_entries"));

        let config = AppConfig { max_paragraphs: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_paragraphs"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            race_timeout_ms: 100,
            sequential_timeout_ms: 300_000,
            cache_max_entries: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
