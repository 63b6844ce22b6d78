//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MAGPIE_*)
//! 2. TOML config file (if MAGPIE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod proxies;
mod validation;

pub use proxies::{FetchStrategy, ProxyDescriptor, ResponseFormat, URL_PLACEHOLDER, default_proxies};
pub use validation::ConfigError;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MAGPIE_*)
/// 2. TOML config file (if MAGPIE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via MAGPIE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for proxy requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How proxies are combined for one fetch.
    ///
    /// Set via MAGPIE_STRATEGY (`race` or `sequential`).
    #[serde(default)]
    pub strategy: FetchStrategy,

    /// Forwarding proxies, in sequential-fallback order.
    #[serde(default = "default_proxies")]
    pub proxies: Vec<ProxyDescriptor>,

    /// Per-proxy timeout under the race strategy.
    #[serde(default = "default_race_timeout_ms")]
    pub race_timeout_ms: u64,

    /// Per-proxy timeout under the sequential strategy.
    #[serde(default = "default_sequential_timeout_ms")]
    pub sequential_timeout_ms: u64,

    /// A proxy response must decode to more than this many characters.
    #[serde(default = "default_min_response_chars")]
    pub min_response_chars: usize,

    /// Days an article stays in the cache.
    #[serde(default = "default_cache_retention_days")]
    pub cache_retention_days: u32,

    /// Entry quota; writes beyond it trigger eviction.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Entries evicted when a write hits the quota.
    #[serde(default = "default_cache_eviction_batch")]
    pub cache_eviction_batch: usize,

    /// Paragraphs shorter than this are treated as boilerplate.
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,

    /// Upper bound on paragraphs kept per article.
    #[serde(default = "default_max_paragraphs")]
    pub max_paragraphs: usize,

    /// Whether to collect page styles alongside the article.
    #[serde(default)]
    pub extract_styles: bool,

    /// External stylesheets fetched per article.
    #[serde(default = "default_max_stylesheets")]
    pub max_stylesheets: usize,

    /// Timeout per external stylesheet.
    #[serde(default = "default_stylesheet_timeout_ms")]
    pub stylesheet_timeout_ms: u64,

    /// Discovered URLs retained, most recent first.
    #[serde(default = "default_discovered_cap")]
    pub discovered_cap: usize,

    /// Let `spin` pick from discovered, unvisited links.
    #[serde(default)]
    pub explore_discovered: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./magpie-cache.sqlite")
}

fn default_user_agent() -> String {
    "magpie/0.1".into()
}

fn default_race_timeout_ms() -> u64 {
    8_000
}

fn default_sequential_timeout_ms() -> u64 {
    15_000
}

fn default_min_response_chars() -> usize {
    100
}

fn default_cache_retention_days() -> u32 {
    7
}

fn default_cache_max_entries() -> usize {
    500
}

fn default_cache_eviction_batch() -> usize {
    5
}

fn default_min_paragraph_chars() -> usize {
    50
}

fn default_max_paragraphs() -> usize {
    20
}

fn default_max_stylesheets() -> usize {
    3
}

fn default_stylesheet_timeout_ms() -> u64 {
    2_000
}

fn default_discovered_cap() -> usize {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            strategy: FetchStrategy::default(),
            proxies: default_proxies(),
            race_timeout_ms: default_race_timeout_ms(),
            sequential_timeout_ms: default_sequential_timeout_ms(),
            min_response_chars: default_min_response_chars(),
            cache_retention_days: default_cache_retention_days(),
            cache_max_entries: default_cache_max_entries(),
            cache_eviction_batch: default_cache_eviction_batch(),
            min_paragraph_chars: default_min_paragraph_chars(),
            max_paragraphs: default_max_paragraphs(),
            extract_styles: false,
            max_stylesheets: default_max_stylesheets(),
            stylesheet_timeout_ms: default_stylesheet_timeout_ms(),
            discovered_cap: default_discovered_cap(),
            explore_discovered: false,
        }
    }
}

impl AppConfig {
    /// Timeout applied to each proxy for the configured strategy.
    pub fn proxy_timeout(&self) -> Duration {
        match self.strategy {
            FetchStrategy::Race => Duration::from_millis(self.race_timeout_ms),
            FetchStrategy::Sequential => Duration::from_millis(self.sequential_timeout_ms),
        }
    }

    pub fn stylesheet_timeout(&self) -> Duration {
        Duration::from_millis(self.stylesheet_timeout_ms)
    }

    /// Cache retention window in milliseconds.
    pub fn retention_ms(&self) -> i64 {
        i64::from(self.cache_retention_days) * DAY_MS
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MAGPIE_`
    /// 2. TOML file from `MAGPIE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MAGPIE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MAGPIE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
