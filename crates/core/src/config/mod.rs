//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (REDLETTER_*)
//! 2. TOML config file (if REDLETTER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::{ConfigError, MAX_SEARCH_FRESHNESS_HOURS};

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (REDLETTER_*)
/// 2. TOML config file (if REDLETTER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API.Bible key used for search and the book list.
    ///
    /// Set via REDLETTER_API_BIBLE_KEY environment variable.
    /// Required only when a search is performed.
    #[serde(default)]
    pub api_bible_key: Option<String>,

    /// API.Bible base URL.
    #[serde(default = "default_api_bible_base_url")]
    pub api_bible_base_url: String,

    /// API.Bible translation identifier.
    #[serde(default = "default_bible_id")]
    pub bible_id: String,

    /// Base URL of the static verse CDN.
    #[serde(default = "default_verse_base_url")]
    pub verse_base_url: String,

    /// Translation directory on the verse CDN (e.g. `en-kjv`).
    #[serde(default = "default_bible_version")]
    pub bible_version: String,

    /// Path to SQLite cache database.
    ///
    /// Set via REDLETTER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Single-verse fetch timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Search request timeout in milliseconds.
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Age in hours after which a cached search is refetched.
    #[serde(default = "default_search_freshness_hours")]
    pub search_freshness_hours: u64,

    /// Pause between successive remote fetches while warming a quote.
    #[serde(default = "default_warm_delay_ms")]
    pub warm_delay_ms: u64,

    /// Number of uncached quotes an opportunistic warm pass picks up.
    #[serde(default = "default_warm_batch_size")]
    pub warm_batch_size: usize,

    /// Fraction of listing requests that may trigger an opportunistic warm.
    #[serde(default = "default_warm_probability")]
    pub warm_probability: f64,

    /// Minimum seconds between two opportunistic warm passes.
    #[serde(default = "default_warm_cooldown_secs")]
    pub warm_cooldown_secs: u64,

    /// Quotes per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_api_bible_base_url() -> String {
    "https://api.scripture.api.bible/v1".into()
}

fn default_bible_id() -> String {
    "de4e12af7f28f599-02".into()
}

fn default_verse_base_url() -> String {
    "https://cdn.jsdelivr.net/gh/wldeh/bible-api/bibles".into()
}

fn default_bible_version() -> String {
    "en-kjv".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./redletter.sqlite")
}

fn default_user_agent() -> String {
    "redletter/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_search_timeout_ms() -> u64 {
    15_000
}

fn default_search_freshness_hours() -> u64 {
    24
}

fn default_warm_delay_ms() -> u64 {
    500
}

fn default_warm_batch_size() -> usize {
    2
}

fn default_warm_probability() -> f64 {
    0.2
}

fn default_warm_cooldown_secs() -> u64 {
    300
}

fn default_page_size() -> usize {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_bible_key: None,
            api_bible_base_url: default_api_bible_base_url(),
            bible_id: default_bible_id(),
            verse_base_url: default_verse_base_url(),
            bible_version: default_bible_version(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            search_timeout_ms: default_search_timeout_ms(),
            search_freshness_hours: default_search_freshness_hours(),
            warm_delay_ms: default_warm_delay_ms(),
            warm_batch_size: default_warm_batch_size(),
            warm_probability: default_warm_probability(),
            warm_cooldown_secs: default_warm_cooldown_secs(),
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Verse fetch timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Search timeout as Duration.
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    /// Search freshness window, capped at [`MAX_SEARCH_FRESHNESS_HOURS`].
    pub fn search_freshness(&self) -> chrono::Duration {
        let hours = self.search_freshness_hours.min(MAX_SEARCH_FRESHNESS_HOURS);
        i64::try_from(hours).ok().and_then(chrono::Duration::try_hours).unwrap_or_default()
    }

    pub fn warm_delay(&self) -> Duration {
        Duration::from_millis(self.warm_delay_ms)
    }

    pub fn warm_cooldown(&self) -> Duration {
        Duration::from_secs(self.warm_cooldown_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `REDLETTER_`
    /// 2. TOML file from `REDLETTER_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("REDLETTER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("REDLETTER_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the API.Bible key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set or blank.
    pub fn require_api_bible_key(&self) -> Result<&str, ConfigError> {
        self.api_bible_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "api_bible_key".into(),
                hint: "Set REDLETTER_API_BIBLE_KEY environment variable".into(),
            })
    }
}
