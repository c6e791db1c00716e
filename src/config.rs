//! Configuration types
//!
//! `CatalogConfig` is loaded from YAML or built in code. Every section has
//! defaults, so an empty document is a valid configuration apart from the
//! API key, which may also come from the `CATALOG_API_KEY` environment
//! variable.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{BackoffType, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `api.api_key`
pub const API_KEY_ENV: &str = "CATALOG_API_KEY";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Remote catalog service
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Paging behaviour
    #[serde(default)]
    pub paging: PagingSettings,

    /// Local cache
    #[serde(default)]
    pub store: StoreConfig,

    /// Log level for the binary
    #[serde(default)]
    pub log_level: LogLevel,
}

impl CatalogConfig {
    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&contents)
    }

    /// Apply environment overrides
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.api.api_key = Some(key);
            }
        }
        self
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)?;
        if self.paging.page_size == 0 {
            return Err(Error::invalid_value("paging.page_size", "must be positive"));
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "http.timeout_seconds",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// The API key, or an error naming the missing field
    pub fn api_key(&self) -> Result<&str> {
        self.api
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::missing_field("api.api_key"))
    }

    /// Build the HTTP client configuration
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.api.base_url)
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff.backoff_type,
                Duration::from_millis(self.http.backoff.initial_ms),
                Duration::from_millis(self.http.backoff.max_ms),
            )
            .query("language", &self.api.language)
            .query("include_adult", self.api.include_adult.to_string());

        if let Some(key) = self.api.api_key.as_deref() {
            builder = builder.query("api_key", key);
        }

        builder = match self.http.requests_per_second {
            Some(rps) if rps > 0 => builder.rate_limit(RateLimiterConfig::new(rps, rps)),
            _ => builder.no_rate_limit(),
        };

        builder.build()
    }
}

// ============================================================================
// API
// ============================================================================

/// Remote catalog service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the catalog API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static credential appended to every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Listing language
    #[serde(default = "default_language")]
    pub language: String,

    /// Whether adult titles are included
    #[serde(default)]
    pub include_adult: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            language: default_language(),
            include_adult: false,
        }
    }
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3/".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Transport-level retries. Pagination itself never retries.
    #[serde(default)]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Requests per second; unset disables rate limiting
    #[serde(default = "default_rps")]
    pub requests_per_second: Option<u32>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: 0,
            backoff: BackoffConfig::default(),
            requests_per_second: default_rps(),
        }
    }
}

fn default_timeout() -> u64 {
    40
}

fn default_rps() -> Option<u32> {
    Some(20)
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    10_000
}

// ============================================================================
// Paging
// ============================================================================

/// Paging behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingSettings {
    /// Rows per local page, also used by the append key derivation
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Skip the initial refresh while the cache is younger than this
    #[serde(default)]
    pub cache_timeout_seconds: Option<u64>,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            cache_timeout_seconds: None,
        }
    }
}

impl PagingSettings {
    /// Cache timeout as a duration
    pub fn cache_timeout(&self) -> Option<Duration> {
        self.cache_timeout_seconds.map(Duration::from_secs)
    }
}

fn default_page_size() -> usize {
    20
}

// ============================================================================
// Store
// ============================================================================

/// Local cache settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// DuckDB file; in-memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}
