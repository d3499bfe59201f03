//! Directory client configuration loaded from environment variables.
//!
//! Provides fail-fast loading with validation: required variables must be
//! present and non-empty or construction fails with a clear error. Tuning
//! knobs (timeout, scan paging) carry serde defaults so partial TOML/JSON
//! deserialization also works.

use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the directory base URL.
pub const ENV_DIRECTORY_URL: &str = "DIRECTORY_URL";

/// Environment variable naming the privileged service-role key.
pub const ENV_DIRECTORY_SERVICE_KEY: &str = "DIRECTORY_SERVICE_KEY";

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {message}")]
    InvalidVar { var: &'static str, message: String },
}

/// Configuration for the directory admin client.
#[derive(Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the directory's admin API
    /// (e.g. "<https://project.example.co/auth/v1>").
    pub base_url: String,

    /// Privileged service-role key, supplied out-of-band.
    pub service_key: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Page size used by the exhaustive account scan.
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: u32,

    /// Hard ceiling on scanned pages; guarantees the scan terminates even if
    /// the directory never returns a short page.
    #[serde(default = "default_scan_max_pages")]
    pub scan_max_pages: u32,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_scan_page_size() -> u32 {
    200
}

fn default_scan_max_pages() -> u32 {
    10
}

impl DirectoryConfig {
    /// Create a config with default tuning knobs.
    #[must_use]
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            request_timeout_secs: default_request_timeout(),
            scan_page_size: default_scan_page_size(),
            scan_max_pages: default_scan_max_pages(),
        }
    }

    /// Load configuration from the environment, failing fast on missing or
    /// malformed variables.
    ///
    /// Optional variables: `DIRECTORY_REQUEST_TIMEOUT_SECS`,
    /// `DIRECTORY_SCAN_PAGE_SIZE`, `DIRECTORY_SCAN_MAX_PAGES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = require_var(ENV_DIRECTORY_URL)?;
        let service_key = require_var(ENV_DIRECTORY_SERVICE_KEY)?;

        let mut config = Self::new(base_url, service_key);

        if let Some(secs) = parse_var("DIRECTORY_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout_secs = secs;
        }
        if let Some(size) = parse_var("DIRECTORY_SCAN_PAGE_SIZE")? {
            config.scan_page_size = size;
        }
        if let Some(pages) = parse_var("DIRECTORY_SCAN_MAX_PAGES")? {
            config.scan_max_pages = pages;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate invariants not expressible through types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidVar {
                var: ENV_DIRECTORY_URL,
                message: "base URL must not be empty".to_string(),
            });
        }
        if self.service_key.trim().is_empty() {
            return Err(ConfigError::InvalidVar {
                var: ENV_DIRECTORY_SERVICE_KEY,
                message: "service key must not be empty".to_string(),
            });
        }
        if self.scan_page_size == 0 {
            return Err(ConfigError::InvalidVar {
                var: "DIRECTORY_SCAN_PAGE_SIZE",
                message: "page size must be at least 1".to_string(),
            });
        }
        if self.scan_max_pages == 0 {
            return Err(ConfigError::InvalidVar {
                var: "DIRECTORY_SCAN_MAX_PAGES",
                message: "page ceiling must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the scan page size.
    #[must_use]
    pub fn with_scan_page_size(mut self, size: u32) -> Self {
        self.scan_page_size = size;
        self
    }

    /// Set the scan page ceiling.
    #[must_use]
    pub fn with_scan_max_pages(mut self, pages: u32) -> Self {
        self.scan_max_pages = pages;
        self
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// The [`Debug`] impl redacts the service key to prevent accidental
/// credential exposure in log output.
impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"[REDACTED]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("scan_page_size", &self.scan_page_size)
            .field("scan_max_pages", &self.scan_max_pages)
            .finish()
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value.trim().parse().map(Some).map_err(|e: T::Err| {
                ConfigError::InvalidVar {
                    var: name,
                    message: e.to_string(),
                }
            })
        }
        _ => Ok(None),
    }
}
