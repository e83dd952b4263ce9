//! Client configuration module
//!
//! Provides the configuration for the favorites cache and the feed router:
//! backend endpoints, the tag-service search flag and the best-of threshold.
//! A configuration is either assembled with [`ClientConfigBuilder`] or read
//! from a TOML document.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Canonical feed API
pub const DEFAULT_API_URL: &str = "https://pr0gramm.com/api";
/// Tag-service / category API
pub const DEFAULT_TAG_SERVICE_URL: &str = "http://pr0.wibbly-wobbly.de/api/categories/v1";
/// Favorite-comments service
pub const DEFAULT_COMMENTS_URL: &str = "http://pr0.wibbly-wobbly.de/api/comments/v1";

const DEFAULT_BEST_OF_SCORE_THRESHOLD: u32 = 2000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the canonical feed API
    pub api_url: String,
    /// Base URL of the tag-service feed API
    pub tag_service_url: String,
    /// Base URL of the favorite-comments service
    pub comments_url: String,
    /// Minimum score for items in the best-of feed
    pub best_of_score_threshold: u32,
    /// Route general searches through the tag service first
    pub tag_service_search: bool,
    /// Whether a rejected tag-service request still falls back to the canonical API
    pub fallback_on_rejected: bool,
    /// Per-request timeout for all backends
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            tag_service_url: DEFAULT_TAG_SERVICE_URL.to_string(),
            comments_url: DEFAULT_COMMENTS_URL.to_string(),
            best_of_score_threshold: DEFAULT_BEST_OF_SCORE_THRESHOLD,
            tag_service_search: false,
            fallback_on_rejected: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfigBuilder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.api_url, &self.tag_service_url, &self.comments_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_secs"));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    api_url: Option<String>,
    tag_service_url: Option<String>,
    comments_url: Option<String>,
    best_of_score_threshold: Option<u32>,
    tag_service_search: Option<bool>,
    fallback_on_rejected: Option<bool>,
    request_timeout_secs: Option<u64>,
}

impl ClientConfigBuilder {
    /// Set the canonical API URL
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the tag-service URL
    pub fn tag_service_url(mut self, url: impl Into<String>) -> Self {
        self.tag_service_url = Some(url.into());
        self
    }

    /// Set the favorite-comments service URL
    pub fn comments_url(mut self, url: impl Into<String>) -> Self {
        self.comments_url = Some(url.into());
        self
    }

    pub fn best_of_score_threshold(mut self, score: u32) -> Self {
        self.best_of_score_threshold = Some(score);
        self
    }

    pub fn tag_service_search(mut self, enabled: bool) -> Self {
        self.tag_service_search = Some(enabled);
        self
    }

    pub fn fallback_on_rejected(mut self, enabled: bool) -> Self {
        self.fallback_on_rejected = Some(enabled);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let defaults = ClientConfig::default();
        let config = ClientConfig {
            api_url: self.api_url.unwrap_or(defaults.api_url),
            tag_service_url: self.tag_service_url.unwrap_or(defaults.tag_service_url),
            comments_url: self.comments_url.unwrap_or(defaults.comments_url),
            best_of_score_threshold: self
                .best_of_score_threshold
                .unwrap_or(defaults.best_of_score_threshold),
            tag_service_search: self.tag_service_search.unwrap_or(defaults.tag_service_search),
            fallback_on_rejected: self
                .fallback_on_rejected
                .unwrap_or(defaults.fallback_on_rejected),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {0}")]
    InvalidValue(&'static str),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("failed to read configuration: {0}")]
    Io(String),
}
