use crate::shared::config::{ClientConfig, ClientConfigBuilder, ConfigError};
use std::time::Duration;

const ENV_API_URL: &str = "FAVFEED_API_URL";
const ENV_TAG_SERVICE_URL: &str = "FAVFEED_TAG_SERVICE_URL";
const ENV_COMMENTS_URL: &str = "FAVFEED_COMMENTS_URL";
const ENV_TAG_SERVICE_SEARCH: &str = "FAVFEED_TAG_SERVICE_SEARCH";

/// Read once per feed query to decide whether the tag service may be used
pub trait FeatureFlagSource: Send + Sync {
    fn tag_service_search_enabled(&self) -> bool;
}

impl<F> FeatureFlagSource for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn tag_service_search_enabled(&self) -> bool {
        self()
    }
}

/// Runtime configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    client: ClientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: with_env_overrides(ClientConfig::default()),
        }
    }
}

impl Config {
    /// Create a new configuration with default values and env overrides
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: ClientConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an already validated configuration, env overrides are not applied
    pub fn from_client_config(client: ClientConfig) -> Self {
        Self { client }
    }

    /// Load a TOML file and apply env overrides on top
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let client = with_env_overrides(ClientConfig::from_file(path)?);
        client.validate()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &ClientConfig {
        &self.client
    }

    /// Full URL for a canonical API endpoint
    pub fn api_url(&self, path: &str) -> String {
        join_url(&self.client.api_url, path)
    }

    /// Full URL for a tag-service endpoint
    pub fn tag_service_url(&self, path: &str) -> String {
        join_url(&self.client.tag_service_url, path)
    }

    /// Full URL for a comments-service endpoint
    pub fn comments_url(&self, path: &str) -> String {
        join_url(&self.client.comments_url, path)
    }

    pub fn best_of_score_threshold(&self) -> u32 {
        self.client.best_of_score_threshold
    }

    pub fn fallback_on_rejected(&self) -> bool {
        self.client.fallback_on_rejected
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.client.request_timeout_secs)
    }
}

impl FeatureFlagSource for Config {
    fn tag_service_search_enabled(&self) -> bool {
        self.client.tag_service_search
    }
}

fn with_env_overrides(mut client: ClientConfig) -> ClientConfig {
    if let Ok(url) = std::env::var(ENV_API_URL) {
        client.api_url = url;
    }
    if let Ok(url) = std::env::var(ENV_TAG_SERVICE_URL) {
        client.tag_service_url = url;
    }
    if let Ok(url) = std::env::var(ENV_COMMENTS_URL) {
        client.comments_url = url;
    }
    if let Ok(flag) = std::env::var(ENV_TAG_SERVICE_SEARCH) {
        client.tag_service_search = matches!(flag.as_str(), "1" | "true");
    }
    client
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
