//! Client configuration
//!
//! Settings can come from code through [`ConfigBuilder`], from a YAML file, or from
//! `GRAPH_BATCH_*` environment variables.

use crate::batch::MAX_REQUESTS;
use crate::error::{BatchError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default versioned service root
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Environment variable holding the service root
pub const ENV_BASE_URL: &str = "GRAPH_BATCH_BASE_URL";
/// Environment variable holding the per-exchange step limit
pub const ENV_REQUEST_LIMIT: &str = "GRAPH_BATCH_REQUEST_LIMIT";
/// Environment variable holding the transport timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "GRAPH_BATCH_TIMEOUT_SECS";

/// Batch client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Versioned service root, `$batch` is appended to it
    pub base_url: String,
    /// Steps per physical exchange, `2..=MAX_REQUESTS`
    pub batch_request_limit: usize,
    /// Transport timeout
    pub timeout_secs: u64,
    /// User agent sent by the reqwest transport
    pub user_agent: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_request_limit: MAX_REQUESTS,
            timeout_secs: 100,
            user_agent: concat!("graph-batch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl BatchConfig {
    /// Load from `GRAPH_BATCH_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ConfigBuilder::new();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            builder = builder.base_url(&base_url);
        }

        if let Some(limit) = lookup(ENV_REQUEST_LIMIT) {
            let limit = limit.trim().parse::<usize>().map_err(|e| {
                BatchError::config(format!("{} must be an integer: {}", ENV_REQUEST_LIMIT, e))
            })?;
            builder = builder.batch_request_limit(limit);
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            let timeout = timeout.trim().parse::<u64>().map_err(|e| {
                BatchError::config(format!("{} must be an integer: {}", ENV_TIMEOUT_SECS, e))
            })?;
            builder = builder.timeout_secs(timeout);
        }

        builder.build()
    }

    /// Load a YAML file, unset keys keep their defaults
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BatchError::config(format!("Failed to read config file {}: {}", path, e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            BatchError::config(format!("Failed to parse config file {}: {}", path, e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate
    pub fn validate(&self) -> Result<()> {
        if !(2..=MAX_REQUESTS).contains(&self.batch_request_limit) {
            return Err(BatchError::config(format!(
                "batch_request_limit must be between 2 and {}, got {}",
                MAX_REQUESTS, self.batch_request_limit
            )));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| BatchError::config(format!("invalid base_url '{}': {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(BatchError::config(format!(
                "base_url '{}' is not a hierarchical URL",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(BatchError::config("timeout_secs must be greater than zero"));
        }

        Ok(())
    }

    /// Endpoint that accepts batch payloads
    pub fn batch_endpoint(&self) -> String {
        format!("{}/$batch", self.base_url.trim_end_matches('/'))
    }
}

/// Builder for [`BatchConfig`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: BatchConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    pub fn batch_request_limit(mut self, limit: usize) -> Self {
        self.config.batch_request_limit = limit;
        self
    }

    pub fn timeout_secs(mut self, timeout: u64) -> Self {
        self.config.timeout_secs = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.config.user_agent = user_agent.to_string();
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<BatchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
