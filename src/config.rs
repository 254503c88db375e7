//! Widget configuration
//!
//! Defaults point at the local embed server. Each value can be overridden
//! through the environment:
//! - `CIRRUS_API_BASE_URL`
//! - `CIRRUS_ENDPOINT_PATH`
//! - `CIRRUS_REQUEST_TIMEOUT_SECS`

use crate::error::{AppError, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ENDPOINT_PATH: &str = "/embed/get-order-modal-data";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Query parameter carrying the instrument token
pub const TOKEN_PARAM: &str = "cirrus_token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub base_url: String,
    pub endpoint_path: String,
    pub request_timeout_secs: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl WidgetConfig {
    /// Build config from process environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("CIRRUS_API_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(path) = lookup("CIRRUS_ENDPOINT_PATH") {
            config.endpoint_path = path;
        }
        if let Some(timeout) = lookup("CIRRUS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout.trim().parse().map_err(|e| {
                AppError::Config(format!("Invalid CIRRUS_REQUEST_TIMEOUT_SECS '{}': {}", timeout, e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config("Request timeout must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Quote URL for a token, with the token percent-encoded
    pub fn quote_url(&self, token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?.join(&self.endpoint_path)?;
        url.query_pairs_mut().clear().append_pair(TOKEN_PARAM, token);
        Ok(url)
    }
}
