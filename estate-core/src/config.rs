//! Client configuration.
//!
//! This module provides [`ClientConfig`], which fixes the backend base URL and
//! the transport knobs the session client is built from.

use crate::errors::{ApiError, Result};
use std::time::Duration;
use url::Url;

/// Default backend API root.
pub const DEFAULT_BASE_URL: &str = "https://backend.sangrurestate.com/api";

/// Default path of the token refresh endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/token/refresh/";

/// Environment variable overriding the base URL.
pub const ENV_API_URL: &str = "ESTATE_API_URL";

/// Environment variable setting the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "ESTATE_TIMEOUT_SECS";

/// Configuration for the estate client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, e.g. `https://backend.example.com/api`.
    pub base_url: Url,
    /// Path of the refresh endpoint under `base_url`.
    pub refresh_path: String,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Capacity of the session event channel.
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            timeout: None,
            user_agent: concat!("estate-client/", env!("CARGO_PKG_VERSION")).to_string(),
            event_capacity: 16,
        }
    }
}

impl ClientConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config for the given API root.
    pub fn for_base_url(base_url: &str) -> Result<Self> {
        Self::new().base_url(base_url)
    }

    /// Build a config from `ESTATE_API_URL` and `ESTATE_TIMEOUT_SECS`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();
        if let Ok(url) = std::env::var(ENV_API_URL) {
            config = config.base_url(&url)?;
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ApiError::configuration(format!("{ENV_TIMEOUT_SECS} must be an integer, got {secs:?}"))
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Set the API root.
    pub fn base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| ApiError::configuration(format!("invalid base url {base_url:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::configuration(format!(
                "base url must be http(s), got {}",
                url.scheme()
            )));
        }
        self.base_url = url;
        Ok(self)
    }

    /// Set the refresh endpoint path.
    #[must_use]
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the session event channel capacity.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Join an endpoint path onto the API root.
    ///
    /// Paths are always relative to the root, with or without a leading slash.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Full URL of the refresh endpoint.
    pub fn refresh_url(&self) -> String {
        self.endpoint(&self.refresh_path)
    }

    /// Root that uploaded media paths are served from.
    ///
    /// This is the API root with its `/api` suffix dropped.
    pub fn media_base_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let root = base.strip_suffix("/api").unwrap_or(base);
        format!("{}/", root)
    }

    /// Resolve a media path returned by the backend to an absolute URL.
    ///
    /// Absolute URLs are returned untouched.
    pub fn media_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}", self.media_base_url(), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.as_str(), "https://backend.sangrurestate.com/api");
        assert_eq!(config.refresh_path, DEFAULT_REFRESH_PATH);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_endpoint_join() {
        let config = ClientConfig::for_base_url("http://localhost:8000/api/").unwrap();
        assert_eq!(config.endpoint("/properties/"), "http://localhost:8000/api/properties/");
        assert_eq!(config.endpoint("inquiries/"), "http://localhost:8000/api/inquiries/");
        assert_eq!(
            config.refresh_url(),
            "http://localhost:8000/api/auth/token/refresh/"
        );
    }

    #[test]
    fn test_media_urls() {
        let config = ClientConfig::for_base_url("https://backend.example.com/api").unwrap();
        assert_eq!(config.media_base_url(), "https://backend.example.com/");
        assert_eq!(
            config.media_url("/media/properties/1.jpg"),
            "https://backend.example.com/media/properties/1.jpg"
        );
        assert_eq!(
            config.media_url("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn test_media_base_without_api_suffix() {
        let config = ClientConfig::for_base_url("http://127.0.0.1:9000").unwrap();
        assert_eq!(config.media_base_url(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(ClientConfig::for_base_url("not a url").is_err());
        assert!(ClientConfig::for_base_url("ftp://example.com/api").is_err());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .refresh_path("/auth/refresh/")
            .timeout(Duration::from_secs(15))
            .user_agent("test-agent")
            .event_capacity(0);

        assert_eq!(config.refresh_path, "/auth/refresh/");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.event_capacity, 1);
    }
}
