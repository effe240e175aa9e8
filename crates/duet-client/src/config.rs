//! Client configuration.
//!
//! Explicit configuration object passed to the API client and the sync
//! engine. Values come from defaults or environment variables; nothing in
//! the client reads ambient global state.

use duet_core::error::{DuetError, Result};
use std::env;
use std::time::Duration;

/// Default API base URL for local development backends.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Observed polling cadence of the original client.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration for the Duet API client and sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Interval between conversation poll ticks.
    pub poll_interval: Duration,
    /// Per-request timeout for API calls.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for the given base URL with default timings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            ..Self::default()
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Recognized variables:
    /// - `DUET_API_URL` - backend base URL
    /// - `DUET_POLL_INTERVAL_SECS` - poll cadence in seconds
    /// - `DUET_REQUEST_TIMEOUT_SECS` - per-request timeout in seconds
    ///
    /// Unset variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns a config error if a set variable does not parse.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("DUET_API_URL")
            .map(normalize_base_url)
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let poll_interval = duration_from_env("DUET_POLL_INTERVAL_SECS")?
            .unwrap_or(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS));

        let request_timeout = duration_from_env("DUET_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        Ok(Self {
            base_url,
            poll_interval,
            request_timeout,
        })
    }

    /// Sets the poll cadence.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn duration_from_env(var: &str) -> Result<Option<Duration>> {
    match env::var(var) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| DuetError::config(format!("{} must be an integer, got '{}'", var, raw)))?;
            if secs == 0 {
                return Err(DuetError::config(format!("{} must be greater than zero", var)));
            }
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("https://api.example.com/");
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("http://localhost:5000")
            .with_poll_interval(Duration::from_secs(2))
            .with_request_timeout(Duration::from_secs(3));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }
}
