//! Configuration for the Brave Search adapter.

use std::env;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Brave Search adapter configuration.
#[derive(Debug, Clone)]
pub struct BraveSearchConfig {
    /// Subscription token sent in `X-Subscription-Token`.
    pub api_key: String,
    /// API base URL. Overridable so tests can point at a local mock server.
    pub base_url: String,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl BraveSearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the token from `BRAVE_SEARCH_API_KEY`.
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("BRAVE_SEARCH_API_KEY")
            .map_err(|_| "BRAVE_SEARCH_API_KEY environment variable is not set".to_string())?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("Brave Search API key is required".to_string());
        }
        if self.base_url.trim().is_empty() {
            return Err("Brave Search base URL must not be empty".to_string());
        }
        Ok(())
    }
}
