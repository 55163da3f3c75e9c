//! Configuration for the Groq chat adapter.

use std::env;
use std::time::Duration;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Groq adapter configuration.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// API key (`gsk_...`).
    pub api_key: String,
    /// Model used when a request does not override it.
    pub model: String,
    /// API base URL. Overridable so tests can point at a local mock server.
    pub base_url: String,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl GroqConfig {
    /// Configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the key from `GROQ_API_KEY`.
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("GROQ_API_KEY")
            .map_err(|_| "GROQ_API_KEY environment variable is not set".to_string())?;
        Ok(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("Groq API key is required".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("Groq model must not be empty".to_string());
        }
        if self.base_url.trim().is_empty() {
            return Err("Groq base URL must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GroqConfig::new("gsk_test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let config = GroqConfig::new("");
        let err = config.validate().unwrap_err();
        assert!(err.contains("API key is required"));
    }

    #[test]
    fn test_empty_model_rejected() {
        let config = GroqConfig::new("gsk_test").with_model("");
        assert!(config.validate().is_err());
    }
}
