//! Base traits and types shared by all provider adapters.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by provider adapters.
///
/// The split matters to callers: `Transport`/`Timeout` mean the provider was
/// unreachable or slow, `Auth` means credentials were rejected, and
/// `Malformed` means the provider answered with something the adapter could
/// not decode.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, 5xx, or other unreachable-provider condition.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Credentials rejected by the provider.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The request exceeded the configured deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body could not be decoded into the expected shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Map a reqwest error into the taxonomy, attributing timeouts to the
    /// configured deadline.
    pub(crate) fn from_reqwest(err: reqwest::Error, deadline: Duration) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(deadline)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

// =============================================================================
// LLM
// =============================================================================

/// A single chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Optional system prompt.
    pub system: Option<String>,
    /// User prompt.
    pub prompt: String,
    /// Model override; the adapter's configured default applies when `None`.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token budget.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Request with a system prompt and conservative defaults.
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            prompt: prompt.into(),
            model: None,
            temperature: 0.2,
            max_tokens: 400,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Request/response text API over a chat LLM.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion and return the raw assistant text.
    ///
    /// The text may still be wrapped in markdown code fences; stripping is
    /// the caller's job (see `utils::json`).
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<String>;
}

// =============================================================================
// Search
// =============================================================================

/// SafeSearch level passed to search providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    Off,
    Moderate,
    #[default]
    Strict,
}

impl SafeSearch {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeSearch::Off => "off",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Strict => "strict",
        }
    }
}

impl std::str::FromStr for SafeSearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(SafeSearch::Off),
            "moderate" => Ok(SafeSearch::Moderate),
            "strict" => Ok(SafeSearch::Strict),
            other => Err(format!(
                "unsupported safesearch level: {other}. Supported: off, moderate, strict"
            )),
        }
    }
}

/// Options applied to a single search call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum results to return.
    pub max_results: usize,
    /// SafeSearch level.
    pub safesearch: SafeSearch,
    /// Region code; `"wt-wt"` means worldwide.
    pub region: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            safesearch: SafeSearch::Strict,
            region: "wt-wt".to_string(),
        }
    }
}

/// One text search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// One image search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageHit {
    /// Direct URL of the image.
    pub image_url: String,
    /// Title of the image or its page, when the provider reports one.
    pub title: Option<String>,
    /// Page the image was found on.
    pub source_url: Option<String>,
}

/// Web text search.
#[async_trait]
pub trait TextSearch: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) -> ProviderResult<Vec<SearchHit>>;
}

/// Web image search.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search_images(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> ProviderResult<Vec<ImageHit>>;
}
