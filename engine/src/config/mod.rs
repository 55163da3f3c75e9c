//! Engine configuration.
//!
//! Configuration comes from environment variables with sensible defaults;
//! provider secrets stay with the provider configs (`GroqConfig`,
//! `BraveSearchConfig`) so the engine config itself never holds credentials.
//! Priority: explicit construction > ENV vars > defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::providers::SafeSearch;
use crate::utils::HostBlocklist;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: String, message: String },
}

/// Parse an env var, falling back to a default when unset. Set-but-invalid
/// values are an error rather than a silent fallback.
fn env_parse<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var: var.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Per-call-type LLM parameters.
#[derive(Debug, Clone)]
pub struct LlmCallSettings {
    /// Model override; `None` uses the adapter's configured default.
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmCallSettings {
    fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: None,
            temperature,
            max_tokens,
        }
    }
}

/// Model parameters for each of the engine's LLM call types.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Topic extraction from a transcript window.
    pub topic: LlmCallSettings,
    /// Batched claim selection.
    pub selection: LlmCallSettings,
    /// Search-query optimization.
    pub query: LlmCallSettings,
    /// Claim verification against evidence.
    pub verification: LlmCallSettings,
    /// Visual-subject extraction for context images.
    pub image_subject: LlmCallSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            topic: LlmCallSettings::new(0.3, 200),
            selection: LlmCallSettings::new(0.2, 400),
            query: LlmCallSettings::new(0.1, 50),
            verification: LlmCallSettings::new(0.2, 500),
            image_subject: LlmCallSettings::new(0.3, 300),
        }
    }
}

/// Search behavior shared by evidence retrieval and image lookup.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub max_results: usize,
    pub safesearch: SafeSearch,
    /// Region code; `"wt-wt"` means worldwide.
    pub region: String,
    pub url_blocklist: HostBlocklist,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            safesearch: SafeSearch::Strict,
            region: "wt-wt".to_string(),
            url_blocklist: HostBlocklist::default(),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Final sentences between topic updates.
    pub topic_update_threshold: usize,
    /// Sentences per claim-selection batch.
    pub claim_selection_batch_size: usize,
    /// Upper bound on claims enqueued per batch.
    pub max_claims_per_batch: usize,
    /// Minimum spacing between verification pipeline starts.
    pub fact_check_rate_limit: Duration,
    /// Topic reuse cutoff; similarity at or above this reuses the topic.
    pub similarity_threshold: f32,
    /// Final sentences between context-image refreshes.
    pub image_update_threshold: usize,
    /// Most recent transcript segments retained.
    pub transcript_buffer_size: usize,
    pub search: SearchSettings,
    pub llm: LlmSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            topic_update_threshold: 5,
            claim_selection_batch_size: 10,
            max_claims_per_batch: 2,
            fact_check_rate_limit: Duration::from_secs(10),
            similarity_threshold: 0.7,
            image_update_threshold: 8,
            transcript_buffer_size: 100,
            search: SearchSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            topic_update_threshold: env_parse("TOPIC_UPDATE_THRESHOLD", 5)?,
            claim_selection_batch_size: env_parse("CLAIM_BATCH_SIZE", 10)?,
            max_claims_per_batch: env_parse("MAX_CLAIMS_PER_BATCH", 2)?,
            fact_check_rate_limit: Duration::from_secs(env_parse(
                "FACT_CHECK_RATE_LIMIT_SECONDS",
                10u64,
            )?),
            similarity_threshold: env_parse("TOPIC_SIMILARITY_THRESHOLD", 0.7f32)?,
            image_update_threshold: env_parse("IMAGE_UPDATE_THRESHOLD", 8)?,
            transcript_buffer_size: env_parse("TRANSCRIPT_BUFFER_SIZE", 100)?,
            search: SearchSettings {
                max_results: env_parse("SEARCH_MAX_RESULTS", 5)?,
                safesearch: env_parse("SEARCH_SAFESEARCH", SafeSearch::Strict)?,
                region: env::var("SEARCH_REGION").unwrap_or_else(|_| "wt-wt".to_string()),
                url_blocklist: match env::var("SEARCH_URL_BLOCKLIST") {
                    Ok(raw) => HostBlocklist::new(raw.split(',').map(|p| p.to_string())),
                    Err(_) => HostBlocklist::default(),
                },
            },
            llm: LlmSettings::default(),
        };

        for (var, slot) in [
            ("LLM_TOPIC_MODEL", &mut config.llm.topic),
            ("LLM_SELECTION_MODEL", &mut config.llm.selection),
            ("LLM_QUERY_MODEL", &mut config.llm.query),
            ("LLM_VERIFICATION_MODEL", &mut config.llm.verification),
            ("LLM_IMAGE_SUBJECT_MODEL", &mut config.llm.image_subject),
        ] {
            if let Ok(model) = env::var(var) {
                if !model.trim().is_empty() {
                    slot.model = Some(model);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(var: &str, message: &str) -> ConfigError {
            ConfigError::Invalid {
                var: var.to_string(),
                message: message.to_string(),
            }
        }

        if self.topic_update_threshold == 0 {
            return Err(invalid("TOPIC_UPDATE_THRESHOLD", "must be at least 1"));
        }
        if self.claim_selection_batch_size == 0 {
            return Err(invalid("CLAIM_BATCH_SIZE", "must be at least 1"));
        }
        if self.max_claims_per_batch == 0 {
            return Err(invalid("MAX_CLAIMS_PER_BATCH", "must be at least 1"));
        }
        if self.image_update_threshold == 0 {
            return Err(invalid("IMAGE_UPDATE_THRESHOLD", "must be at least 1"));
        }
        if self.transcript_buffer_size == 0 {
            return Err(invalid("TRANSCRIPT_BUFFER_SIZE", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(invalid(
                "TOPIC_SIMILARITY_THRESHOLD",
                "must be within [0.0, 1.0]",
            ));
        }
        if self.search.max_results == 0 {
            return Err(invalid("SEARCH_MAX_RESULTS", "must be at least 1"));
        }
        for (var, call) in [
            ("LLM_TOPIC_MODEL", &self.llm.topic),
            ("LLM_SELECTION_MODEL", &self.llm.selection),
            ("LLM_QUERY_MODEL", &self.llm.query),
            ("LLM_VERIFICATION_MODEL", &self.llm.verification),
            ("LLM_IMAGE_SUBJECT_MODEL", &self.llm.image_subject),
        ] {
            if matches!(&call.model, Some(model) if model.trim().is_empty()) {
                return Err(invalid(var, "model name must not be empty"));
            }
        }
        Ok(())
    }
}
