//! Engine error taxonomy.
//!
//! Every failure inside the pipeline is classified into one of five kinds so
//! that downstream observers receive a stable `kind` string and so the
//! propagation policy can be enforced uniformly: provider and parse failures
//! terminate the task that hit them without touching state, while invariant
//! violations indicate an internal bug and abort the process in debug builds.

use thiserror::Error;

use crate::providers::ProviderError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Classified pipeline error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// External API unreachable, timed out, or returned a server error.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Credentials rejected by an external API. Fatal to the call, not the stream.
    #[error("authentication failure: {0}")]
    Auth(String),

    /// An LLM response was malformed JSON or missed required fields.
    #[error("parse failure: {0}")]
    Parse(String),

    /// A structurally valid response violated the contract (e.g. an
    /// out-of-range confidence or a verdict outside the enumerated set).
    #[error("policy violation: {0}")]
    Policy(String),

    /// Internal invariant broken. Never swallowed; escalated in debug builds.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    /// Stable kind tag surfaced in `error` notifications.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Transport(_) => "transport",
            EngineError::Auth(_) => "auth",
            EngineError::Parse(_) => "parse",
            EngineError::Policy(_) => "policy",
            EngineError::Invariant(_) => "invariant",
        }
    }

    /// Whether this error indicates an internal bug rather than an external
    /// condition.
    pub fn is_invariant(&self) -> bool {
        matches!(self, EngineError::Invariant(_))
    }
}

impl From<ProviderError> for EngineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Auth(msg) => EngineError::Auth(msg),
            ProviderError::Timeout(d) => {
                EngineError::Transport(format!("request timed out after {d:?}"))
            }
            ProviderError::Transport(msg) => EngineError::Transport(msg),
            ProviderError::Malformed(msg) => EngineError::Parse(msg),
        }
    }
}

/// Record an invariant violation.
///
/// Aborts in debug builds via `debug_assert!`; release builds surface the
/// error so the caller can log and refuse the mutation.
pub(crate) fn invariant_violation(message: String) -> EngineError {
    debug_assert!(false, "invariant violated: {message}");
    EngineError::Invariant(message)
}
