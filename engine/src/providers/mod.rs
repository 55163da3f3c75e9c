//! External provider adapters.
//!
//! The engine consumes three abstract capabilities: a chat LLM, web text
//! search, and web image search. Each capability is a trait in [`base`], and
//! each concrete provider lives in its own submodule with separate `config`,
//! `messages`, and `client` files.
//!
//! Adapters are treated as possibly-slow network calls. They carry their own
//! timeouts and surface failures as typed [`ProviderError`]s so the engines
//! can classify transport problems separately from parse problems.

pub mod base;
pub mod llm;
pub mod search;

pub use base::{
    CompletionRequest, ImageHit, ImageSearch, LanguageModel, ProviderError, ProviderResult,
    SafeSearch, SearchHit, SearchOptions, TextSearch,
};
pub use llm::groq::{GroqChat, GroqConfig};
pub use search::brave::{BraveSearch, BraveSearchConfig};
