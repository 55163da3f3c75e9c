//! Colloquy engine: live conversation intelligence over streaming speech.
//!
//! The engine sits between an upstream speech-to-text source and downstream
//! LLM/search providers, and maintains three live artifacts:
//!
//! - a rolling **transcript** buffer,
//! - a **topic graph** tracking what is discussed over time, including
//!   returns to earlier topics,
//! - verified/refuted **factual claims** with citations.
//!
//! Three asynchronous loops drive it, all fed by transcript ingest: topic
//! extraction runs every few final sentences, claim selection runs per
//! sentence batch, and a single rate-limited worker drains the claim queue
//! through search-query optimization, evidence retrieval, and verification.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use colloquy_engine::{
//!     BraveSearch, BraveSearchConfig, ChannelSink, ConversationPipeline, EngineConfig,
//!     GroqChat, GroqConfig, TranscriptEvent,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let llm = Arc::new(GroqChat::new(GroqConfig::from_env().unwrap())?);
//!     let search = Arc::new(BraveSearch::new(BraveSearchConfig::from_env().unwrap())?);
//!     let (sink, mut events) = ChannelSink::new();
//!
//!     let pipeline = ConversationPipeline::builder(EngineConfig::from_env()?)
//!         .llm(llm)
//!         .text_search(search.clone())
//!         .image_search(search)
//!         .sink(sink)
//!         .build()?;
//!
//!     pipeline
//!         .ingest(TranscriptEvent::final_sentence("The Moon landing occurred in 1969."))
//!         .await;
//!     while let Some(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod events;
pub mod facts;
pub mod images;
pub mod ingest;
pub mod pipeline;
pub mod providers;
pub mod state;
pub mod topics;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::{ConfigError, EngineConfig, LlmCallSettings, LlmSettings, SearchSettings};
pub use errors::{EngineError, EngineResult};
pub use events::{ChannelSink, EventSink, Notification, NullSink};
pub use facts::{FactEngine, FactWorker};
pub use images::ImageEngine;
pub use ingest::{TranscriptEvent, TranscriptIngest};
pub use pipeline::{BuildError, ConversationPipeline, PipelineBuilder};
pub use providers::{
    BraveSearch, BraveSearchConfig, CompletionRequest, GroqChat, GroqConfig, ImageHit,
    ImageSearch, LanguageModel, ProviderError, ProviderResult, SafeSearch, SearchHit,
    SearchOptions, TextSearch,
};
pub use state::{
    EngineStats, ExportSnapshot, FactResult, StateCore, StateLimits, TopicId, TopicImage,
    TopicNode, TranscriptSegment, Verdict,
};
pub use topics::{HashedBagEmbedding, Similarity, TopicEngine};
