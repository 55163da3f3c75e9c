//! Pipeline assembly: wiring, startup, and shutdown.
//!
//! A [`ConversationPipeline`] owns the state core, the three engines, the
//! ingest front end, and the single fact worker. Construction is explicit —
//! every task receives the shared state handle rather than reaching for a
//! global — which is also what makes the whole pipeline testable against
//! scripted providers.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::events::{EventSink, NullSink};
use crate::facts::{FactEngine, FactSettings, FactWorker};
use crate::images::ImageEngine;
use crate::ingest::{TranscriptEvent, TranscriptIngest};
use crate::providers::{ImageSearch, LanguageModel, SearchOptions, TextSearch};
use crate::state::{EngineStats, ExportSnapshot, StateCore, StateLimits};
use crate::topics::{HashedBagEmbedding, Similarity, TopicEngine};

/// Errors raised while assembling a pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("missing required provider: {0}")]
    MissingProvider(&'static str),
}

/// Builder for [`ConversationPipeline`].
pub struct PipelineBuilder {
    config: EngineConfig,
    llm: Option<Arc<dyn LanguageModel>>,
    text_search: Option<Arc<dyn TextSearch>>,
    image_search: Option<Arc<dyn ImageSearch>>,
    similarity: Option<Arc<dyn Similarity>>,
    sink: Option<Arc<dyn EventSink>>,
}

impl PipelineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            llm: None,
            text_search: None,
            image_search: None,
            similarity: None,
            sink: None,
        }
    }

    pub fn llm(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn text_search(mut self, search: Arc<dyn TextSearch>) -> Self {
        self.text_search = Some(search);
        self
    }

    pub fn image_search(mut self, search: Arc<dyn ImageSearch>) -> Self {
        self.image_search = Some(search);
        self
    }

    /// Override the similarity implementation (default: hashed bag-of-words).
    pub fn similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = Some(similarity);
        self
    }

    /// Attach the observer for downstream notifications (default: discard).
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Wire everything together and start the fact worker.
    pub fn build(self) -> Result<ConversationPipeline, BuildError> {
        self.config.validate()?;
        let llm = self.llm.ok_or(BuildError::MissingProvider("llm"))?;
        let text_search = self
            .text_search
            .ok_or(BuildError::MissingProvider("text_search"))?;
        let image_search = self
            .image_search
            .ok_or(BuildError::MissingProvider("image_search"))?;
        let similarity = self
            .similarity
            .unwrap_or_else(|| Arc::new(HashedBagEmbedding::default()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(NullSink));

        let config = self.config;
        let state = Arc::new(StateCore::new(StateLimits {
            transcript_buffer: config.transcript_buffer_size,
            batch_capacity: config.claim_selection_batch_size,
            topic_update_threshold: config.topic_update_threshold,
            image_update_threshold: config.image_update_threshold,
        }));
        let tracker = TaskTracker::new();
        let cancel = CancellationToken::new();

        let search_options = SearchOptions {
            max_results: config.search.max_results,
            safesearch: config.search.safesearch,
            region: config.search.region.clone(),
        };

        let images = Arc::new(ImageEngine::new(
            image_search,
            llm.clone(),
            state.clone(),
            sink.clone(),
            search_options,
            config.llm.image_subject.clone(),
        ));

        let topics = Arc::new(TopicEngine::new(
            llm.clone(),
            similarity,
            images.clone(),
            state.clone(),
            sink.clone(),
            tracker.clone(),
            config.similarity_threshold,
            config.llm.topic.clone(),
        ));

        let facts = Arc::new(FactEngine::new(
            llm,
            text_search,
            state.clone(),
            sink.clone(),
            FactSettings::from_config(config.max_claims_per_batch, &config.search, &config.llm),
        ));

        let ingest = TranscriptIngest::new(
            state.clone(),
            topics,
            facts.clone(),
            images,
            sink,
            tracker.clone(),
            cancel.clone(),
        );

        let worker = FactWorker::new(facts, config.fact_check_rate_limit, cancel.clone());
        tracker.spawn(worker.run());

        info!(
            topic_update_threshold = config.topic_update_threshold,
            claim_batch_size = config.claim_selection_batch_size,
            rate_limit = ?config.fact_check_rate_limit,
            "pipeline started"
        );

        Ok(ConversationPipeline {
            state,
            ingest,
            tracker,
            cancel,
        })
    }
}

/// A running conversation pipeline.
pub struct ConversationPipeline {
    state: Arc<StateCore>,
    ingest: TranscriptIngest,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl ConversationPipeline {
    pub fn builder(config: EngineConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    /// Feed one transcript event from the upstream source.
    pub async fn ingest(&self, event: TranscriptEvent) {
        self.ingest.handle_event(event).await;
    }

    /// Shared state handle, for direct inspection and claim injection.
    pub fn state(&self) -> Arc<StateCore> {
        self.state.clone()
    }

    pub fn stats(&self) -> EngineStats {
        self.state.stats()
    }

    /// Snapshot of the topic graph and companions, exportable as JSON.
    pub fn export(&self) -> ExportSnapshot {
        self.state.snapshot_for_export()
    }

    /// Stop accepting events, signal all tasks, and wait up to `grace` for
    /// them to finish. The fact worker exits between claims; in-flight
    /// engine tasks run to completion if they beat the deadline.
    pub async fn shutdown(&self, grace: Duration) {
        info!("pipeline shutting down");
        self.cancel.cancel();
        self.tracker.close();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(?grace, "tasks still running after grace period");
        }
        info!("pipeline shutdown complete");
    }
}
