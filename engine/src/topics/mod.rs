//! Topic engine: semantic extraction and reuse detection.
//!
//! Runs once per accumulated window of final sentences. One LLM call extracts
//! `{topic, keywords}`; the extracted topic is then compared against every
//! existing node and either reuses the best match at or above the similarity
//! threshold or creates a new node. Image enrichment for new topics is fired
//! off as a separate tracked task and never blocks the update.

pub mod similarity;

use std::sync::Arc;

use serde::Deserialize;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::config::LlmCallSettings;
use crate::errors::{EngineError, EngineResult};
use crate::events::{EventSink, Notification};
use crate::images::ImageEngine;
use crate::providers::{CompletionRequest, LanguageModel};
use crate::state::{StateCore, TopicId};
use crate::utils::parse_json_response;

pub use similarity::{HashedBagEmbedding, Similarity};

const TOPIC_SYSTEM_PROMPT: &str =
    "You are a topic extraction assistant. Always respond in valid JSON format.";

fn topic_prompt(text: &str) -> String {
    format!(
        r#"You are analyzing a conversation transcript to identify the main topic.

Text: "{text}"

Extract the primary topic or subject being discussed. Be concise (1-5 words).

Respond in JSON format:
{{
    "topic": "main topic",
    "keywords": ["keyword1", "keyword2", "keyword3"]
}}

Examples:
- "Let's talk about climate change effects" -> topic: "Climate Change"
- "The latest AI models are impressive" -> topic: "AI Models"
"#
    )
}

/// Parsed topic extraction payload.
#[derive(Debug, Deserialize)]
struct TopicExtraction {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Outcome of one topic update, for callers that want to inspect it.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicOutcome {
    Created(TopicId),
    Reused(TopicId),
    /// Extraction produced nothing usable; state untouched.
    Skipped,
}

/// Detects topic shifts and maintains the topic graph.
pub struct TopicEngine {
    llm: Arc<dyn LanguageModel>,
    similarity: Arc<dyn Similarity>,
    images: Arc<ImageEngine>,
    state: Arc<StateCore>,
    sink: Arc<dyn EventSink>,
    tracker: TaskTracker,
    similarity_threshold: f32,
    llm_settings: LlmCallSettings,
}

impl TopicEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        similarity: Arc<dyn Similarity>,
        images: Arc<ImageEngine>,
        state: Arc<StateCore>,
        sink: Arc<dyn EventSink>,
        tracker: TaskTracker,
        similarity_threshold: f32,
        llm_settings: LlmCallSettings,
    ) -> Self {
        Self {
            llm,
            similarity,
            images,
            state,
            sink,
            tracker,
            similarity_threshold,
            llm_settings,
        }
    }

    /// Run one topic update for a window of finalized text.
    ///
    /// Failures are classified, logged, and emitted as `error` notifications;
    /// they never propagate to the caller and never mutate state.
    pub async fn run_update(self: Arc<Self>, window: String) {
        match self.update(window).await {
            Ok(outcome) => {
                if outcome == TopicOutcome::Skipped {
                    warn!("topic extraction produced no usable topic, skipping update");
                }
            }
            Err(err) => {
                warn!(error = %err, "topic update failed");
                self.sink.emit(Notification::from_error(&err)).await;
            }
        }
    }

    async fn update(&self, window: String) -> EngineResult<TopicOutcome> {
        let extracted = self.extract_topic(&window).await?;
        let Some((topic, keywords)) = extracted else {
            return Ok(TopicOutcome::Skipped);
        };

        let outcome = match self.find_existing_topic(&topic) {
            Some(existing_id) => {
                let node = self.state.switch_to_topic(existing_id)?;
                info!(topic_id = existing_id, topic = %node.topic, "returning to existing topic");
                self.sink
                    .emit(Notification::TopicUpdate {
                        topic_id: node.id,
                        topic: node.topic,
                        keywords: node.keywords,
                        is_new: false,
                        image_url: node.image_url,
                        total_topics: self.state.topic_count(),
                    })
                    .await;
                TopicOutcome::Reused(existing_id)
            }
            None => {
                let node = self.state.add_topic_node(topic.clone(), keywords.clone());
                info!(topic_id = node.id, topic = %node.topic, "new topic");
                self.sink
                    .emit(Notification::TopicUpdate {
                        topic_id: node.id,
                        topic: node.topic.clone(),
                        keywords: node.keywords.clone(),
                        is_new: true,
                        image_url: None,
                        total_topics: self.state.topic_count(),
                    })
                    .await;

                // Image lookup must never delay the update.
                let images = self.images.clone();
                let id = node.id;
                self.tracker.spawn(async move {
                    images.enrich_topic(id, topic, keywords).await;
                });
                TopicOutcome::Created(id)
            }
        };
        Ok(outcome)
    }

    /// One LLM call extracting `{topic, keywords}` from the window.
    /// Returns `None` for a structurally valid but empty topic.
    async fn extract_topic(&self, window: &str) -> EngineResult<Option<(String, Vec<String>)>> {
        let request = CompletionRequest::new(TOPIC_SYSTEM_PROMPT, topic_prompt(window))
            .with_model(self.llm_settings.model.clone())
            .with_temperature(self.llm_settings.temperature)
            .with_max_tokens(self.llm_settings.max_tokens);

        let raw = self.llm.complete(request).await.map_err(EngineError::from)?;
        let extraction: TopicExtraction = parse_json_response(&raw)?;

        let topic = extraction.topic.trim().to_string();
        if topic.is_empty() {
            return Ok(None);
        }
        Ok(Some((topic, extraction.keywords)))
    }

    /// Best existing topic at or above the reuse threshold, ties broken by
    /// lowest id (nodes are scanned in ascending id order).
    fn find_existing_topic(&self, new_topic: &str) -> Option<TopicId> {
        let mut best: Option<(TopicId, f32)> = None;
        for node in self.state.topic_nodes() {
            let score = self.similarity.score(&node.topic, new_topic);
            if score < self.similarity_threshold {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((node.id, score)),
            }
        }
        best.map(|(id, score)| {
            info!(topic_id = id, similarity = score, "found existing topic");
            id
        })
    }
}
