//! Image engine: visual enrichment of the topic graph.
//!
//! Two paths feed `record_topic_image`:
//!
//! 1. **Topic enrichment** — fired for every newly created topic. Builds a
//!    query from the topic plus up to three keywords and records the first
//!    usable hit, or `None` on failure/empty results. Never fails the topic
//!    update.
//! 2. **Context refresh** — runs on its own sentence cadence, decoupled from
//!    topic changes. An LLM picks the most visually concrete subject from the
//!    current topic and recent transcript (a person, a place, an event), and
//!    the image found for that subject is recorded against the current topic.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::LlmCallSettings;
use crate::errors::{EngineError, EngineResult};
use crate::events::{EventSink, Notification};
use crate::providers::{CompletionRequest, ImageSearch, LanguageModel, SearchOptions};
use crate::state::{StateCore, TopicId};
use crate::utils::parse_json_response;

/// Keywords appended to the topic when building the image query.
const MAX_QUERY_KEYWORDS: usize = 3;

const IMAGE_SUBJECT_SYSTEM_PROMPT: &str =
    "You are an image subject extraction assistant. Always respond in valid JSON format.";

fn image_subject_prompt(current_topic: &str, conversation_text: &str) -> String {
    format!(
        r#"You are choosing the best subject for an illustrative image.

Current topic: "{current_topic}"
Recent conversation: "{conversation_text}"

Pick the single most visually concrete subject mentioned: prefer specific
people, places, events, or objects over abstract themes. If nothing in the
conversation would make a meaningful image, return an empty subject.

Respond in JSON format:
{{
    "image_subject": "subject to search for, or empty string",
    "subject_type": "person|place|event|object|other",
    "search_keywords": ["keyword1", "keyword2"]
}}
"#
    )
}

#[derive(Debug, Deserialize)]
struct ImageSubject {
    #[serde(default)]
    image_subject: String,
    #[serde(default)]
    search_keywords: Vec<String>,
}

/// Looks up and records topic imagery.
pub struct ImageEngine {
    search: Arc<dyn ImageSearch>,
    llm: Arc<dyn LanguageModel>,
    state: Arc<StateCore>,
    sink: Arc<dyn EventSink>,
    search_options: SearchOptions,
    llm_settings: LlmCallSettings,
}

impl ImageEngine {
    pub fn new(
        search: Arc<dyn ImageSearch>,
        llm: Arc<dyn LanguageModel>,
        state: Arc<StateCore>,
        sink: Arc<dyn EventSink>,
        search_options: SearchOptions,
        llm_settings: LlmCallSettings,
    ) -> Self {
        Self {
            search,
            llm,
            state,
            sink,
            search_options,
            llm_settings,
        }
    }

    /// Find and record an image for a newly created topic.
    ///
    /// Every outcome is recorded — `None` on failure or empty results — so
    /// the export always carries one resolution attempt per new topic.
    pub async fn enrich_topic(&self, topic_id: TopicId, topic: String, keywords: Vec<String>) {
        let query = build_query(&topic, &keywords);
        let url = self.first_image_url(&query).await;
        info!(topic_id, query = %query, found = url.is_some(), "topic image resolved");
        self.state.record_topic_image(topic_id, &topic, url);
    }

    /// Context-driven image refresh, decoupled from topic transitions.
    pub async fn refresh_from_context(&self) {
        if let Err(err) = self.try_refresh_from_context().await {
            warn!(error = %err, "context image refresh failed");
            self.sink.emit(Notification::from_error(&err)).await;
        }
    }

    async fn try_refresh_from_context(&self) -> EngineResult<()> {
        let (current_topic, conversation) = self.state.image_context();
        if conversation.is_empty() {
            debug!("no conversation context for image refresh");
            return Ok(());
        }
        let Some(current) = self.state.current_topic() else {
            debug!("no current topic to attach a context image to");
            return Ok(());
        };

        let request = CompletionRequest::new(
            IMAGE_SUBJECT_SYSTEM_PROMPT,
            image_subject_prompt(current_topic.as_deref().unwrap_or("none"), &conversation),
        )
        .with_model(self.llm_settings.model.clone())
        .with_temperature(self.llm_settings.temperature)
        .with_max_tokens(self.llm_settings.max_tokens);

        let raw = self.llm.complete(request).await.map_err(EngineError::from)?;
        let subject: ImageSubject = parse_json_response(&raw)?;

        let subject_text = subject.image_subject.trim();
        if subject_text.is_empty() {
            debug!("no visual subject identified in context");
            return Ok(());
        }

        let query = build_query(subject_text, &subject.search_keywords);
        let url = self.first_image_url(&query).await;
        info!(topic_id = current.id, subject = %subject_text, found = url.is_some(), "context image resolved");
        self.state.record_topic_image(current.id, subject_text, url);
        Ok(())
    }

    /// First usable image URL for a query; `None` on failure or no results.
    async fn first_image_url(&self, query: &str) -> Option<String> {
        match self.search.search_images(query, &self.search_options).await {
            Ok(hits) => hits.into_iter().next().map(|hit| hit.image_url),
            Err(err) => {
                warn!(error = %err, query, "image search failed");
                None
            }
        }
    }
}

/// Query string from a subject and up to three keywords.
fn build_query(subject: &str, keywords: &[String]) -> String {
    let mut terms = vec![subject.to_string()];
    terms.extend(
        keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .take(MAX_QUERY_KEYWORDS)
            .cloned(),
    );
    terms.join(" ")
}
