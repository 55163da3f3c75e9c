//! Transcript ingest: the entry point of the pipeline.
//!
//! One ingest per active stream. It performs only cheap state mutations and
//! task dispatch — it never awaits a provider itself, so a slow LLM or search
//! call can never stall the transcript. Dispatched tasks that fail are logged
//! and surfaced as error notifications; the triggering state mutation is not
//! rolled back.

use std::sync::Arc;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;

use crate::events::{EventSink, Notification};
use crate::facts::FactEngine;
use crate::images::ImageEngine;
use crate::state::StateCore;
use crate::topics::TopicEngine;

/// A transcript event from the upstream speech source.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
    /// Utterance confidence, when the source reports one.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Per-word confidences; averaged when no utterance confidence is given.
    #[serde(default)]
    pub word_confidences: Option<Vec<f64>>,
    #[serde(default)]
    pub received_at_ms: Option<u64>,
}

impl TranscriptEvent {
    /// A finalized sentence with full confidence (test and demo helper).
    pub fn final_sentence(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            confidence: None,
            word_confidences: None,
            received_at_ms: None,
        }
    }

    /// A partial hypothesis (test and demo helper).
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            confidence: None,
            word_confidences: None,
            received_at_ms: None,
        }
    }

    /// Utterance confidence, falling back to the mean word confidence, then 1.0.
    pub fn effective_confidence(&self) -> f64 {
        if let Some(confidence) = self.confidence {
            return confidence;
        }
        match &self.word_confidences {
            Some(words) if !words.is_empty() => {
                words.iter().sum::<f64>() / words.len() as f64
            }
            _ => 1.0,
        }
    }
}

/// Accepts transcript events and fans out triggers to the other loops.
pub struct TranscriptIngest {
    state: Arc<StateCore>,
    topics: Arc<TopicEngine>,
    facts: Arc<FactEngine>,
    images: Arc<ImageEngine>,
    sink: Arc<dyn EventSink>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl TranscriptIngest {
    pub fn new(
        state: Arc<StateCore>,
        topics: Arc<TopicEngine>,
        facts: Arc<FactEngine>,
        images: Arc<ImageEngine>,
        sink: Arc<dyn EventSink>,
        tracker: TaskTracker,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            state,
            topics,
            facts,
            images,
            sink,
            tracker,
            cancel,
        }
    }

    /// Process one transcript event.
    ///
    /// Partials are buffered and forwarded but advance no counters. Finals
    /// additionally feed the topic window, the claim-selection batch, and the
    /// context-image cadence, dispatching tracked tasks when a threshold is
    /// crossed.
    pub async fn handle_event(&self, event: TranscriptEvent) {
        if self.cancel.is_cancelled() {
            debug!("ingest stopped, dropping transcript event");
            return;
        }
        if event.text.trim().is_empty() {
            return;
        }

        let confidence = event.effective_confidence();
        let segment = self.state.append_segment(&event.text, event.is_final, confidence);
        self.sink
            .emit(Notification::Transcript {
                text: segment.text.clone(),
                is_final: segment.is_final,
                confidence: segment.confidence,
            })
            .await;

        if !event.is_final {
            return;
        }

        // Fast loop: topic update on window threshold.
        if let Some(window) = self.state.accumulate_topic_sentence(&event.text) {
            let topics = self.topics.clone();
            self.tracker.spawn(async move {
                topics.run_update(window).await;
            });
        }

        // Slow loop: claim selection on batch threshold.
        let (_, batch_full) = self.state.append_sentence_to_batch(&event.text);
        if batch_full {
            let batch = self.state.drain_batch();
            let facts = self.facts.clone();
            self.tracker.spawn(async move {
                facts.run_selection(batch).await;
            });
        }

        // Context-image cadence, decoupled from topic changes.
        if self.state.image_refresh_due() {
            let images = self.images.clone();
            self.tracker.spawn(async move {
                images.refresh_from_context().await;
            });
        }
    }
}
