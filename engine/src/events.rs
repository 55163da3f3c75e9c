//! Downstream notifications and the observer interface.
//!
//! The pipeline pushes structured records to observers as it works: every
//! transcript event, topic transition, selected claim, fact-check result, and
//! classified error. Transports (WebSocket fan-out, recording, a TUI) sit
//! behind [`EventSink`]; the engine never knows where events go.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::errors::EngineError;
use crate::state::{FactResult, TopicId, Verdict};

/// Structured notification emitted to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A transcript segment, partial or final.
    Transcript {
        text: String,
        is_final: bool,
        confidence: f64,
    },

    /// The conversation moved to a topic, newly created or revisited.
    TopicUpdate {
        topic_id: TopicId,
        topic: String,
        keywords: Vec<String>,
        is_new: bool,
        image_url: Option<String>,
        total_topics: usize,
    },

    /// A claim was selected for verification and enqueued.
    ClaimSelected { claim: String, queue_size: usize },

    /// A claim finished the verification pipeline.
    FactResult {
        claim: String,
        verdict: Verdict,
        confidence: f64,
        explanation: String,
        key_facts: Vec<String>,
        sources: Vec<String>,
    },

    /// A classified failure. The stream continues.
    Error { kind: String, message: String },
}

impl Notification {
    /// Build a `FactResult` notification from a stored result.
    pub fn from_fact_result(result: &FactResult) -> Self {
        Notification::FactResult {
            claim: result.claim.clone(),
            verdict: result.verdict,
            confidence: result.confidence,
            explanation: result.explanation.clone(),
            key_facts: result.key_facts.clone(),
            sources: result.evidence_sources.clone(),
        }
    }

    /// Build an `Error` notification from a classified engine error.
    pub fn from_error(err: &EngineError) -> Self {
        Notification::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Observer interface for downstream consumers.
///
/// Implementations must be cheap and non-blocking from the engine's point of
/// view: a sink that needs to do slow work should hand the notification off
/// to its own task.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Notification);
}

/// Sink that forwards notifications into an unbounded channel.
///
/// The common wiring for tests and for transports that drain events from a
/// receiver on their own schedule. Send failures (receiver dropped) are
/// ignored; a departed observer must not stall the pipeline.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn emit(&self, event: Notification) {
        let _ = self.tx.send(event);
    }
}

/// Sink that discards everything.
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn emit(&self, _event: Notification) {}
}
