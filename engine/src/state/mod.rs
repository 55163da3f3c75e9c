//! The state core: single owner of all shared mutable data.
//!
//! Every task in the pipeline mutates conversation state exclusively through
//! the named operations on [`StateCore`]. Operations are serialized by one
//! interior lock, so concurrent callers observe a total order and readers
//! always get consistent snapshots. The claim queue is the one handoff that
//! is not under the lock: it is an async channel so the fact worker can park
//! on an empty queue without holding anything.

mod export;
mod graph;
mod types;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

use crate::errors::EngineResult;
use crate::utils::epoch_millis;

pub use export::{ExportEdge, ExportMetadata, ExportSnapshot, VerdictTally};
pub use graph::TopicGraph;
pub use types::{
    EngineStats, FactResult, TopicId, TopicImage, TopicNode, TopicSummary, TranscriptSegment,
    Verdict,
};

/// Capacity and cadence limits enforced by the state core.
#[derive(Debug, Clone)]
pub struct StateLimits {
    /// Most recent transcript segments retained; older ones are dropped.
    pub transcript_buffer: usize,
    /// Sentences per claim-selection batch.
    pub batch_capacity: usize,
    /// Final sentences between topic updates.
    pub topic_update_threshold: usize,
    /// Final sentences between context-image refreshes.
    pub image_update_threshold: usize,
}

impl Default for StateLimits {
    fn default() -> Self {
        Self {
            transcript_buffer: 100,
            batch_capacity: 10,
            topic_update_threshold: 5,
            image_update_threshold: 8,
        }
    }
}

#[derive(Default)]
struct StateInner {
    transcript: VecDeque<TranscriptSegment>,
    /// Sentences awaiting claim selection; never exceeds `batch_capacity`.
    batch: Vec<String>,
    /// Final sentences accumulated since the last topic update.
    pending_topic: Vec<String>,
    /// Final sentences since the last context-image refresh.
    image_counter: usize,
    graph: TopicGraph,
    topic_images: Vec<TopicImage>,
    fact_results: Vec<FactResult>,

    total_segments: u64,
    finalized_segments: u64,
    fact_checks_performed: u64,

    // Per-entity timestamp high-water marks; timestamps handed out are
    // clamped so they never decrease within an entity type.
    last_segment_ts: u64,
    last_topic_ts: u64,
    last_image_ts: u64,
    last_fact_ts: u64,
}

fn clamped(last: &mut u64) -> u64 {
    *last = (*last).max(epoch_millis());
    *last
}

/// The authoritative, mutation-controlled conversation state.
pub struct StateCore {
    limits: StateLimits,
    inner: Mutex<StateInner>,
    claim_tx: mpsc::UnboundedSender<String>,
    claim_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
    queue_depth: AtomicUsize,
}

impl StateCore {
    pub fn new(limits: StateLimits) -> Self {
        let (claim_tx, claim_rx) = mpsc::unbounded_channel();
        Self {
            limits,
            inner: Mutex::new(StateInner::default()),
            claim_tx,
            claim_rx: tokio::sync::Mutex::new(claim_rx),
            queue_depth: AtomicUsize::new(0),
        }
    }

    pub fn limits(&self) -> &StateLimits {
        &self.limits
    }

    // =========================================================================
    // Transcript
    // =========================================================================

    /// Append a transcript segment to the bounded buffer.
    pub fn append_segment(&self, text: &str, is_final: bool, confidence: f64) -> TranscriptSegment {
        let mut inner = self.inner.lock();
        let segment = TranscriptSegment {
            text: text.to_string(),
            is_final,
            confidence: confidence.clamp(0.0, 1.0),
            timestamp_ms: clamped(&mut inner.last_segment_ts),
        };
        inner.transcript.push_back(segment.clone());
        while inner.transcript.len() > self.limits.transcript_buffer {
            inner.transcript.pop_front();
        }
        inner.total_segments += 1;
        if is_final {
            inner.finalized_segments += 1;
        }
        segment
    }

    /// Last `n` segments joined into one string.
    pub fn recent_context(&self, n: usize) -> String {
        let inner = self.inner.lock();
        let skip = inner.transcript.len().saturating_sub(n);
        inner
            .transcript
            .iter()
            .skip(skip)
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // =========================================================================
    // Trigger counters
    // =========================================================================

    /// Record a final sentence toward the topic-update cadence.
    ///
    /// Returns the accumulated window (joined sentences, counter reset) when
    /// the threshold is reached, `None` otherwise.
    pub fn accumulate_topic_sentence(&self, text: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        inner.pending_topic.push(text.to_string());
        if inner.pending_topic.len() >= self.limits.topic_update_threshold {
            let window = inner.pending_topic.join(" ");
            inner.pending_topic.clear();
            Some(window)
        } else {
            None
        }
    }

    /// Record a final sentence toward the context-image cadence; true when a
    /// refresh is due (counter reset).
    pub fn image_refresh_due(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.image_counter += 1;
        if inner.image_counter >= self.limits.image_update_threshold {
            inner.image_counter = 0;
            true
        } else {
            false
        }
    }

    // =========================================================================
    // Sentence batch
    // =========================================================================

    /// Append a sentence to the claim-selection batch.
    ///
    /// Returns `(new_size, full)`. When `full` is true the caller must drain
    /// the batch before the next append; this is what keeps the batch length
    /// bounded by `batch_capacity`.
    pub fn append_sentence_to_batch(&self, text: &str) -> (usize, bool) {
        let mut inner = self.inner.lock();
        inner.batch.push(text.to_string());
        let len = inner.batch.len();
        (len, len >= self.limits.batch_capacity)
    }

    /// Take the accumulated batch, leaving it empty.
    pub fn drain_batch(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.lock().batch)
    }

    // =========================================================================
    // Claim queue
    // =========================================================================

    /// Enqueue a claim for verification. Returns the queue depth after the
    /// enqueue. Never rate-limited, never blocks.
    pub fn enqueue_claim(&self, claim: String) -> usize {
        // The receiver lives as long as the state, so send only fails during
        // teardown; the depth counter is not bumped in that case.
        if self.claim_tx.send(claim).is_ok() {
            self.queue_depth.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.queue_depth.load(Ordering::SeqCst)
        }
    }

    /// Dequeue the next claim, waiting until one is available.
    ///
    /// Cancel-safe: callers race it against a shutdown signal. Returns `None`
    /// only if the queue has been closed.
    pub async fn dequeue_claim(&self) -> Option<String> {
        let mut rx = self.claim_rx.lock().await;
        let claim = rx.recv().await;
        if claim.is_some() {
            self.queue_depth.fetch_sub(1, Ordering::SeqCst);
        }
        claim
    }

    pub fn claim_queue_depth(&self) -> usize {
        self.queue_depth.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Topic graph
    // =========================================================================

    /// Create a topic node (fresh id, edge from the current topic, current
    /// pointer and path updated). Returns a snapshot of the new node.
    pub fn add_topic_node(&self, topic: String, keywords: Vec<String>) -> TopicNode {
        let mut inner = self.inner.lock();
        let ts = clamped(&mut inner.last_topic_ts);
        inner.graph.add_topic(topic, keywords, ts)
    }

    /// Switch to an existing topic. Errors (and escalates in debug builds) if
    /// the id does not exist.
    pub fn switch_to_topic(&self, id: TopicId) -> EngineResult<TopicNode> {
        self.inner.lock().graph.switch_to(id)
    }

    /// Snapshot of all topic nodes in id order.
    pub fn topic_nodes(&self) -> Vec<TopicNode> {
        self.inner.lock().graph.nodes()
    }

    pub fn topic_count(&self) -> usize {
        self.inner.lock().graph.len()
    }

    pub fn current_topic(&self) -> Option<TopicNode> {
        let inner = self.inner.lock();
        inner.graph.current().and_then(|id| inner.graph.node(id).cloned())
    }

    pub fn topic_path(&self) -> Vec<TopicId> {
        self.inner.lock().graph.path().to_vec()
    }

    pub fn topic_summary(&self) -> TopicSummary {
        let inner = self.inner.lock();
        TopicSummary {
            current_topic: inner
                .graph
                .current()
                .and_then(|id| inner.graph.node(id))
                .map(|n| n.topic.clone()),
            total_topics: inner.graph.len(),
        }
    }

    /// Topic nodes in creation-timestamp order.
    pub fn topic_timeline(&self) -> Vec<TopicNode> {
        self.inner.lock().graph.timeline()
    }

    /// Record the outcome of one image resolution attempt.
    ///
    /// Idempotent: a repeated call with the same `(topic_id, url)` is a
    /// no-op. Returns true when a new entry was recorded.
    pub fn record_topic_image(&self, topic_id: TopicId, topic: &str, url: Option<String>) -> bool {
        let mut inner = self.inner.lock();
        if !inner.graph.contains(topic_id) {
            warn!(topic_id, "image recorded for unknown topic id, dropping");
            return false;
        }
        let duplicate = inner
            .topic_images
            .iter()
            .any(|entry| entry.topic_id == topic_id && entry.image_url == url);
        if duplicate {
            return false;
        }
        // contains() was checked above, set_image cannot fail here
        let _ = inner.graph.set_image(topic_id, url.clone());
        let ts = clamped(&mut inner.last_image_ts);
        inner.topic_images.push(TopicImage {
            topic_id,
            topic: topic.to_string(),
            image_url: url,
            timestamp_ms: ts,
        });
        true
    }

    pub fn topic_images(&self) -> Vec<TopicImage> {
        self.inner.lock().topic_images.clone()
    }

    /// Current topic text plus the last ten transcript segments, used by the
    /// context-image refresh.
    pub fn image_context(&self) -> (Option<String>, String) {
        let inner = self.inner.lock();
        let current = inner
            .graph
            .current()
            .and_then(|id| inner.graph.node(id))
            .map(|n| n.topic.clone());
        let skip = inner.transcript.len().saturating_sub(10);
        let context = inner
            .transcript
            .iter()
            .skip(skip)
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        (current, context)
    }

    // =========================================================================
    // Fact results
    // =========================================================================

    /// Append a fact result. Timestamps are clamped non-decreasing; the
    /// stored copy is returned.
    pub fn append_fact_result(&self, mut result: FactResult) -> FactResult {
        let mut inner = self.inner.lock();
        result.timestamp_ms = {
            inner.last_fact_ts = inner.last_fact_ts.max(result.timestamp_ms).max(epoch_millis());
            inner.last_fact_ts
        };
        inner.fact_checks_performed += 1;
        inner.fact_results.push(result.clone());
        result
    }

    pub fn fact_results(&self) -> Vec<FactResult> {
        self.inner.lock().fact_results.clone()
    }

    // =========================================================================
    // Introspection and export
    // =========================================================================

    fn stats_locked(&self, inner: &StateInner) -> EngineStats {
        EngineStats {
            total_segments: inner.total_segments,
            finalized_segments: inner.finalized_segments,
            fact_checks_performed: inner.fact_checks_performed,
            topics_identified: inner.graph.len() as u64,
            buffer_size: inner.transcript.len(),
            pending_topic_sentences: inner.pending_topic.len(),
            batch_size: inner.batch.len(),
            fact_queue_size: self.queue_depth.load(Ordering::SeqCst),
            fact_results: inner.fact_results.len(),
            topic_count: inner.graph.len(),
        }
    }

    pub fn stats(&self) -> EngineStats {
        let inner = self.inner.lock();
        self.stats_locked(&inner)
    }

    /// Consistent snapshot of the topic graph and companions for export.
    pub fn snapshot_for_export(&self) -> ExportSnapshot {
        let inner = self.inner.lock();
        let stats = self.stats_locked(&inner);
        ExportSnapshot {
            nodes: inner.graph.nodes(),
            edges: inner
                .graph
                .edges()
                .into_iter()
                .map(|(from, to)| ExportEdge { from, to })
                .collect(),
            topic_path: inner.graph.path().to_vec(),
            topic_images: inner.topic_images.clone(),
            metadata: ExportMetadata {
                exported_at_ms: epoch_millis(),
                stats,
                verdicts: VerdictTally::from_results(&inner.fact_results),
            },
        }
    }
}
