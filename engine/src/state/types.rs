//! Core data model for the conversation state.

use serde::{Deserialize, Serialize};

/// Identifier of a topic node. Assigned from a monotonic counter starting at 0.
pub type TopicId = u64;

/// A single transcript segment as received from the speech source.
///
/// Never mutated after insertion into the buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub is_final: bool,
    /// Mean word confidence in `[0, 1]`.
    pub confidence: f64,
    pub timestamp_ms: u64,
}

/// A topic in the conversation graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicNode {
    pub id: TopicId,
    pub topic: String,
    pub keywords: Vec<String>,
    pub timestamp_ms: u64,
    /// Number of topic triggers resolved onto this node: 1 at creation, +1
    /// per revisit.
    pub sentence_count: u64,
    /// Filled in later by image enrichment; may remain unset.
    pub image_url: Option<String>,
}

/// One recorded image resolution attempt for a topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicImage {
    pub topic_id: TopicId,
    pub topic: String,
    pub image_url: Option<String>,
    pub timestamp_ms: u64,
}

/// Verdict assigned to a verified claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Supported,
    Refuted,
    Uncertain,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Supported => "SUPPORTED",
            Verdict::Refuted => "REFUTED",
            Verdict::Uncertain => "UNCERTAIN",
        }
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SUPPORTED" => Ok(Verdict::Supported),
            "REFUTED" => Ok(Verdict::Refuted),
            "UNCERTAIN" => Ok(Verdict::Uncertain),
            other => Err(format!(
                "verdict '{other}' is outside the enumerated set (SUPPORTED, REFUTED, UNCERTAIN)"
            )),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one completed fact-check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactResult {
    pub claim: String,
    pub verdict: Verdict,
    /// Verifier confidence in `[0, 1]`.
    pub confidence: f64,
    pub explanation: String,
    pub key_facts: Vec<String>,
    /// Evidence URLs that survived the blocklist filter.
    pub evidence_sources: Vec<String>,
    /// The optimized query used for evidence retrieval.
    pub search_query: String,
    pub timestamp_ms: u64,
}

/// Counters and gauges reported by `StateCore::stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStats {
    pub total_segments: u64,
    pub finalized_segments: u64,
    pub fact_checks_performed: u64,
    pub topics_identified: u64,
    pub buffer_size: usize,
    pub pending_topic_sentences: usize,
    pub batch_size: usize,
    pub fact_queue_size: usize,
    pub fact_results: usize,
    pub topic_count: usize,
}

/// Current topic and total count, for quick consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub current_topic: Option<String>,
    pub total_topics: usize,
}
