//! JSON export snapshot of the conversation state.

use serde::Serialize;

use crate::state::types::{EngineStats, FactResult, TopicId, TopicImage, TopicNode, Verdict};

/// Complete exportable view of the topic graph and its companions.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSnapshot {
    pub nodes: Vec<TopicNode>,
    pub edges: Vec<ExportEdge>,
    /// Every topic transition in order, revisits included.
    pub topic_path: Vec<TopicId>,
    pub topic_images: Vec<TopicImage>,
    pub metadata: ExportMetadata,
}

/// A creation edge of the topic DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportEdge {
    pub from: TopicId,
    pub to: TopicId,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportMetadata {
    pub exported_at_ms: u64,
    pub stats: EngineStats,
    pub verdicts: VerdictTally,
}

/// Count of fact results per verdict.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerdictTally {
    pub supported: usize,
    pub refuted: usize,
    pub uncertain: usize,
}

impl VerdictTally {
    pub fn from_results(results: &[FactResult]) -> Self {
        let mut tally = Self::default();
        for result in results {
            match result.verdict {
                Verdict::Supported => tally.supported += 1,
                Verdict::Refuted => tally.refuted += 1,
                Verdict::Uncertain => tally.uncertain += 1,
            }
        }
        tally
    }
}
