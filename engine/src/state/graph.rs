//! Topic graph: a DAG of topic nodes plus the transition path.
//!
//! Two structures coexist on purpose. The petgraph `DiGraph` records
//! *creation lineage*: an edge `u -> v` means topic `v` was first created
//! while `u` was current. The `path` records *every* transition, including
//! returns to existing topics. Only [`TopicGraph::add_topic`] creates edges;
//! [`TopicGraph::switch_to`] touches the current pointer and the path only,
//! which is what keeps the graph acyclic under topic reuse.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::{invariant_violation, EngineError, EngineResult};
use crate::state::types::{TopicId, TopicNode};

#[derive(Debug, Default)]
pub struct TopicGraph {
    graph: DiGraph<TopicNode, ()>,
    index: HashMap<TopicId, NodeIndex>,
    next_id: TopicId,
    current: Option<TopicId>,
    path: Vec<TopicId>,
}

impl TopicGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new topic node, link it from the current topic, make it
    /// current, and append it to the path. Returns a snapshot of the node.
    pub fn add_topic(
        &mut self,
        topic: String,
        keywords: Vec<String>,
        timestamp_ms: u64,
    ) -> TopicNode {
        let id = self.next_id;
        self.next_id += 1;

        let node = TopicNode {
            id,
            topic,
            keywords,
            timestamp_ms,
            sentence_count: 1,
            image_url: None,
        };
        let idx = self.graph.add_node(node.clone());
        self.index.insert(id, idx);

        if let Some(current) = self.current {
            let current_idx = self.index[&current];
            self.graph.add_edge(current_idx, idx, ());
        }

        self.current = Some(id);
        self.path.push(id);
        node
    }

    /// Revisit an existing topic: bump its sentence count, make it current,
    /// and append it to the path. No edge is created.
    pub fn switch_to(&mut self, id: TopicId) -> EngineResult<TopicNode> {
        let idx = *self
            .index
            .get(&id)
            .ok_or_else(|| invariant_violation(format!("switch_to on unknown topic id {id}")))?;

        let node = &mut self.graph[idx];
        node.sentence_count += 1;
        let snapshot = node.clone();

        self.current = Some(id);
        self.path.push(id);
        Ok(snapshot)
    }

    /// Attach an image URL to a node. Existing URLs are not clobbered by a
    /// later `None` (a failed refresh must not erase a found image).
    pub fn set_image(&mut self, id: TopicId, url: Option<String>) -> EngineResult<()> {
        let idx = *self
            .index
            .get(&id)
            .ok_or_else(|| EngineError::Invariant(format!("set_image on unknown topic id {id}")))?;
        if url.is_some() {
            self.graph[idx].image_url = url;
        }
        Ok(())
    }

    pub fn current(&self) -> Option<TopicId> {
        self.current
    }

    pub fn path(&self) -> &[TopicId] {
        &self.path
    }

    pub fn contains(&self, id: TopicId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node(&self, id: TopicId) -> Option<&TopicNode> {
        self.index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> Vec<TopicNode> {
        let mut nodes: Vec<TopicNode> = self.graph.node_weights().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    /// All creation edges as `(from, to)` id pairs.
    pub fn edges(&self) -> Vec<(TopicId, TopicId)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].id, self.graph[b].id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in creation-timestamp order.
    pub fn timeline(&self) -> Vec<TopicNode> {
        let mut nodes: Vec<TopicNode> = self.graph.node_weights().cloned().collect();
        nodes.sort_by_key(|n| (n.timestamp_ms, n.id));
        nodes
    }

    /// True when the creation graph contains no cycles. Structurally always
    /// true; exposed so tests and export can assert it.
    pub fn is_acyclic(&self) -> bool {
        !petgraph::algo::is_cyclic_directed(&self.graph)
    }
}
