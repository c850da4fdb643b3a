//! Hybrid search input and backend statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::memory::DEFAULT_SEARCH_K;
use crate::query::MemoryQuery;

/// Input to a hybrid search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HybridSearchOptions {
    /// Structured filters applied to the result.
    #[serde(default)]
    pub query: MemoryQuery,

    /// Query embedding. Absent (or empty) means a pure structured search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Maximum number of ranked results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
}

impl HybridSearchOptions {
    pub fn new(query: MemoryQuery) -> Self {
        Self {
            query,
            embedding: None,
            k: None,
        }
    }

    /// Rank by similarity to `embedding`.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Set the number of results wanted.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Effective `k`.
    pub fn k(&self) -> usize {
        self.k.unwrap_or(DEFAULT_SEARCH_K)
    }

    /// The embedding, if present and non-empty.
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|e| !e.is_empty())
    }
}

/// Aggregate counts over a backend's records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total_memories: usize,
    pub by_agent: HashMap<String, usize>,
    pub by_type: HashMap<String, usize>,
    /// Records carrying a non-empty embedding.
    pub vectorized: usize,
    /// Always 0: no similarity history is tracked.
    pub avg_similarity: f32,
}

impl MemoryStats {
    /// Count one record.
    pub fn record(&mut self, agent_id: &str, memory_type: &str, has_embedding: bool) {
        self.total_memories += 1;
        *self.by_agent.entry(agent_id.to_string()).or_insert(0) += 1;
        *self.by_type.entry(memory_type.to_string()).or_insert(0) += 1;
        if has_embedding {
            self.vectorized += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = HybridSearchOptions::default();
        assert_eq!(options.k(), 10);
        assert!(options.embedding().is_none());
    }

    #[test]
    fn test_options_builders() {
        let options = HybridSearchOptions::new(MemoryQuery::new().agent("a"))
            .with_embedding(vec![1.0, 0.0])
            .with_k(3);
        assert_eq!(options.k(), 3);
        assert_eq!(options.embedding(), Some(&[1.0, 0.0][..]));
        assert_eq!(options.query.agent_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_empty_embedding_counts_as_absent() {
        let options = HybridSearchOptions::default().with_embedding(Vec::new());
        assert!(options.embedding().is_none());
    }

    #[test]
    fn test_stats_record() {
        let mut stats = MemoryStats::default();
        stats.record("a", "x", false);
        stats.record("a", "y", true);
        stats.record("b", "x", false);

        assert_eq!(stats.total_memories, 3);
        assert_eq!(stats.by_agent.get("a"), Some(&2));
        assert_eq!(stats.by_agent.get("b"), Some(&1));
        assert_eq!(stats.by_type.get("x"), Some(&2));
        assert_eq!(stats.vectorized, 1);
        assert_eq!(stats.avg_similarity, 0.0);
    }

    #[test]
    fn test_stats_serialization() {
        let json = serde_json::to_value(MemoryStats::default()).unwrap();
        assert_eq!(json["totalMemories"], 0);
        assert_eq!(json["avgSimilarity"], 0.0);
    }
}
