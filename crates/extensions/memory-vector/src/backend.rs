//! Vector memory backend implementation.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use recall_protocols::error::MemoryError;
use recall_protocols::memory::{Memory, MemoryBackend, MemorySearchResult};
use recall_protocols::query::{MemoryQuery, OrderBy};

use crate::index::VectorIndex;
use crate::options::VectorBackendOptions;

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

/// Records and their vectors, guarded together.
#[derive(Default)]
struct State {
    index: VectorIndex,
    entries: HashMap<String, Memory>,
}

impl State {
    fn insert(&mut self, memory: Memory, vector: Vec<f32>) {
        self.index.insert(memory.id.clone(), vector);
        self.entries.insert(memory.id.clone(), memory);
    }

    fn remove(&mut self, id: &str) -> bool {
        self.index.remove(id);
        self.entries.remove(id).is_some()
    }

    fn position(&self, id: &str) -> u64 {
        self.index.position(id).unwrap_or(u64::MAX)
    }
}

/// Similarity-searchable backend restricted to embedded memories.
pub struct VectorBackend {
    id: String,
    options: VectorBackendOptions,
    initialized: AtomicBool,
    state: RwLock<State>,
}

impl VectorBackend {
    pub fn new(options: VectorBackendOptions) -> Self {
        Self::with_id("vector", options)
    }

    /// Create with a custom backend ID.
    pub fn with_id(id: impl Into<String>, options: VectorBackendOptions) -> Self {
        Self {
            id: id.into(),
            options,
            initialized: AtomicBool::new(false),
            state: RwLock::new(State::default()),
        }
    }

    /// Get the backend options.
    pub fn options(&self) -> &VectorBackendOptions {
        &self.options
    }

    /// Configured embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.options.dimensions
    }

    /// Configured graph degree. Recorded only.
    pub fn hnsw_m(&self) -> usize {
        self.options.hnsw_m
    }

    /// Configured build-time candidate list size. Recorded only.
    pub fn ef_construction(&self) -> usize {
        self.options.ef_construction
    }

    /// Check if the backend is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Number of stored vectors.
    pub fn count(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether a vector is stored for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.state.read().entries.contains_key(id)
    }
}

impl Default for VectorBackend {
    fn default() -> Self {
        Self::new(VectorBackendOptions::default())
    }
}

/// Clone the memory's embedding, failing when it has none.
fn require_embedding(memory: &Memory) -> Result<Vec<f32>, MemoryError> {
    memory
        .embedding()
        .map(<[f32]>::to_vec)
        .ok_or_else(|| MemoryError::MissingEmbedding(memory.id.clone()))
}

#[async_trait]
impl MemoryBackend for VectorBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn initialize(&self) -> Result<(), MemoryError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(
            backend = %self.id,
            dimensions = self.options.dimensions,
            hnsw_m = self.options.hnsw_m,
            ef_construction = self.options.ef_construction,
            "Vector backend initialized"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), MemoryError> {
        let mut state = self.state.write();
        state.index.clear();
        state.entries.clear();
        if self.initialized.swap(false, Ordering::SeqCst) {
            info!(backend = %self.id, "Vector backend closed");
        }
        Ok(())
    }

    async fn store(&self, memory: Memory) -> Result<Memory, MemoryError> {
        let vector = require_embedding(&memory)?;
        debug!(memory_id = %memory.id, agent_id = %memory.agent_id, "Storing vector");
        self.state.write().insert(memory.clone(), vector);
        Ok(memory)
    }

    async fn retrieve(&self, id: &str) -> Result<Option<Memory>, MemoryError> {
        Ok(self.state.read().entries.get(id).cloned())
    }

    async fn update(&self, memory: Memory) -> Result<(), MemoryError> {
        let mut state = self.state.write();
        if !state.entries.contains_key(&memory.id) {
            debug!(memory_id = %memory.id, "Update skipped, vector not found");
            return Ok(());
        }
        let vector = require_embedding(&memory)?;
        debug!(memory_id = %memory.id, "Updated vector");
        state.insert(memory, vector);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), MemoryError> {
        if self.state.write().remove(id) {
            debug!(memory_id = %id, "Deleted vector");
        }
        Ok(())
    }

    /// Filters on agent, type and time range only; metadata and tags in the
    /// query are ignored.
    async fn query(&self, query: MemoryQuery) -> Result<Vec<Memory>, MemoryError> {
        let state = self.state.read();
        let mut matched: Vec<(u64, &Memory)> = state
            .entries
            .values()
            .filter(|memory| query.matches_basic(memory))
            .map(|memory| (state.position(&memory.id), memory))
            .collect();

        match query.order() {
            OrderBy::Timestamp => {
                matched.sort_by_key(|(seq, memory)| (Reverse(memory.timestamp), *seq))
            }
            OrderBy::Relevance => matched.sort_by_key(|(seq, _)| *seq),
        }

        let memories: Vec<Memory> = matched.into_iter().map(|(_, m)| m.clone()).collect();
        Ok(query.paginate(memories))
    }

    async fn vector_search(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<MemorySearchResult>, MemoryError> {
        let state = self.state.read();
        let results = state
            .index
            .search(embedding, k)
            .into_iter()
            .filter_map(|hit| {
                state
                    .entries
                    .get(&hit.id)
                    .map(|memory| MemorySearchResult::new(memory.clone(), hit.score))
            })
            .collect();
        Ok(results)
    }

    async fn clear_agent(&self, agent_id: &str) -> Result<(), MemoryError> {
        let mut state = self.state.write();
        let ids: Vec<String> = state
            .entries
            .values()
            .filter(|memory| memory.agent_id == agent_id)
            .map(|memory| memory.id.clone())
            .collect();
        for id in &ids {
            state.remove(id);
        }
        info!(
            agent_id = %agent_id,
            removed = ids.len(),
            "Cleared agent memories from vector backend"
        );
        Ok(())
    }
}
