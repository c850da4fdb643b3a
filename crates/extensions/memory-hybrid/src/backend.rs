//! Hybrid memory backend implementation.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use recall_memory_sql::SqlBackend;
use recall_memory_vector::VectorBackend;
use recall_protocols::error::MemoryError;
use recall_protocols::memory::{Memory, MemoryBackend, MemorySearchResult};
use recall_protocols::query::MemoryQuery;
use recall_protocols::search::{HybridSearchOptions, MemoryStats};

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

/// Vector candidates fetched per requested result before filtering.
pub const OVERFETCH_FACTOR: usize = 2;

/// Single entry point over a structured and a vector backend.
///
/// Writes fan out SQL first, then vector. The two halves are not atomic: a
/// failure between them leaves the stores diverged.
pub struct HybridBackend {
    id: String,
    sql: SqlBackend,
    vector: VectorBackend,
    initialized: AtomicBool,
}

impl HybridBackend {
    pub fn new(sql: SqlBackend, vector: VectorBackend) -> Self {
        Self::with_id("hybrid", sql, vector)
    }

    /// Create with a custom backend ID.
    pub fn with_id(id: impl Into<String>, sql: SqlBackend, vector: VectorBackend) -> Self {
        Self {
            id: id.into(),
            sql,
            vector,
            initialized: AtomicBool::new(false),
        }
    }

    /// Get the SQL store.
    pub fn sql_backend(&self) -> &SqlBackend {
        &self.sql
    }

    /// Get the vector store.
    pub fn vector_backend(&self) -> &VectorBackend {
        &self.vector
    }

    /// Check if the backend is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Rank and filter memories.
    ///
    /// Without an embedding this is `query` on the SQL backend with every
    /// result scored `1.0`, in SQL order. With one, the best
    /// `k * OVERFETCH_FACTOR` vector candidates are filtered by the query and
    /// truncated to `k`; pagination and ordering fields of the query are not
    /// applied in that path.
    pub async fn hybrid_search(
        &self,
        options: HybridSearchOptions,
    ) -> Result<Vec<MemorySearchResult>, MemoryError> {
        let Some(embedding) = options.embedding() else {
            let memories = self.sql.query(options.query.clone()).await?;
            return Ok(memories
                .into_iter()
                .map(|memory| MemorySearchResult::new(memory, 1.0))
                .collect());
        };

        let k = options.k();
        let candidates = self
            .vector
            .vector_search(embedding, k.saturating_mul(OVERFETCH_FACTOR))
            .await?;
        let fetched = candidates.len();

        let results: Vec<MemorySearchResult> = candidates
            .into_iter()
            .filter(|result| options.query.matches(&result.memory))
            .take(k)
            .collect();

        debug!(k, fetched, returned = results.len(), "Hybrid search complete");
        Ok(results)
    }

    /// Tally every SQL record in one scan.
    pub fn stats(&self) -> MemoryStats {
        let mut stats = MemoryStats::default();
        self.sql.scan(|memory| {
            stats.record(&memory.agent_id, &memory.memory_type, memory.has_embedding());
        });
        stats
    }
}

impl Default for HybridBackend {
    fn default() -> Self {
        Self::new(SqlBackend::default(), VectorBackend::default())
    }
}

#[async_trait]
impl MemoryBackend for HybridBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn initialize(&self) -> Result<(), MemoryError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.sql.initialize().await?;
        self.vector.initialize().await?;
        info!(backend = %self.id, "Hybrid backend initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), MemoryError> {
        self.sql.close().await?;
        self.vector.close().await?;
        if self.initialized.swap(false, Ordering::SeqCst) {
            info!(backend = %self.id, "Hybrid backend closed");
        }
        Ok(())
    }

    async fn store(&self, memory: Memory) -> Result<Memory, MemoryError> {
        let stored = self.sql.store(memory).await?;
        if stored.has_embedding() {
            self.vector.store(stored.clone()).await?;
        } else {
            debug!(memory_id = %stored.id, "No embedding, skipping vector store");
        }
        Ok(stored)
    }

    async fn retrieve(&self, id: &str) -> Result<Option<Memory>, MemoryError> {
        self.sql.retrieve(id).await
    }

    async fn update(&self, memory: Memory) -> Result<(), MemoryError> {
        if !self.sql.contains(&memory.id) {
            debug!(memory_id = %memory.id, "Update skipped, memory not found");
            return Ok(());
        }

        let id = memory.id.clone();
        let has_embedding = memory.has_embedding();
        if has_embedding {
            self.sql.update(memory.clone()).await?;
            self.vector.store(memory).await?;
        } else {
            self.sql.update(memory).await?;
            if self.vector.contains(&id) {
                warn!(memory_id = %id, "Update dropped the embedding, removing vector");
                self.vector.delete(&id).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), MemoryError> {
        self.sql.delete(id).await?;
        self.vector.delete(id).await
    }

    async fn query(&self, query: MemoryQuery) -> Result<Vec<Memory>, MemoryError> {
        self.sql.query(query).await
    }

    async fn vector_search(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<MemorySearchResult>, MemoryError> {
        self.vector.vector_search(embedding, k).await
    }

    async fn clear_agent(&self, agent_id: &str) -> Result<(), MemoryError> {
        self.sql.clear_agent(agent_id).await?;
        self.vector.clear_agent(agent_id).await
    }
}
