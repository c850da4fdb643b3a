//! Structured memory backend implementation.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use recall_protocols::error::MemoryError;
use recall_protocols::memory::{Memory, MemoryBackend, MemorySearchResult};
use recall_protocols::query::{MemoryQuery, OrderBy};

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

/// Location label used when none is given.
pub const DEFAULT_DB_PATH: &str = ":memory:";

/// A stored memory plus its insertion sequence.
struct Row {
    seq: u64,
    memory: Memory,
}

#[derive(Default)]
struct Table {
    rows: HashMap<String, Row>,
    next_seq: u64,
}

impl Table {
    fn upsert(&mut self, memory: Memory) {
        match self.rows.get_mut(&memory.id) {
            Some(row) => row.memory = memory,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.rows.insert(memory.id.clone(), Row { seq, memory });
            }
        }
    }
}

/// Structured, filter-queryable memory backend.
pub struct SqlBackend {
    id: String,
    db_path: String,
    initialized: AtomicBool,
    table: RwLock<Table>,
}

impl SqlBackend {
    /// Create a backend labelled with `db_path`.
    ///
    /// The path is exposed through [`db_path`](Self::db_path) only; records
    /// are held in memory.
    pub fn new(db_path: impl Into<String>) -> Self {
        Self::with_id("sql", db_path)
    }

    /// Create with a custom backend ID.
    pub fn with_id(id: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            db_path: db_path.into(),
            initialized: AtomicBool::new(false),
            table: RwLock::new(Table::default()),
        }
    }

    /// Configured database path label.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Check if the backend is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Number of stored memories.
    pub fn count(&self) -> usize {
        self.table.read().rows.len()
    }

    /// All memories owned by `agent_id`, in insertion order.
    pub fn memories_by_agent(&self, agent_id: &str) -> Vec<Memory> {
        let table = self.table.read();
        let mut rows: Vec<&Row> = table
            .rows
            .values()
            .filter(|row| row.memory.agent_id == agent_id)
            .collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter().map(|row| row.memory.clone()).collect()
    }

    /// Visit every stored memory once under a single read lock.
    pub fn scan<F>(&self, mut visit: F)
    where
        F: FnMut(&Memory),
    {
        let table = self.table.read();
        for row in table.rows.values() {
            visit(&row.memory);
        }
    }

    /// Whether a record is stored for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.table.read().rows.contains_key(id)
    }
}

impl Default for SqlBackend {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}

#[async_trait]
impl MemoryBackend for SqlBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn initialize(&self) -> Result<(), MemoryError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(backend = %self.id, db_path = %self.db_path, "SQL backend initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), MemoryError> {
        let mut table = self.table.write();
        table.rows.clear();
        table.next_seq = 0;
        if self.initialized.swap(false, Ordering::SeqCst) {
            info!(backend = %self.id, "SQL backend closed");
        }
        Ok(())
    }

    async fn store(&self, memory: Memory) -> Result<Memory, MemoryError> {
        debug!(memory_id = %memory.id, agent_id = %memory.agent_id, "Storing memory");
        self.table.write().upsert(memory.clone());
        Ok(memory)
    }

    async fn retrieve(&self, id: &str) -> Result<Option<Memory>, MemoryError> {
        Ok(self.table.read().rows.get(id).map(|row| row.memory.clone()))
    }

    async fn update(&self, memory: Memory) -> Result<(), MemoryError> {
        let mut table = self.table.write();
        match table.rows.get_mut(&memory.id) {
            Some(row) => {
                debug!(memory_id = %memory.id, "Updated memory");
                row.memory = memory;
            }
            None => debug!(memory_id = %memory.id, "Update skipped, memory not found"),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), MemoryError> {
        if self.table.write().rows.remove(id).is_some() {
            debug!(memory_id = %id, "Deleted memory");
        }
        Ok(())
    }

    async fn query(&self, query: MemoryQuery) -> Result<Vec<Memory>, MemoryError> {
        let table = self.table.read();
        let mut rows: Vec<&Row> = table
            .rows
            .values()
            .filter(|row| query.matches(&row.memory))
            .collect();

        // Ties (and relevance ordering, which has no signal here) fall back to
        // insertion order.
        match query.order() {
            OrderBy::Timestamp => rows.sort_by_key(|row| (Reverse(row.memory.timestamp), row.seq)),
            OrderBy::Relevance => rows.sort_by_key(|row| row.seq),
        }

        let memories: Vec<Memory> = rows.into_iter().map(|row| row.memory.clone()).collect();
        Ok(query.paginate(memories))
    }

    async fn vector_search(
        &self,
        _embedding: &[f32],
        _k: usize,
    ) -> Result<Vec<MemorySearchResult>, MemoryError> {
        Ok(Vec::new())
    }

    async fn clear_agent(&self, agent_id: &str) -> Result<(), MemoryError> {
        let mut table = self.table.write();
        let before = table.rows.len();
        table.rows.retain(|_, row| row.memory.agent_id != agent_id);
        info!(
            agent_id = %agent_id,
            removed = before - table.rows.len(),
            "Cleared agent memories from SQL backend"
        );
        Ok(())
    }
}
