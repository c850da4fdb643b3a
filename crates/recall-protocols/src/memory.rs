//! Memory backend protocol definitions.
//!
//! Backends store [`Memory`] records for agents and retrieve them by id,
//! by structured [`MemoryQuery`], or by embedding similarity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;
use crate::query::MemoryQuery;
use crate::types::{now_millis, Metadata, Timestamp};

/// Number of neighbours returned when a caller does not pick `k`.
pub const DEFAULT_SEARCH_K: usize = 10;

/// Core trait for memory backends.
///
/// Every record crossing this boundary is passed and returned by value;
/// callers never observe a backend's internal copy.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// Returns the backend ID.
    fn id(&self) -> &str;

    /// Prepare the backend. Calling it again once initialized is a no-op.
    async fn initialize(&self) -> Result<(), MemoryError>;

    /// Release all data held by the backend. Calling it again once closed is a no-op.
    async fn close(&self) -> Result<(), MemoryError>;

    /// Store a memory, overwriting any record with the same id.
    async fn store(&self, memory: Memory) -> Result<Memory, MemoryError>;

    /// Retrieve a memory by ID.
    async fn retrieve(&self, id: &str) -> Result<Option<Memory>, MemoryError>;

    /// Replace an existing memory. Unknown ids are ignored.
    async fn update(&self, memory: Memory) -> Result<(), MemoryError>;

    /// Delete a memory. Unknown ids are ignored.
    async fn delete(&self, id: &str) -> Result<(), MemoryError>;

    /// Run a structured query.
    async fn query(&self, query: MemoryQuery) -> Result<Vec<Memory>, MemoryError>;

    /// Return up to `k` memories ranked by cosine similarity to `embedding`.
    async fn vector_search(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<MemorySearchResult>, MemoryError>;

    /// Remove every memory owned by `agent_id`.
    async fn clear_agent(&self, agent_id: &str) -> Result<(), MemoryError>;

    /// [`vector_search`](Self::vector_search) with [`DEFAULT_SEARCH_K`].
    async fn vector_search_default(
        &self,
        embedding: &[f32],
    ) -> Result<Vec<MemorySearchResult>, MemoryError> {
        self.vector_search(embedding, DEFAULT_SEARCH_K).await
    }
}

/// A stored memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    /// Caller-supplied identity. Storing the same id again overwrites.
    pub id: String,

    /// Owning agent (or namespace); primary partition key.
    pub agent_id: String,

    /// Logical grouping within the agent's activity.
    pub session_id: String,

    /// Free-form category (e.g. "observation", "plan").
    #[serde(rename = "type")]
    pub memory_type: String,

    /// Textual payload.
    pub content: String,

    /// Situational data. Not indexed.
    #[serde(default)]
    pub context: Metadata,

    /// Creation or logical time.
    pub timestamp: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Lineage fields, carried but not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Memory {
    /// Create a memory stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        agent_id: impl Into<String>,
        session_id: impl Into<String>,
        memory_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent_id: agent_id.into(),
            session_id: session_id.into(),
            memory_type: memory_type.into(),
            content: content.into(),
            context: Metadata::new(),
            timestamp: now_millis(),
            embedding: None,
            metadata: None,
            tags: None,
            version: None,
            parent_id: None,
        }
    }

    /// Set the creation timestamp (ms since epoch).
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach an embedding vector.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Attach filterable metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the free-form context map.
    pub fn with_context(mut self, context: Metadata) -> Self {
        self.context = context;
        self
    }

    /// Record the version and parent of a derived memory.
    pub fn with_lineage(mut self, version: u32, parent_id: impl Into<String>) -> Self {
        self.version = Some(version);
        self.parent_id = Some(parent_id.into());
        self
    }

    /// The embedding, if present and non-empty.
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|e| !e.is_empty())
    }

    /// Whether this memory is eligible for vector storage.
    pub fn has_embedding(&self) -> bool {
        self.embedding().is_some()
    }
}

/// Result from a similarity search: the memory plus its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySearchResult {
    #[serde(flatten)]
    pub memory: Memory,
    pub similarity: f32,
}

impl MemorySearchResult {
    pub fn new(memory: Memory, similarity: f32) -> Self {
        Self { memory, similarity }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
