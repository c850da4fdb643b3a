//! Hybrid memory backend for Recall.
//!
//! Composes a [`SqlBackend`](recall_memory_sql::SqlBackend) (the canonical
//! store) with a [`VectorBackend`](recall_memory_vector::VectorBackend)
//! (embedded records only) behind one [`MemoryBackend`] entry point.
//!
//! ## How It Works
//!
//! 1. Every write lands in the SQL backend; writes carrying an embedding are
//!    mirrored into the vector backend
//! 2. Hybrid search without an embedding is a plain structured query
//! 3. With an embedding, `2k` vector candidates are shortlisted and then
//!    filtered in memory down to `k`
//!
//! [`NamespaceManager`] scopes all of this to caller-configured namespaces.
//!
//! [`MemoryBackend`]: recall_protocols::MemoryBackend

mod backend;
mod namespace;

pub use backend::{HybridBackend, OVERFETCH_FACTOR};
pub use namespace::{MemoryEvent, NamespaceManager, DEFAULT_NAMESPACE_PREFIX};
