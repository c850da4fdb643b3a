//! # Recall Protocols
//!
//! Shared types and the storage contract for the Recall hybrid memory store.
//! Contains only definitions - backends live in their own crates.
//!
//! ## Core Items
//!
//! - [`MemoryBackend`] - Trait every storage backend implements
//! - [`Memory`] - The record stored and returned by backends
//! - [`MemoryQuery`] - Structured filter shared by all backends
//! - [`HybridSearchOptions`] - Input to the hybrid ranking algorithm
//! - [`NamespaceConfig`] - Opaque namespace/retention configuration

pub mod error;
pub mod memory;
pub mod query;
pub mod retention;
pub mod search;
pub mod types;

pub use error::MemoryError;
pub use memory::{Memory, MemoryBackend, MemorySearchResult, DEFAULT_SEARCH_K};
pub use query::{MemoryQuery, OrderBy, TimeRange};
pub use retention::{NamespaceConfig, RetentionPolicy};
pub use search::{HybridSearchOptions, MemoryStats};
pub use types::*;
