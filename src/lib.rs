//! # Recall
//!
//! Hybrid memory store for agents: a structured backend that keeps every
//! record, a vector backend for embedded records, and a hybrid backend that
//! writes to both and merges their results.
//!
//! [`MemoryEngine`] wires a [`Config`] into these backends;
//! [`telemetry::init_tracing`] installs the logging stack described by the
//! same configuration.

mod engine;
mod error;
pub mod telemetry;

pub use engine::MemoryEngine;
pub use error::EngineError;

pub use recall_config::{Config, ConfigLoader, ConfigValidator, LogFormat, LoggingConfig};
pub use recall_memory_hybrid::{HybridBackend, MemoryEvent, NamespaceManager};
pub use recall_memory_sql::SqlBackend;
pub use recall_memory_vector::{cosine_similarity, VectorBackend, VectorBackendOptions};
pub use recall_protocols::{
    HybridSearchOptions, Memory, MemoryBackend, MemoryError, MemoryQuery, MemorySearchResult,
    MemoryStats, NamespaceConfig, OrderBy, RetentionPolicy, TimeRange,
};
