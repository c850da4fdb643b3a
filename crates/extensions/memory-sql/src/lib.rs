//! Structured memory backend for Recall.
//!
//! The canonical store: holds every memory, with or without an embedding,
//! and answers AND-combined filter queries. It has no similarity capability,
//! so `vector_search` always returns an empty list.

mod backend;

pub use backend::{SqlBackend, DEFAULT_DB_PATH};
