//! Vector memory backend for Recall.
//!
//! Holds only memories that carry an embedding and ranks them by cosine
//! similarity with an exact, brute-force scan. Storing a memory without an
//! embedding is a contract violation and fails with
//! [`MemoryError::MissingEmbedding`](recall_protocols::MemoryError::MissingEmbedding).

mod backend;
mod index;
mod options;
mod similarity;

pub use backend::VectorBackend;
pub use index::{IndexHit, VectorIndex};
pub use options::VectorBackendOptions;
pub use similarity::cosine_similarity;
