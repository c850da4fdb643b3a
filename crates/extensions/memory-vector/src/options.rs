//! Vector backend options.

use serde::{Deserialize, Serialize};

/// Options accepted by [`VectorBackend`](crate::VectorBackend).
///
/// `hnsw_m` and `ef_construction` describe an approximate index but search
/// is always exact; they are exposed through accessors only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorBackendOptions {
    /// Expected embedding dimension.
    pub dimensions: usize,
    /// Graph degree.
    pub hnsw_m: usize,
    /// Construction breadth.
    pub ef_construction: usize,
}

impl Default for VectorBackendOptions {
    fn default() -> Self {
        Self {
            dimensions: 384,
            hnsw_m: 16,
            ef_construction: 200,
        }
    }
}

impl VectorBackendOptions {
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Set the graph degree.
    pub fn with_hnsw_m(mut self, hnsw_m: usize) -> Self {
        self.hnsw_m = hnsw_m;
        self
    }

    /// Set the build-time candidate list size.
    pub fn with_ef_construction(mut self, ef_construction: usize) -> Self {
        self.ef_construction = ef_construction;
        self
    }
}
