//! Memory-related configuration types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use recall_protocols::retention::NamespaceConfig;

/// Memory configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub sql: SqlConfig,

    #[serde(default)]
    pub vector: VectorConfig,

    #[serde(default)]
    pub hybrid: HybridConfig,

    #[serde(default)]
    pub namespaces: NamespacesConfig,
}

/// Structured backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlConfig {
    /// Location label reported by the backend.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

/// Vector backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorConfig {
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Accepted for compatibility; search is always exact.
    #[serde(default = "default_hnsw_m")]
    pub hnsw_m: usize,

    /// Accepted for compatibility; search is always exact.
    #[serde(default = "default_ef_construction")]
    pub ef_construction: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            hnsw_m: default_hnsw_m(),
            ef_construction: default_ef_construction(),
        }
    }
}

fn default_dimensions() -> usize {
    384
}

fn default_hnsw_m() -> usize {
    16
}

fn default_ef_construction() -> usize {
    200
}

/// Hybrid search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridConfig {
    /// `k` used when a search does not choose one.
    #[serde(default = "default_k")]
    pub default_k: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self { default_k: default_k() }
    }
}

fn default_k() -> usize {
    10
}

/// Namespace table handed to the namespace manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespacesConfig {
    /// Prefix for keys without an entry.
    #[serde(default = "default_prefix")]
    pub default_prefix: String,

    #[serde(default)]
    pub entries: HashMap<String, NamespaceConfig>,
}

impl Default for NamespacesConfig {
    fn default() -> Self {
        Self {
            default_prefix: default_prefix(),
            entries: HashMap::new(),
        }
    }
}

fn default_prefix() -> String {
    "agent".to_string()
}
