//! Configuration-driven assembly of the memory backends.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use recall_config::{Config, ConfigLoader, ConfigValidator};
use recall_memory_hybrid::{HybridBackend, NamespaceManager};
use recall_memory_sql::SqlBackend;
use recall_memory_vector::{VectorBackend, VectorBackendOptions};
use recall_protocols::memory::MemorySearchResult;
use recall_protocols::query::MemoryQuery;
use recall_protocols::search::HybridSearchOptions;

use crate::error::EngineError;

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

/// A hybrid backend and its namespace manager, built from one [`Config`].
pub struct MemoryEngine {
    config: Config,
    backend: Arc<HybridBackend>,
    namespaces: NamespaceManager,
}

impl MemoryEngine {
    /// Validate `config` and build the backends it describes.
    ///
    /// Validation errors abort construction; warnings are logged.
    pub fn from_config(config: Config) -> Result<Self, EngineError> {
        let validation = ConfigValidator::validate(&config)?;
        for warning in &validation.warnings {
            warn!(path = %warning.path, "{}", warning.message);
        }
        if !validation.is_valid() {
            return Err(EngineError::Validation(validation.error_summary()));
        }

        let sql = SqlBackend::new(config.memory.sql.db_path.clone());
        let vector = VectorBackend::new(VectorBackendOptions {
            dimensions: config.memory.vector.dimensions,
            hnsw_m: config.memory.vector.hnsw_m,
            ef_construction: config.memory.vector.ef_construction,
        });
        let backend = Arc::new(HybridBackend::new(sql, vector));

        let namespaces_config = &config.memory.namespaces;
        let namespaces =
            NamespaceManager::new(backend.clone(), namespaces_config.entries.clone())
                .with_default_prefix(namespaces_config.default_prefix.clone());

        Ok(Self {
            config,
            backend,
            namespaces,
        })
    }

    /// Parse TOML (with `${VAR}` expansion) and build.
    pub fn from_toml(content: &str) -> Result<Self, EngineError> {
        Self::from_config(ConfigLoader::load_str(content)?)
    }

    /// Load a TOML file and build.
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        Self::from_config(ConfigLoader::load(path)?)
    }

    pub async fn initialize(&self) -> Result<(), EngineError> {
        self.namespaces.initialize().await?;
        info!(
            db_path = %self.config.memory.sql.db_path,
            dimensions = self.config.memory.vector.dimensions,
            "Memory engine started"
        );
        Ok(())
    }

    /// Apply session retention and release all data.
    pub async fn close(&self) -> Result<(), EngineError> {
        self.namespaces.close().await?;
        info!("Memory engine stopped");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &Arc<HybridBackend> {
        &self.backend
    }

    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }

    /// Hybrid search options using the configured default `k`.
    pub fn search_options(&self, query: MemoryQuery) -> HybridSearchOptions {
        HybridSearchOptions::new(query).with_k(self.config.memory.hybrid.default_k)
    }

    /// Hybrid search with the configured default `k`.
    pub async fn search(
        &self,
        query: MemoryQuery,
        embedding: Option<Vec<f32>>,
    ) -> Result<Vec<MemorySearchResult>, EngineError> {
        let mut options = self.search_options(query);
        options.embedding = embedding;
        Ok(self.backend.hybrid_search(options).await?)
    }
}
