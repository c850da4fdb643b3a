//! Namespace-scoped access to a hybrid backend.
//!
//! Namespaces are opaque partition keys written into `Memory::agent_id`. The
//! manager maps caller-chosen keys to [`NamespaceConfig`]s, applies session
//! retention on close and TTL retention on an explicit prune.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use recall_protocols::error::MemoryError;
use recall_protocols::memory::{Memory, MemoryBackend, MemorySearchResult};
use recall_protocols::query::MemoryQuery;
use recall_protocols::retention::{NamespaceConfig, RetentionPolicy};
use recall_protocols::search::{HybridSearchOptions, MemoryStats};
use recall_protocols::types::now_millis;

use crate::backend::HybridBackend;

#[cfg(test)]
#[path = "namespace_tests.rs"]
mod tests;

/// Prefix used for keys without a configured namespace.
pub const DEFAULT_NAMESPACE_PREFIX: &str = "agent";

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change notification published by a [`NamespaceManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryEvent {
    Stored { key: String, memory_id: String },
    Cleared { key: String },
    /// Removed by a TTL prune.
    Expired { key: String, memory_id: String },
}

impl std::fmt::Display for MemoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryEvent::Stored { key, memory_id } => write!(f, "STORED {}/{}", key, memory_id),
            MemoryEvent::Cleared { key } => write!(f, "CLEARED {}", key),
            MemoryEvent::Expired { key, memory_id } => write!(f, "EXPIRED {}/{}", key, memory_id),
        }
    }
}

/// Scoped facade over one [`HybridBackend`].
pub struct NamespaceManager {
    backend: Arc<HybridBackend>,
    configs: HashMap<String, NamespaceConfig>,
    default_prefix: String,
    sender: broadcast::Sender<MemoryEvent>,
}

impl NamespaceManager {
    pub fn new(backend: Arc<HybridBackend>, configs: HashMap<String, NamespaceConfig>) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            configs,
            default_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            sender,
        }
    }

    /// Prefix used for keys without a configured namespace.
    pub fn with_default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = prefix.into();
        self
    }

    /// Get the shared hybrid backend.
    pub fn backend(&self) -> &Arc<HybridBackend> {
        &self.backend
    }

    /// Configuration for `key`, if any.
    pub fn config(&self, key: &str) -> Option<&NamespaceConfig> {
        self.configs.get(key)
    }

    /// All configured namespaces.
    pub fn configs(&self) -> &HashMap<String, NamespaceConfig> {
        &self.configs
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<MemoryEvent> {
        self.sender.subscribe()
    }

    fn emit(&self, event: MemoryEvent) {
        debug!("Memory event: {}", event);
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    /// Namespace for `key`: the configured one, else `<prefix>:<key>`.
    pub fn namespace_for(&self, key: &str) -> String {
        match self.configs.get(key) {
            Some(config) => config.namespace.clone(),
            None => format!("{}:{}", self.default_prefix, key),
        }
    }

    pub async fn initialize(&self) -> Result<(), MemoryError> {
        self.backend.initialize().await?;
        info!(namespaces = self.configs.len(), "Namespace manager initialized");
        Ok(())
    }

    /// Drop session-retained namespaces, then close the backend.
    pub async fn close(&self) -> Result<(), MemoryError> {
        for (key, config) in &self.configs {
            if config.retention == RetentionPolicy::Session {
                self.backend.clear_agent(&config.namespace).await?;
                self.emit(MemoryEvent::Cleared { key: key.clone() });
            }
        }
        self.backend.close().await
    }

    /// Store `memory` under `key`'s namespace, overwriting its `agent_id`.
    pub async fn store_for(&self, key: &str, mut memory: Memory) -> Result<Memory, MemoryError> {
        memory.agent_id = self.namespace_for(key);
        let stored = self.backend.store(memory).await?;
        self.emit(MemoryEvent::Stored {
            key: key.to_string(),
            memory_id: stored.id.clone(),
        });
        Ok(stored)
    }

    pub async fn query_for(&self, key: &str, mut query: MemoryQuery) -> Result<Vec<Memory>, MemoryError> {
        query.agent_id = Some(self.namespace_for(key));
        self.backend.query(query).await
    }

    /// Similarity search restricted to `key`'s namespace.
    pub async fn search_for(
        &self,
        key: &str,
        embedding: Vec<f32>,
        k: usize,
    ) -> Result<Vec<MemorySearchResult>, MemoryError> {
        let options = HybridSearchOptions::new(MemoryQuery::new())
            .with_embedding(embedding)
            .with_k(k);
        self.hybrid_search_for(key, options).await
    }

    pub async fn hybrid_search_for(
        &self,
        key: &str,
        mut options: HybridSearchOptions,
    ) -> Result<Vec<MemorySearchResult>, MemoryError> {
        options.query.agent_id = Some(self.namespace_for(key));
        self.backend.hybrid_search(options).await
    }

    /// Statistics for the namespace behind `key`.
    pub fn stats_for(&self, key: &str) -> MemoryStats {
        let namespace = self.namespace_for(key);
        let mut stats = MemoryStats::default();
        self.backend.sql_backend().scan(|memory| {
            if memory.agent_id == namespace {
                stats.record(&memory.agent_id, &memory.memory_type, memory.has_embedding());
            }
        });
        stats
    }

    /// Stats for every configured key, including empty namespaces.
    pub fn all_stats(&self) -> HashMap<String, MemoryStats> {
        self.configs
            .keys()
            .map(|key| (key.clone(), self.stats_for(key)))
            .collect()
    }

    pub async fn clear(&self, key: &str) -> Result<(), MemoryError> {
        self.backend.clear_agent(&self.namespace_for(key)).await?;
        self.emit(MemoryEvent::Cleared { key: key.to_string() });
        Ok(())
    }

    /// Remove expired memories from every `ttl` namespace.
    pub async fn prune_expired(&self) -> Result<usize, MemoryError> {
        self.prune_expired_at(now_millis()).await
    }

    /// Remove memories from `ttl` namespaces whose age at `now_ms` exceeds
    /// the namespace's TTL. Returns the number removed.
    pub async fn prune_expired_at(&self, now_ms: i64) -> Result<usize, MemoryError> {
        let mut removed = 0;
        for (key, config) in &self.configs {
            let Some(ttl_ms) = config.expiry_ms() else {
                continue;
            };
            let ttl_ms = i64::try_from(ttl_ms).unwrap_or(i64::MAX);

            let expired: Vec<String> = self
                .backend
                .sql_backend()
                .memories_by_agent(&config.namespace)
                .into_iter()
                .filter(|memory| now_ms.saturating_sub(memory.timestamp) > ttl_ms)
                .map(|memory| memory.id)
                .collect();

            for memory_id in expired {
                self.backend.delete(&memory_id).await?;
                removed += 1;
                self.emit(MemoryEvent::Expired {
                    key: key.clone(),
                    memory_id,
                });
            }
        }

        if removed > 0 {
            info!(removed, "Pruned expired memories");
        }
        Ok(removed)
    }
}
