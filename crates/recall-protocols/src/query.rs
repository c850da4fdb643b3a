//! Structured query definitions and the filter predicates shared by backends.
//!
//! All fields are optional and AND-combined. Filters are evaluated in a fixed
//! order (agent, type, time range, metadata, tags) and stop at the first miss.

use serde::{Deserialize, Serialize};

use crate::memory::Memory;
use crate::types::{Metadata, Timestamp};

/// Inclusive range over [`Memory::timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Whether `timestamp` falls inside the range, bounds included.
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    /// Newest first.
    #[default]
    Timestamp,
    /// Backend relevance signal; insertion order where a backend has none.
    Relevance,
}

/// Query for filtering memories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,

    /// Every pair must be present and equal in the memory's metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// At least one tag must appear in the memory's tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
}

impl MemoryQuery {
    /// Create an unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one agent.
    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Restrict to one memory type.
    pub fn of_type(mut self, memory_type: impl Into<String>) -> Self {
        self.memory_type = Some(memory_type.into());
        self
    }

    /// Restrict to an inclusive timestamp range.
    pub fn between(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.time_range = Some(TimeRange::new(start, end));
        self
    }

    /// Require every given metadata pair to match.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Require at least one of the given tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Cap the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results after sorting.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the sort order.
    pub fn ordered_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    /// Effective ordering.
    pub fn order(&self) -> OrderBy {
        self.order_by.unwrap_or_default()
    }

    /// Agent, type and time-range filters only.
    pub fn matches_basic(&self, memory: &Memory) -> bool {
        if let Some(agent_id) = &self.agent_id {
            if &memory.agent_id != agent_id {
                return false;
            }
        }
        if let Some(memory_type) = &self.memory_type {
            if &memory.memory_type != memory_type {
                return false;
            }
        }
        if let Some(range) = &self.time_range {
            if !range.contains(memory.timestamp) {
                return false;
            }
        }
        true
    }

    /// Every structured filter, including metadata and tags.
    pub fn matches(&self, memory: &Memory) -> bool {
        if !self.matches_basic(memory) {
            return false;
        }
        if let Some(metadata) = &self.metadata {
            if !metadata_matches(metadata, memory.metadata.as_ref()) {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags_overlap(tags, memory.tags.as_deref()) {
                return false;
            }
        }
        true
    }

    /// Apply `offset` then `limit` to an already filtered and sorted list.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

/// All-match over query pairs. An empty query map matches everything.
pub fn metadata_matches(query: &Metadata, memory: Option<&Metadata>) -> bool {
    if query.is_empty() {
        return true;
    }
    match memory {
        Some(memory) => query
            .iter()
            .all(|(key, value)| memory.get(key) == Some(value)),
        None => false,
    }
}

/// Any-match over query tags. An empty query list matches everything.
pub fn tags_overlap(query: &[String], memory: Option<&[String]>) -> bool {
    if query.is_empty() {
        return true;
    }
    match memory {
        Some(memory) => query.iter().any(|tag| memory.contains(tag)),
        None => false,
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
