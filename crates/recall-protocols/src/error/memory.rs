//! Memory backend errors.

use thiserror::Error;

/// Errors returned by memory backends.
///
/// Missing records are not errors: `retrieve` yields `None` and
/// `update`/`delete` are no-ops.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// A vector-backed store was handed a record without a usable embedding.
    #[error("Memory {0} requires an embedding for vector storage")]
    MissingEmbedding(String),
}

impl MemoryError {
    /// Whether this error is the missing-embedding contract violation.
    pub fn is_missing_embedding(&self) -> bool {
        matches!(self, MemoryError::MissingEmbedding(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_embedding_error() {
        let err = MemoryError::MissingEmbedding("mem-1".to_string());
        let display = err.to_string();
        assert!(display.contains("requires an embedding"));
        assert!(display.contains("mem-1"));
        assert!(err.is_missing_embedding());
    }

    #[test]
    fn test_error_debug() {
        let err = MemoryError::MissingEmbedding("test".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("MissingEmbedding"));
    }
}
