//! Engine errors.

use thiserror::Error;

use recall_config::ConfigError;
use recall_protocols::MemoryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_memory_error() {
        let err = EngineError::from(MemoryError::MissingEmbedding("m1".to_string()));
        assert!(matches!(err, EngineError::Memory(_)));
        assert!(err.to_string().contains("requires an embedding"));
    }

    #[test]
    fn test_from_config_error() {
        let err = EngineError::from(ConfigError::EnvVarNotSet("X".to_string()));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_validation_display() {
        let err = EngineError::Validation("memory.hybrid.default_k: must be positive".to_string());
        assert!(err.to_string().contains("default_k"));
    }
}
