//! Configuration validation.

use recall_protocols::retention::RetentionPolicy;

use crate::error::ConfigError;
use crate::schema::Config;

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// Dimensions above this are accepted but flagged.
const MAX_RECOMMENDED_DIMENSIONS: usize = 4096;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record a warning.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// All error messages as `path: message`, joined with `; `.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_vector(config, &mut result);
        Self::validate_hybrid(config, &mut result);
        Self::validate_namespaces(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_vector(config: &Config, result: &mut ValidationResult) {
        let vector = &config.memory.vector;

        if vector.dimensions == 0 {
            result.add_error(ValidationError::new(
                "memory.vector.dimensions",
                "dimensions must be greater than 0",
            ));
        } else if vector.dimensions > MAX_RECOMMENDED_DIMENSIONS {
            result.add_warning(ValidationWarning::new(
                "memory.vector.dimensions",
                format!(
                    "dimensions is very high (>{}), brute-force search cost grows linearly with it",
                    MAX_RECOMMENDED_DIMENSIONS
                ),
            ));
        }

        if vector.hnsw_m == 0 {
            result.add_error(ValidationError::new(
                "memory.vector.hnsw_m",
                "hnsw_m must be greater than 0",
            ));
        }

        if vector.ef_construction == 0 {
            result.add_error(ValidationError::new(
                "memory.vector.ef_construction",
                "ef_construction must be greater than 0",
            ));
        } else if vector.ef_construction < vector.hnsw_m {
            result.add_warning(ValidationWarning::new(
                "memory.vector.ef_construction",
                "ef_construction is lower than hnsw_m",
            ));
        }
    }

    fn validate_hybrid(config: &Config, result: &mut ValidationResult) {
        if config.memory.hybrid.default_k == 0 {
            result.add_error(ValidationError::new(
                "memory.hybrid.default_k",
                "default_k must be greater than 0",
            ));
        }
    }

    fn validate_namespaces(config: &Config, result: &mut ValidationResult) {
        for (key, entry) in &config.memory.namespaces.entries {
            let path = format!("memory.namespaces.entries.{}", key);

            if entry.namespace.is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.namespace", path),
                    "namespace cannot be empty",
                ));
            }

            match (entry.retention, entry.ttl_ms) {
                (RetentionPolicy::Ttl, None) | (RetentionPolicy::Ttl, Some(0)) => {
                    result.add_error(ValidationError::new(
                        format!("{}.ttl_ms", path),
                        "ttl retention requires a positive ttl_ms",
                    ));
                }
                (RetentionPolicy::Permanent | RetentionPolicy::Session, Some(_)) => {
                    result.add_warning(ValidationWarning::new(
                        format!("{}.ttl_ms", path),
                        format!("ttl_ms is ignored for {} retention", entry.retention),
                    ));
                }
                _ => {}
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "level cannot be empty",
            ));
        }
    }
}
