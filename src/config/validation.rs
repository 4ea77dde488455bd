//! Configuration validation logic.

use crate::config::schema::ProxyConfig;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation error: {}", self.0)
    }
}

/// Validate a ProxyConfig for semantic correctness.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // 1. The worker pool and its hand-off queue must be able to make progress
    if config.workers.count == 0 {
        errors.push(ValidationError("workers.count must be > 0".to_string()));
    }
    if config.workers.queue_depth == 0 {
        errors.push(ValidationError(
            "workers.queue_depth must be > 0".to_string(),
        ));
    }

    // 2. Cache bounds must be coherent
    if config.cache.max_object_bytes > config.cache.max_total_bytes {
        errors.push(ValidationError(format!(
            "cache.max_object_bytes ({}) exceeds cache.max_total_bytes ({})",
            config.cache.max_object_bytes, config.cache.max_total_bytes
        )));
    }

    // 3. Line bound must admit at least a request line
    if config.upstream.max_line_bytes == 0 {
        errors.push(ValidationError(
            "upstream.max_line_bytes must be > 0".to_string(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
