use thiserror::Error;

/// Errors produced by field generation and plate segmentation.
///
/// Exactly two failure kinds exist and they are not interchangeable:
/// `Validation` is the strict ingress gate (itemized, nothing was generated),
/// `Internal` covers malformed payloads and broken invariants discovered
/// mid-pipeline. Sanitization never produces an error at all.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// One or more request parameters violated their documented bounds.
    /// Carries every violation, not just the first.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Unrecoverable condition: malformed encoded field, decode failure,
    /// or an invariant violation. The request is aborted with no partial
    /// result.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GenerationError {
    /// Stable kind tag for transport-layer envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "validation",
            GenerationError::Internal(_) => "internal",
        }
    }

    /// The individual violations behind a validation failure.
    pub fn violations(&self) -> &[String] {
        match self {
            GenerationError::Validation(errors) => errors,
            GenerationError::Internal(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_every_violation() {
        let err = GenerationError::Validation(vec![
            "scale 2 outside valid range [0.001, 0.1]".to_string(),
            "octaves 50 outside valid range [1, 6]".to_string(),
        ]);
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.violations().len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("scale"));
        assert!(msg.contains("octaves"));
    }

    #[test]
    fn internal_kind() {
        let err = GenerationError::Internal("bad payload".to_string());
        assert_eq!(err.kind(), "internal");
        assert!(err.violations().is_empty());
    }
}
