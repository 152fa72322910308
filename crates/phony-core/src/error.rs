use thiserror::Error;

/// Core error type for phony operations.
#[derive(Error, Debug)]
pub enum PhonyError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Render error: unsupported type category {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PhonyError {
    /// Whether this error came from locating or loading the target interface.
    pub fn is_resolution(&self) -> bool {
        matches!(self, PhonyError::NotFound(_) | PhonyError::Resolution(_))
    }
}

impl From<serde_json::Error> for PhonyError {
    fn from(e: serde_json::Error) -> Self {
        PhonyError::Serialization(e.to_string())
    }
}

/// Result type alias using PhonyError.
pub type Result<T> = std::result::Result<T, PhonyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_classification() {
        assert!(PhonyError::NotFound("Getter".into()).is_resolution());
        assert!(PhonyError::Resolution("bad package".into()).is_resolution());
        assert!(!PhonyError::Render("tuple".into()).is_resolution());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: PhonyError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, PhonyError::Serialization(_)));
    }
}
