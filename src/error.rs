//! Error types for the fang observable engine.
//!
//! The classification and refanging operations are total and never fail;
//! these errors only surface when building an engine from a custom
//! configuration or loading that configuration from disk.

use thiserror::Error;

/// Main error type for fang operations.
#[derive(Debug, Error)]
pub enum FangError {
    /// A configured obfuscation marker cannot be used for rewriting
    #[error("Invalid marker {pattern:?}: {reason}")]
    InvalidMarker { pattern: String, reason: String },

    /// Configuration table is malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Pattern compilation errors
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<regex::Error> for FangError {
    fn from(err: regex::Error) -> Self {
        FangError::Pattern(err.to_string())
    }
}

impl From<aho_corasick::BuildError> for FangError {
    fn from(err: aho_corasick::BuildError) -> Self {
        FangError::Pattern(err.to_string())
    }
}

/// Result type alias for fang operations
pub type Result<T> = std::result::Result<T, FangError>;

/// Convert fang errors to PyO3 exceptions
#[cfg(feature = "python-ext")]
impl From<FangError> for pyo3::PyErr {
    fn from(err: FangError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyException, PyIOError, PyValueError};

        match err {
            FangError::Io(e) => PyIOError::new_err(e.to_string()),
            FangError::InvalidConfig(msg) | FangError::Pattern(msg) => PyValueError::new_err(msg),
            _ => PyException::new_err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FangError::InvalidConfig("empty TLD list".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: empty TLD list");

        let err = FangError::InvalidMarker {
            pattern: "[.]".to_string(),
            reason: "replacement is not shorter than pattern".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid marker \"[.]\": replacement is not shorter than pattern"
        );
    }

    #[test]
    fn test_regex_error_converts() {
        let err: FangError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, FangError::Pattern(_)));
    }

    #[test]
    fn test_json_error_converts() {
        let err: FangError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
