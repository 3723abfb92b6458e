//! Error types for the csrgen library.
//!
//! Every stage of CSR generation reports failures through [`CsrError`].
//! Errors carry the kind plus the context a caller needs to fix the input
//! (the offending field name, the requested digest, and so on).

use thiserror::Error;

/// The main error type for CSR generation.
#[derive(Error, Debug)]
pub enum CsrError {
    /// A mandatory identity field is missing, or a field or SAN entry is malformed.
    #[error("Invalid field '{field}': {reason}")]
    InvalidFieldError {
        /// Name of the offending field, e.g. `common_name` or `san_list[2]`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Key generation failed (bad parameters or RNG failure).
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Signing failed: key mismatch or unsupported digest algorithm.
    #[error("Signing error: {0}")]
    SigningError(String),

    /// DER encoding or decoding failed for a structure we produced.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// PEM framing error
    #[error("PEM error: {0}")]
    PemError(String),

    /// Storage I/O error
    #[error("Storage I/O error: {0}")]
    StorageError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CsrError {
    /// Shorthand for an [`CsrError::InvalidFieldError`].
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CsrError::InvalidFieldError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for csrgen operations.
pub type Result<T> = std::result::Result<T, CsrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CsrError::SigningError("test error".to_string());
        assert_eq!(err.to_string(), "Signing error: test error");
    }

    #[test]
    fn test_invalid_field_display_names_field() {
        let err = CsrError::invalid_field("common_name", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid field 'common_name': must not be empty"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CsrError>();
    }
}
