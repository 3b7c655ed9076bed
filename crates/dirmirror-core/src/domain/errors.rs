//! Domain error types
//!
//! This module defines error types raised while building or parsing domain
//! values, as opposed to filesystem failures which belong to the adapters.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Unknown logging detail level
    #[error("Invalid log detail: {0} (expected 'coarse' or 'fine')")]
    InvalidDetail(String),

    /// Entry name that cannot live inside a single directory
    #[error("Invalid entry name: {0}")]
    InvalidEntryName(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidDetail("loud".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid log detail: loud (expected 'coarse' or 'fine')"
        );

        let err = DomainError::InvalidEntryName("a/b".to_string());
        assert_eq!(err.to_string(), "Invalid entry name: a/b");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::ValidationFailed("x".to_string());
        let err2 = DomainError::ValidationFailed("x".to_string());
        let err3 = DomainError::ValidationFailed("y".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
