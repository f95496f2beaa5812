//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lookups, key conflicts). Storage and rendering failures belong to their crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad or missing input; the caller can fix it and resubmit.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. blank or unparsable).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A ledger entry with the same document filename already exists.
    #[error("duplicate document filename: {0}")]
    DuplicateFilename(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn duplicate_filename(filename: impl Into<String>) -> Self {
        Self::DuplicateFilename(filename.into())
    }

    /// Reject a blank (empty or whitespace-only) required field.
    pub fn require(field: &str, value: &str) -> DomainResult<()> {
        if value.trim().is_empty() {
            Err(Self::validation(format!("{field} is required")))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_whitespace_only_values() {
        let err = DomainError::require("Tenant Name", "   ").unwrap_err();
        assert_eq!(err, DomainError::Validation("Tenant Name is required".into()));
        assert!(DomainError::require("Tenant Name", "Block C").is_ok());
    }
}
