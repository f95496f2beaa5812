use thiserror::Error;

use billforge_core::DomainError;
use billforge_customers::DirectoryError;
use billforge_invoicing::LedgerError;
use billforge_render::RenderError;
use billforge_storage::StorageError;

/// Failure of an engine operation, as presented to callers.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Input rejected before anything was persisted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Durable state could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StorageError),

    /// A document or ledger entry with this filename already exists.
    #[error("an invoice document named {0} already exists")]
    DuplicateFilename(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The document could not be produced or written. When this happens during
    /// issuance the allocated number stays consumed.
    #[error("render failed: {0}")]
    Render(#[source] RenderError),
}

impl From<DomainError> for BillingError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                BillingError::Validation(msg)
            }
            DomainError::NotFound(what) => BillingError::NotFound(what),
            DomainError::DuplicateFilename(name) => BillingError::DuplicateFilename(name),
        }
    }
}

impl From<StorageError> for BillingError {
    fn from(value: StorageError) -> Self {
        BillingError::StorageUnavailable(value)
    }
}

impl From<DirectoryError> for BillingError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::Domain(e) => e.into(),
            DirectoryError::Storage(e) => e.into(),
        }
    }
}

impl From<LedgerError> for BillingError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::Domain(e) => e.into(),
            LedgerError::Storage(e) => e.into(),
        }
    }
}

impl From<RenderError> for BillingError {
    fn from(value: RenderError) -> Self {
        match value {
            RenderError::InvalidDraft(e) => e.into(),
            RenderError::AlreadyExists(path) => BillingError::DuplicateFilename(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            ),
            other => BillingError::Render(other),
        }
    }
}
