use std::path::PathBuf;

use thiserror::Error;

use billforge_core::DomainError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render invoice: {0}")]
    InvalidDraft(#[from] DomainError),

    #[error("document already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("failed to write document {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
