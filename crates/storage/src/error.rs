use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Durable state could not be read or written.
///
/// Always fatal to the current operation; nothing here retries.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid {kind} document: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has schema version {found}; newest supported is {supported}", path.display())]
    UnsupportedSchema {
        path: PathBuf,
        found: u64,
        supported: u32,
    },

    #[error("failed to encode {kind} document: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    /// Injected by [`crate::InMemoryStateStore`] to exercise failure paths.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
