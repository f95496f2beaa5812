//! Numbering authority: the sole issuer of sequential invoice numbers.
//!
//! Persisted state is the only source of truth. Every allocation reads the last
//! issued number, persists `last + 1`, and only then returns it, all under the
//! store's document lock. Every authority opened on the same tracker file shares
//! that lock, so concurrent callers never share a number, and a crash after the
//! persist leaves a gap rather than a reuse.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use billforge_storage::{PersistedState, StateStore, StorageError};

/// Counter value used when nothing has been persisted yet.
pub const DEFAULT_SEED: u64 = 2058;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingState {
    pub last_invoice_number: u64,
}

impl PersistedState for NumberingState {
    const KIND: &'static str = "numbering";

    /// Legacy layout: the same object without a version stamp.
    fn from_legacy(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

pub struct NumberingAuthority<S> {
    store: S,
    seed: u64,
}

impl<S> NumberingAuthority<S>
where
    S: StateStore<NumberingState>,
{
    pub fn new(store: S) -> Self {
        Self::with_seed(store, DEFAULT_SEED)
    }

    pub fn with_seed(store: S, seed: u64) -> Self {
        Self { store, seed }
    }

    fn last_issued_unlocked(&self) -> Result<u64, StorageError> {
        Ok(self
            .store
            .load()?
            .map(|s| s.last_invoice_number)
            .unwrap_or(self.seed))
    }

    /// Last number handed out (the seed if none yet).
    pub fn last_issued(&self) -> Result<u64, StorageError> {
        self.last_issued_unlocked()
    }

    /// Number the next allocation will return, without consuming it.
    pub fn peek_next(&self) -> Result<u64, StorageError> {
        Ok(self.last_issued_unlocked()? + 1)
    }

    /// Allocate the next number. Committed once this returns `Ok`.
    pub fn allocate(&self) -> Result<u64, StorageError> {
        let _guard = self.store.lock()?;

        let current = self.last_issued_unlocked()?;
        let next = current + 1;
        if let Err(e) = self.store.save(&NumberingState {
            last_invoice_number: next,
        }) {
            tracing::error!(number = next, error = %e, "failed to persist invoice number");
            return Err(e);
        }

        tracing::info!(number = next, "invoice number allocated");
        Ok(next)
    }
}
