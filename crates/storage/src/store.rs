use std::sync::Arc;

use crate::error::StorageError;
use crate::lock::StoreGuard;

/// Whole-document durable store for a single state record.
///
/// `load` returns `None` when nothing has been persisted yet. `save` must be
/// durable and atomic by the time it returns: a concurrent `load` observes either
/// the previous document or the new one, never a mix.
pub trait StateStore<T>: Send + Sync {
    fn load(&self) -> Result<Option<T>, StorageError>;
    fn save(&self, state: &T) -> Result<(), StorageError>;

    /// Exclusive region over the underlying document, held from `load` to
    /// `save` by every read-modify-persist sequence. Two handles on the same
    /// document wait for each other.
    fn lock(&self) -> Result<StoreGuard<'_>, StorageError>;
}

impl<T, S> StateStore<T> for Arc<S>
where
    S: StateStore<T> + ?Sized,
{
    fn load(&self) -> Result<Option<T>, StorageError> {
        (**self).load()
    }

    fn save(&self, state: &T) -> Result<(), StorageError> {
        (**self).save(state)
    }

    fn lock(&self) -> Result<StoreGuard<'_>, StorageError> {
        (**self).lock()
    }
}
