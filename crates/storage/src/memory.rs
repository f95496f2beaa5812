use std::sync::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::StorageError;
use crate::lock::StoreGuard;
use crate::store::StateStore;

/// In-memory store for tests/dev.
///
/// Writes can be switched off with [`InMemoryStateStore::fail_writes`] to exercise
/// the storage-unavailable paths of callers.
#[derive(Debug)]
pub struct InMemoryStateStore<T> {
    inner: RwLock<Option<T>>,
    write_lock: Mutex<()>,
    fail_writes: AtomicBool,
}

impl<T> InMemoryStateStore<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
            write_lock: Mutex::new(()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn with_state(state: T) -> Self {
        Self {
            inner: RwLock::new(Some(state)),
            write_lock: Mutex::new(()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl<T> Default for InMemoryStateStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateStore<T> for InMemoryStateStore<T>
where
    T: Clone + Send + Sync,
{
    fn load(&self) -> Result<Option<T>, StorageError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StorageError::LockPoisoned("in-memory store"))?;
        Ok(guard.clone())
    }

    fn save(&self, state: &T) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StorageError::LockPoisoned("in-memory store"))?;
        *guard = Some(state.clone());
        Ok(())
    }

    fn lock(&self) -> Result<StoreGuard<'_>, StorageError> {
        self.write_lock
            .lock()
            .map(StoreGuard::memory)
            .map_err(|_| StorageError::LockPoisoned("in-memory store"))
    }
}
