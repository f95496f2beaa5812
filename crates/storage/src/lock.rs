//! Exclusive write regions over persisted documents.
//!
//! A read-modify-persist sequence holds a [`StoreGuard`] from `load` to `save`.
//! A file-backed guard excludes every handle on the same document: other
//! stores in this process through a registry of held paths, other processes
//! through an advisory lock on a sibling `<file>.lock`.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use fs4::fs_std::FileExt;

use crate::error::StorageError;

/// Held for the duration of one read-modify-persist sequence. Released on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct StoreGuard<'a> {
    held: Held<'a>,
}

enum Held<'a> {
    Memory { _guard: MutexGuard<'a, ()> },
    Path(PathLock),
}

impl<'a> StoreGuard<'a> {
    pub(crate) fn memory(guard: MutexGuard<'a, ()>) -> Self {
        Self {
            held: Held::Memory { _guard: guard },
        }
    }

    /// Block until `path` is exclusively held by the caller.
    pub(crate) fn path(path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            held: Held::Path(PathLock::acquire(path)?),
        })
    }
}

impl std::fmt::Debug for StoreGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.held {
            Held::Memory { .. } => f.write_str("StoreGuard(memory)"),
            Held::Path(lock) => write!(f, "StoreGuard({})", lock.key.display()),
        }
    }
}

type Registry = (Mutex<HashSet<PathBuf>>, Condvar);

fn registry() -> &'static Registry {
    static HELD: OnceLock<Registry> = OnceLock::new();
    HELD.get_or_init(|| (Mutex::new(HashSet::new()), Condvar::new()))
}

struct PathLock {
    key: PathBuf,
    file: Option<File>,
}

impl PathLock {
    fn acquire(path: &Path) -> Result<Self, StorageError> {
        let key = canonical_key(path)?;

        let (held, released) = registry();
        let mut held_paths = held
            .lock()
            .map_err(|_| StorageError::LockPoisoned("store path registry"))?;
        while held_paths.contains(&key) {
            held_paths = released
                .wait(held_paths)
                .map_err(|_| StorageError::LockPoisoned("store path registry"))?;
        }
        held_paths.insert(key.clone());
        drop(held_paths);

        // From here on, Drop gives the registry slot back even on error.
        let mut lock = PathLock { key, file: None };
        let lock_path = lock_file_path(&lock.key);
        let lock_err = |source: io::Error| StorageError::Write {
            path: lock_path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(lock_err)?;
        file.lock_exclusive().map_err(lock_err)?;
        lock.file = Some(file);

        tracing::trace!(path = %lock.key.display(), "store lock acquired");
        Ok(lock)
    }
}

impl Drop for PathLock {
    fn drop(&mut self) {
        // Closing the handle releases the advisory lock.
        drop(self.file.take());

        let (held, released) = registry();
        let mut held_paths = held.lock().unwrap_or_else(PoisonError::into_inner);
        held_paths.remove(&self.key);
        drop(held_paths);
        released.notify_all();
    }
}

/// Same key for every spelling of the path, whether or not the document exists
/// yet. The parent directory is created so it can be canonicalized.
fn canonical_key(path: &Path) -> Result<PathBuf, StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err)?;
    let parent = fs::canonicalize(parent).map_err(write_err)?;
    Ok(match path.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    })
}

fn lock_file_path(key: &Path) -> PathBuf {
    let mut name = key.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    key.with_file_name(name)
}
