use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::lock::StoreGuard;
use crate::schema::{self, CURRENT_SCHEMA_VERSION, DecodeError, Decoded, PersistedState};
use crate::store::StateStore;

/// JSON document on the local filesystem.
///
/// Saves write a sibling temporary file, fsync it and rename it over the target.
#[derive(Debug)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _state: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _state: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn write_err(&self, source: io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl<T: PersistedState> StateStore<T> for JsonFileStore<T> {
    fn load(&self) -> Result<Option<T>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), kind = T::KIND, "no persisted state yet");
                return Ok(None);
            }
            Err(source) => {
                tracing::error!(path = %self.path.display(), error = %source, "state read failed");
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match schema::decode::<T>(&bytes) {
            Ok(Decoded::Current(state)) => Ok(Some(state)),
            Ok(Decoded::Migrated(state)) => {
                tracing::info!(
                    path = %self.path.display(),
                    kind = T::KIND,
                    to_version = CURRENT_SCHEMA_VERSION,
                    "read legacy unversioned document; next save upgrades it"
                );
                Ok(Some(state))
            }
            Err(DecodeError::Json(source)) => Err(StorageError::Corrupt {
                path: self.path.clone(),
                kind: T::KIND,
                source,
            }),
            Err(DecodeError::Unsupported(found)) => Err(StorageError::UnsupportedSchema {
                path: self.path.clone(),
                found,
                supported: CURRENT_SCHEMA_VERSION,
            }),
        }
    }

    fn save(&self, state: &T) -> Result<(), StorageError> {
        let bytes = schema::encode(state).map_err(|source| StorageError::Encode {
            kind: T::KIND,
            source,
        })?;

        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|e| self.write_err(e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.write_err(e))?;
        tmp.write_all(&bytes).map_err(|e| self.write_err(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_err(e.error))?;

        tracing::debug!(path = %self.path.display(), kind = T::KIND, bytes = bytes.len(), "state persisted");
        Ok(())
    }

    fn lock(&self) -> Result<StoreGuard<'_>, StorageError> {
        StoreGuard::path(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Names {
        names: Vec<String>,
    }

    impl PersistedState for Names {
        const KIND: &'static str = "names";

        fn from_legacy(value: Value) -> Result<Self, serde_json::Error> {
            Ok(Names {
                names: serde_json::from_value(value)?,
            })
        }
    }

    fn names(list: &[&str]) -> Names {
        Names {
            names: list.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Names> = JsonFileStore::new(dir.path().join("names.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_round_trips_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("names.json");
        let store = JsonFileStore::new(&path);

        store.save(&names(&["asha", "ravi"])).unwrap();
        assert_eq!(store.load().unwrap(), Some(names(&["asha", "ravi"])));

        store.save(&names(&["ravi"])).unwrap();
        assert_eq!(store.load().unwrap(), Some(names(&["ravi"])));

        let raw: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["schema_version"], 1);
    }

    #[test]
    fn legacy_file_is_read_and_upgraded_on_next_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");
        fs::write(&path, r#"["asha"]"#).unwrap();

        let store = JsonFileStore::<Names>::new(&path);
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, names(&["asha"]));

        store.save(&loaded).unwrap();
        let raw: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["schema_version"], 1);
        assert_eq!(raw["names"][0], "asha");
    }

    #[test]
    fn corrupt_and_future_documents_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");
        let store = JsonFileStore::<Names>::new(&path);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(store.load(), Err(StorageError::Corrupt { kind: "names", .. })));

        fs::write(&path, r#"{"schema_version": 2, "names": []}"#).unwrap();
        assert!(matches!(
            store.load(),
            Err(StorageError::UnsupportedSchema { found: 2, supported: 1, .. })
        ));
    }

    #[test]
    fn unwritable_location_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = JsonFileStore::<Names>::new(blocker.join("names.json"));
        assert!(matches!(store.save(&names(&[])), Err(StorageError::Write { .. })));
    }
}
