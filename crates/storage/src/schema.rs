//! Schema version stamping for persisted documents.
//!
//! Current layout: the state's own JSON object plus a `schema_version` key.
//! Documents without the key are the legacy, unversioned layout and are decoded
//! through [`PersistedState::from_legacy`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Newest layout this build reads and the only one it writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// A whole-document record that can be persisted by a [`crate::StateStore`].
///
/// Implementors must serialize as a JSON object.
pub trait PersistedState: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Document kind used in errors and logs (e.g. `"ledger"`).
    const KIND: &'static str;

    /// Decode the unversioned layout written before stamping was introduced.
    fn from_legacy(value: Value) -> Result<Self, serde_json::Error>;
}

/// Outcome of decoding a persisted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Current(T),
    /// Decoded from the legacy layout; the next save writes the current layout.
    Migrated(T),
}

impl<T> Decoded<T> {
    pub fn into_inner(self) -> T {
        match self {
            Decoded::Current(t) | Decoded::Migrated(t) => t,
        }
    }
}

#[derive(Debug)]
pub(crate) enum DecodeError {
    Json(serde_json::Error),
    Unsupported(u64),
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        DecodeError::Json(value)
    }
}

pub(crate) fn encode<T: PersistedState>(state: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut map = match serde_json::to_value(state)? {
        Value::Object(map) => map,
        _ => {
            return Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "{} state must serialize as a JSON object",
                T::KIND
            )));
        }
    };
    map.insert(
        SCHEMA_VERSION_KEY.to_string(),
        Value::from(CURRENT_SCHEMA_VERSION),
    );
    serde_json::to_vec_pretty(&Value::Object(map))
}

pub(crate) fn decode<T: PersistedState>(bytes: &[u8]) -> Result<Decoded<T>, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    match value {
        Value::Object(mut map) if map.contains_key(SCHEMA_VERSION_KEY) => {
            let stamp = map.remove(SCHEMA_VERSION_KEY);
            let version = stamp.as_ref().and_then(Value::as_u64).ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom(
                    "schema_version must be a non-negative integer",
                )
            })?;
            if version > u64::from(CURRENT_SCHEMA_VERSION) {
                return Err(DecodeError::Unsupported(version));
            }
            Ok(Decoded::Current(from_map(map)?))
        }
        legacy => Ok(Decoded::Migrated(T::from_legacy(legacy)?)),
    }
}

fn from_map<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(map))
}
