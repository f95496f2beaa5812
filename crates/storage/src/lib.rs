//! Durable state for the billing engine.
//!
//! Every record (numbering state, customer directory, invoice ledger) is one JSON
//! document rewritten whole on each mutation. Writes go through a temporary file
//! and an atomic rename so readers never observe a partial document. Writers
//! serialize on a per-document lock shared by every handle on the same path.

pub mod error;
pub mod file;
pub mod lock;
pub mod memory;
pub mod schema;
pub mod store;

pub use error::StorageError;
pub use file::JsonFileStore;
pub use lock::StoreGuard;
pub use memory::InMemoryStateStore;
pub use schema::{CURRENT_SCHEMA_VERSION, Decoded, PersistedState, SCHEMA_VERSION_KEY};
pub use store::StateStore;
