//! Customer directory.
//!
//! Master records of subscribed customers, keyed by operator-assigned id and
//! persisted as one document in insertion order.

pub mod customer;
pub mod directory;
pub mod field;

pub use customer::Customer;
pub use directory::{CustomerBook, CustomerDirectory, DirectoryError};
pub use field::CustomerField;
