//! `billforge-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, identifiers, the clock seam and the amount calculator.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod timefmt;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::{Entity, position_of};
pub use error::{DomainError, DomainResult};
pub use id::CustomerId;
pub use money::{InvoiceTotals, TaxRate, TaxSplit, round_money, split};
