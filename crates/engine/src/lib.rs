//! `billforge-engine`: application layer of the invoice ledger.
//!
//! Wires the numbering authority, customer directory, ledger and renderer
//! together behind [`BillingEngine`], and owns the issuance workflow.

pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod workflow;

pub use config::{ConfigError, EngineConfig};
pub use engine::BillingEngine;
pub use error::BillingError;
pub use session::SessionContext;
pub use workflow::{IssuanceWorkflow, IssuedInvoice};
