//! Invoicing domain module.
//!
//! The numbering authority, the invoice draft handed to the renderer, and the
//! append-only invoice ledger with payment-status reconciliation.

pub mod draft;
pub mod ledger;
pub mod number;
pub mod numbering;
pub mod status;

pub use draft::{BillingPeriod, CustomerSnapshot, InvoiceDraft};
pub use ledger::{
    InvoiceLedger, LedgerBook, LedgerEntry, LedgerError, LedgerField, LedgerFilter, LedgerSummary,
};
pub use number::InvoiceNumberFormat;
pub use numbering::{DEFAULT_SEED, NumberingAuthority, NumberingState};
pub use status::PaymentStatus;
