//! Invoice document rendering.
//!
//! Lays an [`InvoiceDraft`](billforge_invoicing::InvoiceDraft) out on A4 pages
//! and serializes it as a PDF using the standard Helvetica faces, so no font
//! files are embedded.

mod canvas;
pub mod document;
pub mod error;
pub mod line_items;
pub mod logo;
pub mod metrics;
mod pdf;

pub use document::{DocumentRenderer, RenderWarning, RenderedDocument, SupplierProfile};
pub use error::RenderError;
pub use line_items::{LineItem, RowKind, line_items};
pub use logo::Logo;
pub use metrics::Font;
