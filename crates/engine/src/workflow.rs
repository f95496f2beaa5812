//! Invoice issuance pipeline.
//!
//! The workflow is the only caller of [`NumberingAuthority::allocate`]. It
//! composes the numbering authority, the ledger and the renderer into one
//! ordered sequence:
//!
//! ```text
//! InvoiceDraft
//!   ↓
//! 1. Validate the draft and pre-check the document filename (read-only)
//!   ↓
//! 2. Allocate the next invoice number (persisted before it is returned)
//!   ↓
//! 3. Render the document and write it to the output directory
//!   ↓
//! 4. Append the ledger entry
//! ```
//!
//! ## Failure semantics
//!
//! - A failure in step 1 happens before allocation, so no number is consumed.
//! - A failure in step 3 or 4 leaves the number consumed. The counter never
//!   goes backwards; the gap is logged with the number that was lost.
//! - Rendering holds no lock. Steps 2 and 4 serialize on the document locks of
//!   the tracker file and the ledger file, shared by every engine opened on the
//!   same data directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

use billforge_core::Clock;
use billforge_invoicing::{
    InvoiceDraft, InvoiceLedger, InvoiceNumberFormat, LedgerBook, LedgerEntry, NumberingAuthority,
    NumberingState,
};
use billforge_render::{DocumentRenderer, RenderWarning};
use billforge_storage::StateStore;

use crate::error::BillingError;
use crate::session::SessionContext;

/// Result of a successful issuance.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedInvoice {
    pub number: u64,
    pub formatted_number: String,
    pub filename: String,
    pub path: PathBuf,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub entry: LedgerEntry,
    /// Degraded-render conditions, e.g. a missing logo.
    pub warnings: Vec<RenderWarning>,
}

pub struct IssuanceWorkflow<'a, N, L> {
    numbering: &'a NumberingAuthority<N>,
    ledger: &'a InvoiceLedger<L>,
    renderer: &'a DocumentRenderer,
    format: &'a InvoiceNumberFormat,
    output_dir: &'a Path,
    clock: &'a dyn Clock,
}

impl<'a, N, L> IssuanceWorkflow<'a, N, L>
where
    N: StateStore<NumberingState>,
    L: StateStore<LedgerBook>,
{
    pub fn new(
        numbering: &'a NumberingAuthority<N>,
        ledger: &'a InvoiceLedger<L>,
        renderer: &'a DocumentRenderer,
        format: &'a InvoiceNumberFormat,
        output_dir: &'a Path,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            numbering,
            ledger,
            renderer,
            format,
            output_dir,
            clock,
        }
    }

    pub fn issue(
        &self,
        session: &SessionContext,
        draft: &InvoiceDraft,
    ) -> Result<IssuedInvoice, BillingError> {
        let span = session.span();
        let _entered = span.enter();

        draft.validate()?;
        let issued_at = self.clock.now();
        let filename = draft.document_filename(issued_at);
        self.precheck_filename(&filename)?;

        let number = self.numbering.allocate()?;
        let formatted_number = self.format.format(number);

        self.finish(draft, number, formatted_number, filename, issued_at)
            .inspect_err(|e| {
                tracing::error!(
                    number,
                    error = %e,
                    "issuance failed after allocation; invoice number stays consumed"
                );
            })
    }

    fn precheck_filename(&self, filename: &str) -> Result<(), BillingError> {
        if self.ledger.contains_filename(filename)? || self.output_dir.join(filename).exists() {
            tracing::debug!(filename, "document filename already taken");
            return Err(BillingError::DuplicateFilename(filename.to_string()));
        }
        Ok(())
    }

    fn finish(
        &self,
        draft: &InvoiceDraft,
        number: u64,
        formatted_number: String,
        filename: String,
        issued_at: NaiveDateTime,
    ) -> Result<IssuedInvoice, BillingError> {
        let document = self
            .renderer
            .render(draft, &formatted_number, issued_at.date())?;
        let path = document.write_to(self.output_dir, &filename)?;

        let entry = LedgerEntry::issued(&filename, &formatted_number, issued_at, draft);
        self.ledger.append(entry.clone())?;

        tracing::info!(
            invoice_num = %formatted_number,
            customer_id = %draft.customer.customer_id,
            status = %draft.payment_status,
            path = %path.display(),
            "invoice issued"
        );
        Ok(IssuedInvoice {
            number,
            formatted_number,
            filename,
            path,
            bytes: document.bytes,
            page_count: document.page_count,
            entry,
            warnings: document.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use billforge_core::{CustomerId, FixedClock, TaxRate};
    use billforge_invoicing::{BillingPeriod, CustomerSnapshot, LedgerFilter, PaymentStatus};
    use billforge_render::SupplierProfile;
    use billforge_storage::InMemoryStateStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    struct Fixture {
        numbering: NumberingAuthority<Arc<InMemoryStateStore<NumberingState>>>,
        numbering_store: Arc<InMemoryStateStore<NumberingState>>,
        ledger: InvoiceLedger<Arc<InMemoryStateStore<LedgerBook>>>,
        ledger_store: Arc<InMemoryStateStore<LedgerBook>>,
        renderer: DocumentRenderer,
        format: InvoiceNumberFormat,
        clock: Arc<FixedClock>,
        out: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = Arc::new(FixedClock::new(
                NaiveDate::from_ymd_opt(2025, 6, 3)
                    .unwrap()
                    .and_hms_opt(10, 15, 0)
                    .unwrap(),
            ));
            let numbering_store = Arc::new(InMemoryStateStore::new());
            let ledger_store = Arc::new(InMemoryStateStore::new());
            Self {
                numbering: NumberingAuthority::new(numbering_store.clone()),
                numbering_store,
                ledger: InvoiceLedger::new(ledger_store.clone(), clock.clone()),
                ledger_store,
                renderer: DocumentRenderer::new(
                    SupplierProfile::default(),
                    TaxRate::new(dec!(0.09)).unwrap(),
                ),
                format: InvoiceNumberFormat::default(),
                clock,
                out: tempfile::tempdir().unwrap(),
            }
        }

        fn workflow(
            &self,
        ) -> IssuanceWorkflow<
            '_,
            Arc<InMemoryStateStore<NumberingState>>,
            Arc<InMemoryStateStore<LedgerBook>>,
        > {
            IssuanceWorkflow::new(
                &self.numbering,
                &self.ledger,
                &self.renderer,
                &self.format,
                self.out.path(),
                self.clock.as_ref(),
            )
        }
    }

    fn draft() -> InvoiceDraft {
        InvoiceDraft {
            customer: CustomerSnapshot {
                customer_id: CustomerId::new("TF0042").unwrap(),
                name: "Asha Verma".into(),
                tenant_name: "Asha Verma".into(),
                address: "H.No 12, Sector 21, Faridabad".into(),
                gstin: String::new(),
                email: String::new(),
            },
            plan: "100 MBPS UNL".into(),
            months: 1,
            period: BillingPeriod::new(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            ),
            gross: dec!(1180),
            discount: None,
            late_fee: None,
            notes: String::new(),
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
        }
    }

    #[test]
    fn issues_in_order_and_records_the_entry() {
        let fx = Fixture::new();
        let session = SessionContext::new("admin");

        let issued = fx.workflow().issue(&session, &draft()).unwrap();

        assert_eq!(issued.number, 2059);
        assert_eq!(issued.formatted_number, "TF/25-26/HR/2059");
        assert_eq!(issued.filename, "Asha_Verma_Jun_2025.pdf");
        assert!(issued.path.exists());
        assert!(issued.bytes.starts_with(b"%PDF"));
        assert_eq!(issued.entry.status, PaymentStatus::Unpaid);

        let entries = fx.ledger.query(&LedgerFilter::all()).unwrap();
        assert_eq!(entries, vec![issued.entry]);
    }

    #[test]
    fn invalid_draft_consumes_no_number() {
        let fx = Fixture::new();
        let mut bad = draft();
        bad.payment_status = PaymentStatus::Paid;

        let err = fx
            .workflow()
            .issue(&SessionContext::new("admin"), &bad)
            .unwrap_err();

        assert!(matches!(err, BillingError::Validation(_)));
        assert_eq!(fx.numbering.peek_next().unwrap(), 2059);
    }

    #[test]
    fn duplicate_filename_is_rejected_before_allocation() {
        let fx = Fixture::new();
        let session = SessionContext::new("admin");
        fx.workflow().issue(&session, &draft()).unwrap();

        let err = fx.workflow().issue(&session, &draft()).unwrap_err();

        assert!(matches!(err, BillingError::DuplicateFilename(ref n) if n == "Asha_Verma_Jun_2025.pdf"));
        assert_eq!(fx.numbering.peek_next().unwrap(), 2060);
    }

    #[test]
    fn stray_document_on_disk_also_blocks_issuance() {
        let fx = Fixture::new();
        std::fs::write(fx.out.path().join("Asha_Verma_Jun_2025.pdf"), b"old").unwrap();

        let err = fx
            .workflow()
            .issue(&SessionContext::new("admin"), &draft())
            .unwrap_err();

        assert!(matches!(err, BillingError::DuplicateFilename(_)));
        assert_eq!(fx.numbering.last_issued().unwrap(), 2058);
    }

    #[test]
    fn ledger_failure_leaves_the_number_consumed() {
        let fx = Fixture::new();
        fx.ledger_store.fail_writes(true);

        let err = fx
            .workflow()
            .issue(&SessionContext::new("admin"), &draft())
            .unwrap_err();

        assert!(matches!(err, BillingError::StorageUnavailable(_)));
        assert_eq!(fx.numbering.last_issued().unwrap(), 2059);
        assert!(fx.out.path().join("Asha_Verma_Jun_2025.pdf").exists());
    }

    #[test]
    fn counter_failure_stops_before_rendering() {
        let fx = Fixture::new();
        fx.numbering_store.fail_writes(true);

        let err = fx
            .workflow()
            .issue(&SessionContext::new("admin"), &draft())
            .unwrap_err();

        assert!(matches!(err, BillingError::StorageUnavailable(_)));
        assert!(!fx.out.path().join("Asha_Verma_Jun_2025.pdf").exists());
        assert!(fx.ledger.query(&LedgerFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn next_month_gets_its_own_document() {
        let fx = Fixture::new();
        let session = SessionContext::new("admin");
        fx.workflow().issue(&session, &draft()).unwrap();

        fx.clock.set(
            NaiveDate::from_ymd_opt(2025, 7, 2)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        let issued = fx.workflow().issue(&session, &draft()).unwrap();

        assert_eq!(issued.filename, "Asha_Verma_Jul_2025.pdf");
        assert_eq!(issued.formatted_number, "TF/25-26/HR/2060");
    }
}
