use std::sync::Arc;

use billforge_core::{Clock, CustomerId, SystemClock};
use billforge_customers::{Customer, CustomerBook, CustomerDirectory};
use billforge_invoicing::{
    CustomerSnapshot, InvoiceDraft, InvoiceLedger, InvoiceNumberFormat, LedgerBook, LedgerEntry,
    LedgerFilter, LedgerSummary, NumberingAuthority, NumberingState, PaymentStatus,
};
use billforge_render::DocumentRenderer;
use billforge_storage::{JsonFileStore, StateStore};

use crate::config::EngineConfig;
use crate::error::BillingError;
use crate::session::SessionContext;
use crate::workflow::{IssuanceWorkflow, IssuedInvoice};

/// The single façade presentation code talks to.
///
/// Store types default to the JSON files under the configured data directory;
/// tests substitute in-memory stores through [`BillingEngine::from_parts`].
pub struct BillingEngine<
    N = JsonFileStore<NumberingState>,
    C = JsonFileStore<CustomerBook>,
    L = JsonFileStore<LedgerBook>,
> {
    numbering: NumberingAuthority<N>,
    customers: CustomerDirectory<C>,
    ledger: InvoiceLedger<L>,
    renderer: DocumentRenderer,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl BillingEngine {
    pub fn open(config: &EngineConfig) -> Self {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    pub fn open_with_clock(config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        tracing::info!(
            data_dir = %config.data_dir.display(),
            output_dir = %config.output_dir.display(),
            "opening billing engine"
        );
        Self::from_parts(
            config.clone(),
            JsonFileStore::new(config.tracker_path()),
            JsonFileStore::new(config.customers_path()),
            JsonFileStore::new(config.ledger_path()),
            clock,
        )
    }
}

impl<N, C, L> BillingEngine<N, C, L>
where
    N: StateStore<NumberingState>,
    C: StateStore<CustomerBook>,
    L: StateStore<LedgerBook>,
{
    pub fn from_parts(
        config: EngineConfig,
        numbering: N,
        customers: C,
        ledger: L,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let renderer = DocumentRenderer::new(config.supplier.clone(), config.tax_rate);
        let renderer = match &config.logo_path {
            Some(path) => renderer.with_logo(path),
            None => renderer,
        };
        Self {
            numbering: NumberingAuthority::with_seed(numbering, config.number_seed),
            customers: CustomerDirectory::new(customers, clock.clone()),
            ledger: InvoiceLedger::new(ledger, clock.clone()),
            renderer,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn number_format(&self) -> &InvoiceNumberFormat {
        &self.config.number_format
    }

    pub fn workflow(&self) -> IssuanceWorkflow<'_, N, L> {
        IssuanceWorkflow::new(
            &self.numbering,
            &self.ledger,
            &self.renderer,
            &self.config.number_format,
            &self.config.output_dir,
            self.clock.as_ref(),
        )
    }

    pub fn issue(
        &self,
        session: &SessionContext,
        draft: &InvoiceDraft,
    ) -> Result<IssuedInvoice, BillingError> {
        self.workflow().issue(session, draft)
    }

    /// Formatted number the next issuance will receive, for form pre-fill.
    /// Nothing is consumed.
    pub fn peek_next_number(&self) -> Result<String, BillingError> {
        let next = self.numbering.peek_next()?;
        Ok(self.config.number_format.format(next))
    }

    pub fn update_status(
        &self,
        session: &SessionContext,
        invoice_num: &str,
        status: PaymentStatus,
        payment_method: Option<&str>,
    ) -> Result<LedgerEntry, BillingError> {
        let span = session.span();
        let _entered = span.enter();
        Ok(self
            .ledger
            .update_status(invoice_num, status, payment_method)?)
    }

    pub fn query(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, BillingError> {
        Ok(self.ledger.query(filter)?)
    }

    pub fn summary(&self, filter: &LedgerFilter) -> Result<LedgerSummary, BillingError> {
        Ok(self.ledger.summary(filter)?)
    }

    pub fn find_invoice(&self, invoice_num: &str) -> Result<Option<LedgerEntry>, BillingError> {
        Ok(self.ledger.find_by_number(invoice_num)?)
    }

    pub fn upsert_customer(
        &self,
        session: &SessionContext,
        customer: Customer,
    ) -> Result<Customer, BillingError> {
        let span = session.span();
        let _entered = span.enter();
        Ok(self.customers.upsert(customer)?)
    }

    pub fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>, BillingError> {
        Ok(self.customers.find_by_id(id)?)
    }

    pub fn list_customers(&self) -> Result<Vec<Customer>, BillingError> {
        Ok(self.customers.list()?)
    }

    pub fn search_customers(&self, text: &str) -> Result<Vec<Customer>, BillingError> {
        Ok(self.customers.search(text)?)
    }

    /// Delete a customer. Issued invoices referencing it are left untouched.
    pub fn remove_customer(
        &self,
        session: &SessionContext,
        id: &CustomerId,
    ) -> Result<bool, BillingError> {
        let span = session.span();
        let _entered = span.enter();
        Ok(self.customers.remove(id)?)
    }

    /// Customer fields an invoice draft copies, for pre-filling a form.
    pub fn customer_snapshot(&self, id: &CustomerId) -> Result<CustomerSnapshot, BillingError> {
        self.customers
            .find_by_id(id)?
            .map(|c| CustomerSnapshot::from(&c))
            .ok_or_else(|| BillingError::NotFound(format!("customer {id}")))
    }
}
