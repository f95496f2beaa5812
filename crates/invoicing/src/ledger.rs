//! Append-only ledger of issued invoices.
//!
//! Entries are keyed by the rendered document filename. Only the payment fields
//! change after append, and only through [`InvoiceLedger::update_status`].

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use billforge_core::timefmt::{self, datetime, opt_date};
use billforge_core::{Clock, CustomerId, DomainError, Entity, position_of};
use billforge_storage::{PersistedState, StateStore, StorageError};

use crate::draft::InvoiceDraft;
use crate::status::PaymentStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub filename: String,
    #[serde(rename = "datetime", with = "datetime")]
    pub issued_at: NaiveDateTime,
    pub invoice_num: String,
    pub customer_name: String,
    pub customer_id: CustomerId,
    /// Gross amount of the invoice.
    pub amount: Decimal,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default, with = "opt_date")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: String,
}

impl LedgerEntry {
    /// Entry recorded when `draft` is issued as `invoice_num` into `filename`.
    pub fn issued(
        filename: impl Into<String>,
        invoice_num: impl Into<String>,
        issued_at: NaiveDateTime,
        draft: &InvoiceDraft,
    ) -> Self {
        let status = draft.payment_status;
        Self {
            filename: filename.into(),
            issued_at,
            invoice_num: invoice_num.into(),
            customer_name: draft.customer.name.clone(),
            customer_id: draft.customer.customer_id.clone(),
            amount: draft.gross,
            status,
            payment_date: status.records_payment().then(|| issued_at.date()),
            payment_method: match status {
                PaymentStatus::Unpaid => String::new(),
                _ => draft.payment_method().unwrap_or_default().to_string(),
            },
        }
    }

    pub fn field_text(&self, field: LedgerField) -> String {
        match field {
            LedgerField::Filename => self.filename.clone(),
            LedgerField::Datetime => timefmt::format_datetime(&self.issued_at),
            LedgerField::InvoiceNum => self.invoice_num.clone(),
            LedgerField::CustomerName => self.customer_name.clone(),
            LedgerField::CustomerId => self.customer_id.to_string(),
            LedgerField::Amount => self.amount.to_string(),
            LedgerField::Status => self.status.to_string(),
            LedgerField::PaymentDate => timefmt::format_opt_date(self.payment_date.as_ref()),
            LedgerField::PaymentMethod => self.payment_method.clone(),
        }
    }
}

impl Entity for LedgerEntry {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.filename
    }
}

/// Ledger columns and their persisted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerField {
    Filename,
    Datetime,
    InvoiceNum,
    CustomerName,
    CustomerId,
    Amount,
    Status,
    PaymentDate,
    PaymentMethod,
}

impl LedgerField {
    pub const ALL: [LedgerField; 9] = [
        LedgerField::Filename,
        LedgerField::Datetime,
        LedgerField::InvoiceNum,
        LedgerField::CustomerName,
        LedgerField::CustomerId,
        LedgerField::Amount,
        LedgerField::Status,
        LedgerField::PaymentDate,
        LedgerField::PaymentMethod,
    ];

    pub const fn storage_key(self) -> &'static str {
        match self {
            LedgerField::Filename => "filename",
            LedgerField::Datetime => "datetime",
            LedgerField::InvoiceNum => "invoice_num",
            LedgerField::CustomerName => "customer_name",
            LedgerField::CustomerId => "customer_id",
            LedgerField::Amount => "amount",
            LedgerField::Status => "status",
            LedgerField::PaymentDate => "payment_date",
            LedgerField::PaymentMethod => "payment_method",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LedgerField::Filename => "File",
            LedgerField::Datetime => "Date & Time",
            LedgerField::InvoiceNum => "Invoice Number",
            LedgerField::CustomerName => "Customer Name",
            LedgerField::CustomerId => "Customer ID",
            LedgerField::Amount => "Amount",
            LedgerField::Status => "Status",
            LedgerField::PaymentDate => "Payment Date",
            LedgerField::PaymentMethod => "Payment Method",
        }
    }

    /// Columns shown in the invoice list; free-text search covers these.
    pub const fn displayed(self) -> bool {
        matches!(
            self,
            LedgerField::Datetime
                | LedgerField::InvoiceNum
                | LedgerField::CustomerName
                | LedgerField::Amount
                | LedgerField::Status
                | LedgerField::PaymentMethod
        )
    }
}

/// Ledger query. Every criterion is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    pub text: Option<String>,
    pub status: Option<PaymentStatus>,
    /// Inclusive bounds on the issuance date.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl LedgerFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn issued_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if self.status.is_some_and(|s| s != entry.status) {
            return false;
        }
        let issued_on = entry.issued_at.date();
        if self.from.is_some_and(|from| issued_on < from) {
            return false;
        }
        if self.to.is_some_and(|to| issued_on > to) {
            return false;
        }
        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                LedgerField::ALL
                    .into_iter()
                    .filter(|f| f.displayed())
                    .any(|f| entry.field_text(f).to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Totals over a set of entries. Anything not `Paid` counts as pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub count: usize,
    pub total: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
}

impl LedgerSummary {
    pub fn of<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        entries.into_iter().fold(Self::default(), |mut acc, e| {
            acc.count += 1;
            acc.total += e.amount;
            if e.status == PaymentStatus::Paid {
                acc.paid += e.amount;
            } else {
                acc.pending += e.amount;
            }
            acc
        })
    }
}

/// Persisted ledger document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBook {
    pub invoices: Vec<LedgerEntry>,
}

impl PersistedState for LedgerBook {
    const KIND: &'static str = "ledger";

    /// Legacy layout: a bare array of entries.
    fn from_legacy(value: Value) -> Result<Self, serde_json::Error> {
        Ok(LedgerBook {
            invoices: serde_json::from_value(value)?,
        })
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Mutations hold the store's document lock from load to save, so ledgers
/// opened on the same file never lose each other's writes.
pub struct InvoiceLedger<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S> InvoiceLedger<S>
where
    S: StateStore<LedgerBook>,
{
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn load_book(&self) -> Result<LedgerBook, StorageError> {
        Ok(self.store.load()?.unwrap_or_default())
    }

    pub fn append(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let _guard = self.store.lock()?;
        let mut book = self.load_book()?;
        if position_of(&book.invoices, &entry.filename).is_some() {
            return Err(DomainError::duplicate_filename(entry.filename).into());
        }

        let invoice_num = entry.invoice_num.clone();
        book.invoices.push(entry);
        self.store.save(&book)?;
        tracing::info!(invoice_num = %invoice_num, entries = book.invoices.len(), "ledger entry appended");
        Ok(())
    }

    /// Reconcile the payment fields of `invoice_num`. Returns the updated entry.
    pub fn update_status(
        &self,
        invoice_num: &str,
        status: PaymentStatus,
        payment_method: Option<&str>,
    ) -> Result<LedgerEntry, LedgerError> {
        let method = payment_method.map(str::trim).filter(|m| !m.is_empty());
        if status == PaymentStatus::Paid && method.is_none() {
            return Err(DomainError::validation(
                "Payment Method is required for paid invoices",
            )
            .into());
        }

        let _guard = self.store.lock()?;
        let mut book = self.load_book()?;
        let Some(entry) = book
            .invoices
            .iter_mut()
            .find(|e| e.invoice_num == invoice_num)
        else {
            return Err(DomainError::not_found(format!("invoice {invoice_num}")).into());
        };

        let previous = entry.status;
        entry.status = status;
        match status {
            PaymentStatus::Unpaid => {
                entry.payment_date = None;
                entry.payment_method.clear();
            }
            PaymentStatus::Partial | PaymentStatus::Paid => {
                entry.payment_date = Some(self.clock.today());
                entry.payment_method = method.unwrap_or_default().to_string();
            }
        }
        let updated = entry.clone();

        self.store.save(&book)?;
        tracing::info!(
            invoice_num = %invoice_num,
            from = %previous,
            to = %status,
            "invoice status updated"
        );
        Ok(updated)
    }

    /// Matching entries in append order.
    pub fn query(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .load_book()?
            .invoices
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect())
    }

    pub fn summary(&self, filter: &LedgerFilter) -> Result<LedgerSummary, LedgerError> {
        Ok(LedgerSummary::of(&self.query(filter)?))
    }

    pub fn find_by_number(&self, invoice_num: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self
            .load_book()?
            .invoices
            .into_iter()
            .find(|e| e.invoice_num == invoice_num))
    }

    pub fn contains_filename(&self, filename: &str) -> Result<bool, LedgerError> {
        Ok(self
            .load_book()?
            .invoices
            .iter()
            .any(|e| e.filename == filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billforge_core::FixedClock;
    use billforge_storage::{InMemoryStateStore, JsonFileStore};
    use rust_decimal_macros::dec;

    use crate::draft::{BillingPeriod, CustomerSnapshot};

    fn at(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, month, day)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn draft(name: &str, gross: Decimal, status: PaymentStatus) -> InvoiceDraft {
        let from = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        InvoiceDraft {
            customer: CustomerSnapshot {
                customer_id: CustomerId::new(format!("ID-{name}")).unwrap(),
                name: name.into(),
                tenant_name: name.into(),
                address: "Faridabad".into(),
                gstin: String::new(),
                email: String::new(),
            },
            plan: "50 MBPS".into(),
            months: 1,
            period: BillingPeriod::new(from, from),
            gross,
            discount: None,
            late_fee: None,
            notes: String::new(),
            payment_status: status,
            payment_method: None,
        }
    }

    fn entry(num: u64, name: &str, gross: Decimal, issued_at: NaiveDateTime) -> LedgerEntry {
        let d = draft(name, gross, PaymentStatus::Unpaid);
        LedgerEntry::issued(
            d.document_filename(issued_at),
            format!("TF/25-26/HR/{num}"),
            issued_at,
            &d,
        )
    }

    fn ledger() -> (
        InvoiceLedger<Arc<InMemoryStateStore<LedgerBook>>>,
        Arc<InMemoryStateStore<LedgerBook>>,
        Arc<FixedClock>,
    ) {
        let store = Arc::new(InMemoryStateStore::new());
        let clock = Arc::new(FixedClock::new(at(6, 15)));
        (InvoiceLedger::new(store.clone(), clock.clone()), store, clock)
    }

    #[test]
    fn appended_entry_is_returned_unchanged() {
        let (ledger, _, _) = ledger();
        let e = entry(2059, "Asha", dec!(1180), at(6, 1));
        ledger.append(e.clone()).unwrap();

        assert_eq!(ledger.query(&LedgerFilter::all()).unwrap(), vec![e.clone()]);
        assert_eq!(ledger.find_by_number("TF/25-26/HR/2059").unwrap(), Some(e));
        assert!(ledger.contains_filename("Asha_Jun_2025.pdf").unwrap());
    }

    #[test]
    fn duplicate_filename_is_rejected() {
        let (ledger, _, _) = ledger();
        ledger.append(entry(2059, "Asha", dec!(500), at(6, 1))).unwrap();
        let err = ledger
            .append(entry(2060, "Asha", dec!(700), at(6, 20)))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(DomainError::DuplicateFilename(_))
        ));
        assert_eq!(ledger.query(&LedgerFilter::all()).unwrap().len(), 1);
    }

    #[test]
    fn paid_then_unpaid_sets_and_clears_payment_fields() {
        let (ledger, _, _) = ledger();
        ledger.append(entry(2059, "Asha", dec!(1180), at(6, 1))).unwrap();

        let paid = ledger
            .update_status("TF/25-26/HR/2059", PaymentStatus::Paid, Some("Cash"))
            .unwrap();
        assert_eq!(paid.status, PaymentStatus::Paid);
        assert_eq!(paid.payment_method, "Cash");
        assert_eq!(paid.payment_date, NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(paid.amount, dec!(1180));

        let unpaid = ledger
            .update_status("TF/25-26/HR/2059", PaymentStatus::Unpaid, Some("Cash"))
            .unwrap();
        assert_eq!(unpaid.payment_date, None);
        assert_eq!(unpaid.payment_method, "");
        assert_eq!(
            ledger.find_by_number("TF/25-26/HR/2059").unwrap(),
            Some(unpaid)
        );
    }

    #[test]
    fn partial_records_a_date_without_requiring_a_method() {
        let (ledger, _, _) = ledger();
        ledger.append(entry(2059, "Asha", dec!(1180), at(6, 1))).unwrap();
        let partial = ledger
            .update_status("TF/25-26/HR/2059", PaymentStatus::Partial, None)
            .unwrap();
        assert_eq!(partial.payment_date, NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(partial.payment_method, "");
    }

    #[test]
    fn paid_without_method_is_rejected_and_unknown_number_is_not_found() {
        let (ledger, _, _) = ledger();
        ledger.append(entry(2059, "Asha", dec!(1180), at(6, 1))).unwrap();

        let err = ledger
            .update_status("TF/25-26/HR/2059", PaymentStatus::Paid, Some(" "))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));

        let err = ledger
            .update_status("TF/25-26/HR/9999", PaymentStatus::Unpaid, None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::NotFound(_))));
    }

    #[test]
    fn issued_entry_reflects_payment_at_issuance() {
        let mut d = draft("Ravi", dec!(900), PaymentStatus::Paid);
        d.payment_method = Some("UPI".into());
        let e = LedgerEntry::issued("Ravi_Jun_2025.pdf", "TF/25-26/HR/1", at(6, 2), &d);
        assert_eq!(e.payment_date, NaiveDate::from_ymd_opt(2025, 6, 2));
        assert_eq!(e.payment_method, "UPI");

        let d = draft("Ravi", dec!(900), PaymentStatus::Unpaid);
        let e = LedgerEntry::issued("Ravi_Jun_2025.pdf", "TF/25-26/HR/1", at(6, 2), &d);
        assert_eq!(e.payment_date, None);
    }

    #[test]
    fn filters_combine_text_status_and_inclusive_dates() {
        let (ledger, _, _) = ledger();
        ledger.append(entry(2059, "Asha", dec!(1180), at(5, 31))).unwrap();
        ledger.append(entry(2060, "Ravi", dec!(590), at(6, 1))).unwrap();
        ledger.append(entry(2061, "Meena", dec!(708), at(6, 30))).unwrap();
        ledger
            .update_status("TF/25-26/HR/2060", PaymentStatus::Paid, Some("UPI"))
            .unwrap();

        let june = LedgerFilter::all().issued_between(
            NaiveDate::from_ymd_opt(2025, 6, 1),
            NaiveDate::from_ymd_opt(2025, 6, 30),
        );
        let nums: Vec<String> = ledger
            .query(&june)
            .unwrap()
            .into_iter()
            .map(|e| e.invoice_num)
            .collect();
        assert_eq!(nums, vec!["TF/25-26/HR/2060", "TF/25-26/HR/2061"]);

        let unpaid = ledger
            .query(&LedgerFilter::all().status(PaymentStatus::Unpaid))
            .unwrap();
        assert_eq!(unpaid.len(), 2);

        assert_eq!(ledger.query(&LedgerFilter::all().text("upi")).unwrap().len(), 1);
        assert_eq!(ledger.query(&LedgerFilter::all().text("meena")).unwrap().len(), 1);
        assert_eq!(ledger.query(&LedgerFilter::all().text("2061")).unwrap().len(), 1);
        // filename is not a displayed column
        assert!(ledger.query(&LedgerFilter::all().text(".pdf")).unwrap().is_empty());
    }

    #[test]
    fn summary_splits_paid_from_pending() {
        let (ledger, _, _) = ledger();
        ledger.append(entry(2059, "Asha", dec!(1180), at(6, 1))).unwrap();
        ledger.append(entry(2060, "Ravi", dec!(590), at(6, 2))).unwrap();
        ledger.append(entry(2061, "Meena", dec!(708), at(6, 3))).unwrap();
        ledger
            .update_status("TF/25-26/HR/2059", PaymentStatus::Paid, Some("Cash"))
            .unwrap();
        ledger
            .update_status("TF/25-26/HR/2061", PaymentStatus::Partial, None)
            .unwrap();

        let summary = ledger.summary(&LedgerFilter::all()).unwrap();
        assert_eq!(
            summary,
            LedgerSummary {
                count: 3,
                total: dec!(2478),
                paid: dec!(1180),
                pending: dec!(1298),
            }
        );
    }

    #[test]
    fn serialized_keys_follow_the_field_table() {
        let e = entry(2059, "Asha", dec!(1180), at(6, 1));
        let value = serde_json::to_value(&e).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        let mut expected: Vec<&str> = LedgerField::ALL.iter().map(|f| f.storage_key()).collect();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(value["datetime"], "01-06-2025 10:30:00");
        assert_eq!(value["payment_date"], "");
    }

    #[test]
    fn reads_legacy_log_and_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("invoice_log.json");
        std::fs::write(
            &path,
            r#"[{"filename":"Asha_May_2025.pdf","datetime":"31-05-2025 18:02:11","invoice_num":"TF/25-26/HR/2059","customer_name":"Asha","customer_id":"TF1","amount":"1180","status":"Paid","payment_date":"31-05-2025","payment_method":"Cash"}]"#,
        )
        .unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at(6, 15)));

        let first = InvoiceLedger::new(JsonFileStore::<LedgerBook>::new(&path), clock.clone());
        let legacy = first.find_by_number("TF/25-26/HR/2059").unwrap().unwrap();
        assert_eq!(legacy.status, PaymentStatus::Paid);
        first.append(entry(2060, "Ravi", dec!(590), at(6, 1))).unwrap();
        drop(first);

        let reopened = InvoiceLedger::new(JsonFileStore::<LedgerBook>::new(&path), clock);
        assert_eq!(reopened.query(&LedgerFilter::all()).unwrap().len(), 2);
    }

    #[test]
    fn ledgers_sharing_a_file_keep_every_append() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("invoice_log.json");
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at(6, 15)));

        std::thread::scope(|s| {
            for t in 0..2u64 {
                let (path, clock) = (path.clone(), clock.clone());
                s.spawn(move || {
                    let ledger = InvoiceLedger::new(JsonFileStore::<LedgerBook>::new(path), clock);
                    for i in 0..50u64 {
                        let name = format!("Tenant{t}x{i}");
                        ledger
                            .append(entry(t * 100 + i, &name, dec!(590), at(6, 1)))
                            .unwrap();
                    }
                });
            }
        });

        let reopened = InvoiceLedger::new(JsonFileStore::<LedgerBook>::new(&path), clock);
        let entries = reopened.query(&LedgerFilter::all()).unwrap();
        assert_eq!(entries.len(), 100);
        assert_eq!(reopened.summary(&LedgerFilter::all()).unwrap().total, dec!(59000));
    }

    #[test]
    fn failed_persist_leaves_the_ledger_untouched() {
        let (ledger, store, _) = ledger();
        ledger.append(entry(2059, "Asha", dec!(1180), at(6, 1))).unwrap();
        store.fail_writes(true);
        assert!(matches!(
            ledger.update_status("TF/25-26/HR/2059", PaymentStatus::Paid, Some("Cash")),
            Err(LedgerError::Storage(_))
        ));
        store.fail_writes(false);
        let e = ledger.find_by_number("TF/25-26/HR/2059").unwrap().unwrap();
        assert_eq!(e.status, PaymentStatus::Unpaid);
    }
}
