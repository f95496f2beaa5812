use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billforge_core::{CustomerId, DomainError, DomainResult, InvoiceTotals, TaxRate};
use billforge_customers::Customer;

use crate::status::PaymentStatus;

/// Customer attributes frozen onto an invoice at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer_id: CustomerId,
    pub name: String,
    pub tenant_name: String,
    pub address: String,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub email: String,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(c: &Customer) -> Self {
        Self {
            customer_id: c.customer_id.clone(),
            name: c.name.clone(),
            tenant_name: c.tenant_name.clone(),
            address: c.customer_address.clone(),
            gstin: c.customer_gstin.clone(),
            email: c.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl BillingPeriod {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }
}

/// Everything needed to issue one invoice. Nothing here is persisted until the
/// draft passes [`InvoiceDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub customer: CustomerSnapshot,
    pub plan: String,
    pub months: u32,
    pub period: BillingPeriod,
    /// Tax-inclusive amount for the billing period.
    pub gross: Decimal,
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub late_fee: Option<Decimal>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl InvoiceDraft {
    pub fn validate(&self) -> DomainResult<()> {
        DomainError::require("Customer ID", self.customer.customer_id.as_str())?;
        DomainError::require("Name", &self.customer.name)?;
        DomainError::require("Tenant Name", &self.customer.tenant_name)?;
        DomainError::require("Customer Address", &self.customer.address)?;
        DomainError::require("Plan", &self.plan)?;

        if self.months == 0 {
            return Err(DomainError::validation("Months must be at least 1"));
        }
        if self.period.to < self.period.from {
            return Err(DomainError::validation(
                "Billing Period To cannot be earlier than Billing Period From",
            ));
        }
        if self.gross <= Decimal::ZERO {
            return Err(DomainError::validation("Total Amount must be greater than 0"));
        }
        if self.discount.is_some_and(|d| d.is_sign_negative()) {
            return Err(DomainError::validation("Discount cannot be negative"));
        }
        if self.late_fee.is_some_and(|f| f.is_sign_negative()) {
            return Err(DomainError::validation("Late Fee cannot be negative"));
        }
        if self.payment_status == PaymentStatus::Paid && self.payment_method().is_none() {
            return Err(DomainError::validation(
                "Payment Method is required for paid invoices",
            ));
        }
        Ok(())
    }

    /// Non-blank payment method, if any.
    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    pub fn totals(&self, rate: TaxRate) -> InvoiceTotals {
        InvoiceTotals::compute(self.gross, self.discount, self.late_fee, rate)
    }

    /// `<Name_With_Underscores>_<Mon>_<YYYY>.pdf`, derived from the customer
    /// name and the issuance date. Whitespace, path separators and characters
    /// no common filesystem accepts in a name become `_`.
    pub fn document_filename(&self, issued_at: NaiveDateTime) -> String {
        let stem: String = self
            .customer
            .name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_whitespace() || c.is_control() => '_',
                other => other,
            })
            .collect();
        format!("{stem}_{}.pdf", issued_at.format("%b_%Y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> InvoiceDraft {
        InvoiceDraft {
            customer: CustomerSnapshot {
                customer_id: CustomerId::new("TF0042").unwrap(),
                name: "Asha Verma".into(),
                tenant_name: "Asha Verma".into(),
                address: "Sector 21, Faridabad".into(),
                gstin: String::new(),
                email: String::new(),
            },
            plan: "100 MBPS UNL".into(),
            months: 1,
            period: BillingPeriod::new(date(2025, 5, 1), date(2025, 5, 31)),
            gross: dec!(1180),
            discount: None,
            late_fee: None,
            notes: String::new(),
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
        }
    }

    fn rejected(d: &InvoiceDraft) -> String {
        match d.validate().unwrap_err() {
            DomainError::Validation(msg) => msg,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn well_formed_draft_validates() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn inverted_period_is_rejected() {
        let mut d = draft();
        d.period = BillingPeriod::new(date(2025, 5, 31), date(2025, 5, 1));
        assert!(rejected(&d).contains("Billing Period"));
    }

    #[test]
    fn single_day_period_is_allowed() {
        let mut d = draft();
        d.period = BillingPeriod::new(date(2025, 5, 1), date(2025, 5, 1));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn amounts_and_months_are_checked() {
        let mut d = draft();
        d.gross = Decimal::ZERO;
        assert!(rejected(&d).contains("Total Amount"));

        let mut d = draft();
        d.discount = Some(dec!(-1));
        assert!(rejected(&d).contains("Discount"));

        let mut d = draft();
        d.months = 0;
        assert!(rejected(&d).contains("Months"));
    }

    #[test]
    fn blank_plan_is_rejected() {
        let mut d = draft();
        d.plan = " ".into();
        assert_eq!(rejected(&d), "Plan is required");
    }

    #[test]
    fn paid_needs_a_method_but_partial_does_not() {
        let mut d = draft();
        d.payment_status = PaymentStatus::Paid;
        d.payment_method = Some("  ".into());
        assert!(rejected(&d).contains("Payment Method"));

        d.payment_method = Some("UPI".into());
        assert!(d.validate().is_ok());

        d.payment_status = PaymentStatus::Partial;
        d.payment_method = None;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn filename_uses_name_month_and_year() {
        let issued = date(2025, 6, 3).and_hms_opt(10, 15, 0).unwrap();
        assert_eq!(draft().document_filename(issued), "Asha_Verma_Jun_2025.pdf");
    }

    #[test]
    fn filename_replaces_characters_filesystems_reject() {
        let issued = date(2025, 6, 3).and_hms_opt(10, 15, 0).unwrap();
        let mut d = draft();
        d.customer.name = " Sharma & Sons: \"A/B\" <HQ>|Unit*2?\\Tab\tEnd ".into();
        assert_eq!(
            d.document_filename(issued),
            "Sharma_&_Sons___A_B___HQ__Unit_2__Tab_End_Jun_2025.pdf"
        );
    }

    #[test]
    fn snapshot_copies_customer_attributes() {
        let mut c = Customer::new(
            CustomerId::new("TF9").unwrap(),
            "Ravi",
            "Ravi Kumar",
            "Lakkarpur",
        );
        c.customer_gstin = "06ABCDE1234F1Z5".into();
        let snap = CustomerSnapshot::from(&c);
        assert_eq!(snap.tenant_name, "Ravi Kumar");
        assert_eq!(snap.gstin, "06ABCDE1234F1Z5");
    }
}
