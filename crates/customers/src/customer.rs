use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use billforge_core::timefmt::{self, opt_date, opt_datetime};
use billforge_core::{CustomerId, DomainError, DomainResult, Entity};

use crate::field::CustomerField;

/// Customer master record.
///
/// Optional text attributes are empty strings when unset, matching the persisted
/// layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    pub tenant_name: String,
    pub customer_address: String,
    /// Tax registration id.
    #[serde(default)]
    pub customer_gstin: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub plan: String,
    #[serde(default, with = "opt_date")]
    pub installation_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, with = "opt_datetime")]
    pub created_date: Option<NaiveDateTime>,
    #[serde(default, with = "opt_datetime")]
    pub last_modified: Option<NaiveDateTime>,
}

impl Customer {
    /// New record with only the required attributes set.
    pub fn new(
        customer_id: CustomerId,
        name: impl Into<String>,
        tenant_name: impl Into<String>,
        customer_address: impl Into<String>,
    ) -> Self {
        Self {
            customer_id,
            name: name.into(),
            tenant_name: tenant_name.into(),
            customer_address: customer_address.into(),
            customer_gstin: String::new(),
            email: String::new(),
            phone: String::new(),
            plan: String::new(),
            installation_date: None,
            notes: String::new(),
            created_date: None,
            last_modified: None,
        }
    }

    pub fn tax_id(&self) -> Option<&str> {
        non_blank(&self.customer_gstin)
    }

    pub fn email(&self) -> Option<&str> {
        non_blank(&self.email)
    }

    /// Display text of one field, as it is shown in listings.
    pub fn field_text(&self, field: CustomerField) -> String {
        match field {
            CustomerField::CustomerId => self.customer_id.to_string(),
            CustomerField::Name => self.name.clone(),
            CustomerField::TenantName => self.tenant_name.clone(),
            CustomerField::CustomerAddress => self.customer_address.clone(),
            CustomerField::CustomerGstin => self.customer_gstin.clone(),
            CustomerField::Email => self.email.clone(),
            CustomerField::Phone => self.phone.clone(),
            CustomerField::Plan => self.plan.clone(),
            CustomerField::InstallationDate => {
                timefmt::format_opt_date(self.installation_date.as_ref())
            }
            CustomerField::Notes => self.notes.clone(),
            CustomerField::CreatedDate => self
                .created_date
                .as_ref()
                .map(timefmt::format_datetime)
                .unwrap_or_default(),
            CustomerField::LastModified => self
                .last_modified
                .as_ref()
                .map(timefmt::format_datetime)
                .unwrap_or_default(),
        }
    }

    /// Rejects blank required fields.
    pub fn validate(&self) -> DomainResult<()> {
        for field in CustomerField::ALL.into_iter().filter(|f| f.required()) {
            DomainError::require(field.label(), &self.field_text(field))?;
        }
        Ok(())
    }

    /// Case-insensitive substring match over every field.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        CustomerField::ALL
            .into_iter()
            .any(|f| self.field_text(f).to_lowercase().contains(&needle))
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.customer_id
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
