//! Explicit mapping between customer fields, their form labels and their storage
//! keys. The match arms are exhaustive, so adding a field without a key fails to
//! compile.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    CustomerId,
    Name,
    TenantName,
    CustomerAddress,
    CustomerGstin,
    Email,
    Phone,
    Plan,
    InstallationDate,
    Notes,
    CreatedDate,
    LastModified,
}

impl CustomerField {
    pub const ALL: [CustomerField; 12] = [
        CustomerField::CustomerId,
        CustomerField::Name,
        CustomerField::TenantName,
        CustomerField::CustomerAddress,
        CustomerField::CustomerGstin,
        CustomerField::Email,
        CustomerField::Phone,
        CustomerField::Plan,
        CustomerField::InstallationDate,
        CustomerField::Notes,
        CustomerField::CreatedDate,
        CustomerField::LastModified,
    ];

    pub const fn storage_key(self) -> &'static str {
        match self {
            CustomerField::CustomerId => "customer_id",
            CustomerField::Name => "name",
            CustomerField::TenantName => "tenant_name",
            CustomerField::CustomerAddress => "customer_address",
            CustomerField::CustomerGstin => "customer_gstin",
            CustomerField::Email => "email",
            CustomerField::Phone => "phone",
            CustomerField::Plan => "plan",
            CustomerField::InstallationDate => "installation_date",
            CustomerField::Notes => "notes",
            CustomerField::CreatedDate => "created_date",
            CustomerField::LastModified => "last_modified",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CustomerField::CustomerId => "Customer ID",
            CustomerField::Name => "Name",
            CustomerField::TenantName => "Tenant Name",
            CustomerField::CustomerAddress => "Customer Address",
            CustomerField::CustomerGstin => "Customer GSTIN",
            CustomerField::Email => "Email",
            CustomerField::Phone => "Phone",
            CustomerField::Plan => "Plan",
            CustomerField::InstallationDate => "Installation Date",
            CustomerField::Notes => "Notes",
            CustomerField::CreatedDate => "Created Date",
            CustomerField::LastModified => "Last Modified",
        }
    }

    /// Fields an upsert rejects when blank.
    pub const fn required(self) -> bool {
        matches!(
            self,
            CustomerField::CustomerId
                | CustomerField::Name
                | CustomerField::TenantName
                | CustomerField::CustomerAddress
        )
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.storage_key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_and_labels_are_unique() {
        let mut keys: Vec<_> = CustomerField::ALL.iter().map(|f| f.storage_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), CustomerField::ALL.len());

        for f in CustomerField::ALL {
            assert_eq!(CustomerField::from_storage_key(f.storage_key()), Some(f));
        }
        assert_eq!(CustomerField::from_storage_key("Tenant Name"), None);
    }
}
