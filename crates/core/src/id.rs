//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a customer, as assigned by the operator (e.g. `TF0042`).
///
/// Immutable once a customer is created. Surrounding whitespace is trimmed,
/// including when read back from a persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("CustomerId: must not be blank"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CustomerId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CustomerId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CustomerId> for String {
    fn from(value: CustomerId) -> Self {
        value.0
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_id_is_trimmed_and_non_blank() {
        let id: CustomerId = "  TF0042 ".parse().unwrap();
        assert_eq!(id.as_str(), "TF0042");
        assert!(matches!(
            CustomerId::new("   "),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn customer_id_serializes_as_plain_string() {
        let id = CustomerId::new("TF0042").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"TF0042\"");
    }

    #[test]
    fn deserializing_applies_the_same_rules() {
        let id: CustomerId = serde_json::from_str("\" TF0042 \"").unwrap();
        assert_eq!(id.as_str(), "TF0042");
        assert!(serde_json::from_str::<CustomerId>("\"  \"").is_err());
    }
}
