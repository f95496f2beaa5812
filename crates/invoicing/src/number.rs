use serde::{Deserialize, Serialize};

/// Human-facing invoice number: `PREFIX/FISCALYEAR/REGION/<sequence>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumberFormat {
    pub prefix: String,
    pub fiscal_year: String,
    pub region: String,
}

impl InvoiceNumberFormat {
    pub fn new(
        prefix: impl Into<String>,
        fiscal_year: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            fiscal_year: fiscal_year.into(),
            region: region.into(),
        }
    }

    fn stem(&self) -> String {
        format!("{}/{}/{}/", self.prefix, self.fiscal_year, self.region)
    }

    pub fn format(&self, sequence: u64) -> String {
        format!("{}{sequence}", self.stem())
    }

    /// Sequence part of a number in this format, if it is one.
    pub fn parse(&self, formatted: &str) -> Option<u64> {
        formatted
            .trim()
            .strip_prefix(&self.stem())
            .and_then(|seq| seq.parse().ok())
    }
}

impl Default for InvoiceNumberFormat {
    fn default() -> Self {
        Self::new("TF", "25-26", "HR")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_parses_the_sequence() {
        let fmt = InvoiceNumberFormat::default();
        assert_eq!(fmt.format(2059), "TF/25-26/HR/2059");
        assert_eq!(fmt.parse("TF/25-26/HR/2059"), Some(2059));
        assert_eq!(fmt.parse("TF/24-25/HR/2059"), None);
        assert_eq!(fmt.parse("TF/25-26/HR/x"), None);
    }
}
