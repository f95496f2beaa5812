//! Engine configuration from environment variables.
//!
//! Every setting has a default, so an empty environment yields a working
//! configuration rooted at the current directory. Relative output and logo
//! paths resolve against the data directory.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use billforge_core::TaxRate;
use billforge_invoicing::{DEFAULT_SEED, InvoiceNumberFormat};
use billforge_render::SupplierProfile;

pub const DATA_DIR_ENV: &str = "BILLFORGE_DATA_DIR";
pub const OUTPUT_DIR_ENV: &str = "BILLFORGE_OUTPUT_DIR";
pub const LOGO_PATH_ENV: &str = "BILLFORGE_LOGO_PATH";
pub const TAX_RATE_ENV: &str = "BILLFORGE_TAX_RATE";
pub const NUMBER_SEED_ENV: &str = "BILLFORGE_NUMBER_SEED";
pub const NUMBER_PREFIX_ENV: &str = "BILLFORGE_NUMBER_PREFIX";
pub const FISCAL_YEAR_ENV: &str = "BILLFORGE_FISCAL_YEAR";
pub const REGION_ENV: &str = "BILLFORGE_REGION";
pub const PLACE_OF_SUPPLY_ENV: &str = "BILLFORGE_PLACE_OF_SUPPLY";

const DEFAULT_OUTPUT_DIR: &str = "output_invoices";
const DEFAULT_LOGO_PATH: &str = "assets/logo.png";

pub const TRACKER_FILE: &str = "invoice_tracker.json";
pub const CUSTOMERS_FILE: &str = "customers.json";
pub const LEDGER_FILE: &str = "invoice_log.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}='{value}' is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// `None` renders without a logo or watermark.
    pub logo_path: Option<PathBuf>,
    /// Rate of each of the two tax components.
    pub tax_rate: TaxRate,
    pub number_seed: u64,
    pub number_format: InvoiceNumberFormat,
    pub supplier: SupplierProfile,
}

impl EngineConfig {
    /// Defaults with all state under `dir`.
    pub fn rooted_at(dir: impl Into<PathBuf>) -> Self {
        let data_dir = dir.into();
        Self {
            output_dir: data_dir.join(DEFAULT_OUTPUT_DIR),
            logo_path: Some(data_dir.join(DEFAULT_LOGO_PATH)),
            data_dir,
            tax_rate: TaxRate::default(),
            number_seed: DEFAULT_SEED,
            number_format: InvoiceNumberFormat::default(),
            supplier: SupplierProfile::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and blank values fall back to
    /// the defaults, except the logo path where blank disables the logo.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let non_blank = |key: &str| get(key).filter(|v| !v.is_empty());

        let data_dir = non_blank(DATA_DIR_ENV).map_or_else(|| PathBuf::from("."), PathBuf::from);
        let mut config = Self::rooted_at(&data_dir);

        if let Some(dir) = non_blank(OUTPUT_DIR_ENV) {
            config.output_dir = data_dir.join(dir);
        }
        if let Some(path) = get(LOGO_PATH_ENV) {
            config.logo_path = (!path.is_empty()).then(|| data_dir.join(path));
        }
        if let Some(raw) = non_blank(TAX_RATE_ENV) {
            config.tax_rate = parse_tax_rate(&raw)?;
        }
        if let Some(raw) = non_blank(NUMBER_SEED_ENV) {
            config.number_seed = raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: NUMBER_SEED_ENV,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(prefix) = non_blank(NUMBER_PREFIX_ENV) {
            config.number_format.prefix = prefix;
        }
        if let Some(fy) = non_blank(FISCAL_YEAR_ENV) {
            config.number_format.fiscal_year = fy;
        }
        if let Some(region) = non_blank(REGION_ENV) {
            config.number_format.region = region;
        }
        if let Some(place) = non_blank(PLACE_OF_SUPPLY_ENV) {
            config.supplier.place_of_supply = place;
        }

        Ok(config)
    }

    pub fn tracker_path(&self) -> PathBuf {
        self.data_dir.join(TRACKER_FILE)
    }

    pub fn customers_path(&self) -> PathBuf {
        self.data_dir.join(CUSTOMERS_FILE)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn parse_tax_rate(raw: &str) -> Result<TaxRate, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: TAX_RATE_ENV,
        value: raw.to_string(),
        reason,
    };
    let value = Decimal::from_str(raw).map_err(|e| invalid(e.to_string()))?;
    TaxRate::new(value).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.output_dir, PathBuf::from("./output_invoices"));
        assert_eq!(config.logo_path, Some(PathBuf::from("./assets/logo.png")));
        assert_eq!(config.tax_rate.to_string(), "9.0%");
        assert_eq!(config.number_seed, 2058);
        assert_eq!(config.number_format.format(2059), "TF/25-26/HR/2059");
        assert_eq!(config.tracker_path(), PathBuf::from("./invoice_tracker.json"));
        assert_eq!(config.supplier.place_of_supply, "Haryana");
    }

    #[test]
    fn overrides_are_applied() {
        let config = EngineConfig::from_lookup(lookup(&[
            (DATA_DIR_ENV, "/srv/billing"),
            (OUTPUT_DIR_ENV, "pdf"),
            (LOGO_PATH_ENV, "/etc/billing/logo.png"),
            (TAX_RATE_ENV, "0.06"),
            (NUMBER_SEED_ENV, "5000"),
            (FISCAL_YEAR_ENV, "26-27"),
            (REGION_ENV, "DL"),
            (PLACE_OF_SUPPLY_ENV, "Delhi"),
        ]))
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/srv/billing/pdf"));
        assert_eq!(config.logo_path, Some(PathBuf::from("/etc/billing/logo.png")));
        assert_eq!(config.tax_rate.to_string(), "6.0%");
        assert_eq!(config.number_seed, 5000);
        assert_eq!(config.number_format.format(1), "TF/26-27/DL/1");
        assert_eq!(config.ledger_path(), PathBuf::from("/srv/billing/invoice_log.json"));
        assert_eq!(config.supplier.place_of_supply, "Delhi");
    }

    #[test]
    fn blank_logo_path_disables_the_logo() {
        let config = EngineConfig::from_lookup(lookup(&[(LOGO_PATH_ENV, " ")])).unwrap();
        assert_eq!(config.logo_path, None);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = EngineConfig::from_lookup(lookup(&[(TAX_RATE_ENV, "1.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: TAX_RATE_ENV, .. }));

        let err = EngineConfig::from_lookup(lookup(&[(NUMBER_SEED_ENV, "-3")])).unwrap_err();
        assert!(err.to_string().starts_with("BILLFORGE_NUMBER_SEED='-3'"));
    }
}
