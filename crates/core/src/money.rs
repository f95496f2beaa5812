//! Amount calculator: splits a tax-inclusive gross amount into a base amount and
//! two equal tax components (a central/state pair).
//!
//! Discount and late fee are applied to the displayed total only; they never feed
//! back into the base/tax breakdown.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Monetary scale (two decimal places).
pub const DECIMAL_PLACES: u32 = 2;

/// Round half-up (away from zero) to two decimal places.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Rate of ONE tax component (e.g. `0.09` for 9% central + 9% state).
///
/// Bounded to `[0, 0.5)`: from 0.5 up, a one-cent gross no longer splits into a
/// positive base within one cent of the gross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Exclusive upper bound of a component rate.
    pub const MAX: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

    /// Accepts rates in `[0, 0.5)`.
    pub fn new(rate: Decimal) -> DomainResult<Self> {
        if rate.is_sign_negative() || rate >= Self::MAX {
            return Err(DomainError::validation(format!(
                "tax rate must be within [0, 0.5), got {rate}"
            )));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Default for TaxRate {
    /// 9% per component.
    fn default() -> Self {
        Self(Decimal::from_parts(9, 0, 0, false, 2))
    }
}

impl fmt::Display for TaxRate {
    /// Percentage with one decimal, e.g. `9.0%`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{pct:.1}%")
    }
}

/// Base amount plus the amount of each of the two tax components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSplit {
    pub base: Decimal,
    pub per_component_tax: Decimal,
}

impl TaxSplit {
    /// `base + 2 * per_component_tax`; may differ from the gross by one cent.
    pub fn recombined(&self) -> Decimal {
        self.base + self.per_component_tax * Decimal::from(2)
    }
}

/// Split a tax-inclusive `gross` into base and per-component tax.
///
/// `base = round(gross / (1 + 2*rate))`, `tax = round(base * rate)`, each rounded
/// independently; the one-cent drift this can introduce is not corrected.
pub fn split(gross: Decimal, rate: TaxRate) -> TaxSplit {
    let divisor = Decimal::ONE + Decimal::from(2) * rate.value();
    let base = round_money(gross / divisor);
    let per_component_tax = round_money(base * rate.value());
    TaxSplit {
        base,
        per_component_tax,
    }
}

/// Everything a rendered invoice shows about money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub gross: Decimal,
    pub split: TaxSplit,
    pub discount: Decimal,
    pub late_fee: Decimal,
    /// `gross - discount + late_fee`.
    pub total: Decimal,
}

impl InvoiceTotals {
    pub fn compute(
        gross: Decimal,
        discount: Option<Decimal>,
        late_fee: Option<Decimal>,
        rate: TaxRate,
    ) -> Self {
        let discount = discount.unwrap_or(Decimal::ZERO);
        let late_fee = late_fee.unwrap_or(Decimal::ZERO);
        Self {
            gross,
            split: split(gross, rate),
            discount,
            late_fee,
            total: round_money(gross - discount + late_fee),
        }
    }

    pub fn has_discount(&self) -> bool {
        !self.discount.is_zero()
    }

    pub fn has_late_fee(&self) -> bool {
        !self.late_fee.is_zero()
    }
}
