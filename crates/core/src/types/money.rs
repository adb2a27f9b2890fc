//! Monetary amounts as the catalog source delivers them.
//!
//! Amounts travel as decimal strings (preserving precision over the wire) and
//! are parsed with `rust_decimal` only at the point arithmetic is needed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Create a new monetary amount.
    #[must_use]
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// Parse the amount into a [`Decimal`].
    ///
    /// Malformed amounts degrade to zero rather than erroring; the catalog
    /// source owns the string and a bad value must never break display or
    /// sorting.
    #[must_use]
    pub fn parsed_amount(&self) -> Decimal {
        self.amount.trim().parse().unwrap_or(Decimal::ZERO)
    }
}
