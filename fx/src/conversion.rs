//! Currency conversion at request time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendtrack_common::{Currency, CurrencyPair, Money};
use tracing::debug;

use crate::table::RateTable;

/// Outcome of converting an amount through a [`RateTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// Input amount.
    pub input: Money,
    /// Output amount.
    pub output: Money,
    /// Table rate used, `None` when the amount was passed through. Rates
    /// out of the home currency are divided by rather than multiplied.
    pub rate: Option<Decimal>,
    /// No rate was available and the input was taken as already being in
    /// the target currency.
    pub fallback: bool,
    /// When the conversion was performed.
    pub converted_at: DateTime<Utc>,
}

impl Conversion {
    /// Get the currency pair.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.input.currency, self.output.currency)
    }

    /// Get the effective rate used.
    pub fn effective_rate(&self) -> Decimal {
        if self.input.value.is_zero() {
            return Decimal::ZERO;
        }
        self.output.value / self.input.value
    }
}

/// Convert `amount` into `to`, treating the amount as already denominated in
/// `to` when the table has no rate for the pair.
pub fn convert_or_passthrough(table: &RateTable, amount: &Money, to: Currency) -> Conversion {
    let converted_at = Utc::now();

    if amount.currency == to {
        return Conversion {
            input: *amount,
            output: *amount,
            rate: Some(Decimal::ONE),
            fallback: false,
            converted_at,
        };
    }

    let converted = table
        .get(amount.currency, to)
        .zip(table.apply(amount.currency, to, amount.value));

    match converted {
        Some((rate, value)) => Conversion {
            input: *amount,
            output: Money::new(value, to).round(),
            rate: Some(rate),
            fallback: false,
            converted_at,
        },
        None => {
            debug!(
                from = %amount.currency,
                to = %to,
                "No rate for conversion, passing amount through"
            );
            Conversion {
                input: *amount,
                output: Money::new(amount.value, to),
                rate: None,
                fallback: true,
                converted_at,
            }
        }
    }
}
