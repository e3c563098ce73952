//! Resolved rate table exposed to conversion call sites.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use spendtrack_common::{Currency, CurrencyPair, Money};
use std::collections::BTreeMap;

use crate::error::{FxError, FxResult};

/// Rates for every resolvable ordered pair of tracked currencies.
///
/// Unresolvable pairs are absent. Serializes as a flat object keyed by
/// `"FROM-TO"` with float values, e.g. `{"EUR-USD": 1.0486}`.
///
/// Rates out of the home currency are stored as the bank publishes them,
/// in home units per foreign unit (`UAH-USD` is the UAH price of one USD).
/// Conversions from home therefore divide by the rate; every other pair
/// multiplies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<CurrencyPair, Decimal>,
    home: Option<Currency>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `home` as the currency whose outgoing rates are home-quoted.
    pub fn with_home(mut self, home: Currency) -> Self {
        self.home = Some(home);
        self
    }

    pub fn home(&self) -> Option<Currency> {
        self.home
    }

    pub fn insert(&mut self, pair: CurrencyPair, rate: Decimal) {
        self.rates.insert(pair, rate);
    }

    /// Rate for `from -> to`, if resolved.
    pub fn get(&self, from: Currency, to: Currency) -> Option<Decimal> {
        self.rates.get(&CurrencyPair::new(from, to)).copied()
    }

    pub fn contains(&self, pair: &CurrencyPair) -> bool {
        self.rates.contains_key(pair)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyPair, &Decimal)> {
        self.rates.iter()
    }

    /// `value` in `from` expressed in `to`, unrounded. `None` when the pair
    /// has no rate or a home-quoted rate is zero.
    pub fn apply(&self, from: Currency, to: Currency, value: Decimal) -> Option<Decimal> {
        let rate = self.get(from, to)?;
        if self.home == Some(from) {
            value.checked_div(rate)
        } else {
            value.checked_mul(rate)
        }
    }

    /// Convert `amount` into `to`, rounding to the target's decimal places.
    pub fn convert(&self, amount: &Money, to: Currency) -> FxResult<Money> {
        if amount.currency == to {
            return Ok(*amount);
        }
        let value = self
            .apply(amount.currency, to, amount.value)
            .ok_or(FxError::RateNotAvailable(CurrencyPair::new(amount.currency, to)))?;
        Ok(Money::new(value, to).round())
    }
}

impl FromIterator<(CurrencyPair, Decimal)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (CurrencyPair, Decimal)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
            home: None,
        }
    }
}

impl Serialize for RateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rates.len()))?;
        for (pair, rate) in &self.rates {
            map.serialize_entry(&pair.to_string(), &rate.to_f64())?;
        }
        map.end()
    }
}
