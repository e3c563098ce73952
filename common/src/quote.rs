//! Raw exchange rate quotes as published by the bank feed.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::monetary::Currency;

/// One entry of the upstream rate feed.
///
/// Quotes against the home currency carry `rate_buy`/`rate_sell` from the
/// bank's perspective; other pairs usually carry only `rate_cross`.
/// Currency codes are kept numeric since the feed lists many currencies
/// the application does not track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    /// Quoted currency (ISO 4217 numeric).
    pub currency_code_a: u16,
    /// Pricing currency (ISO 4217 numeric).
    pub currency_code_b: u16,
    /// Publication time, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    /// Rate at which the bank buys `currency_code_a`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_buy: Option<Decimal>,
    /// Rate at which the bank sells `currency_code_a`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_sell: Option<Decimal>,
    /// Single non-directional rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_cross: Option<Decimal>,
}

impl RateQuote {
    /// Quote with buy/sell sides.
    pub fn buy_sell(a: Currency, b: Currency, rate_buy: Decimal, rate_sell: Decimal) -> Self {
        Self {
            currency_code_a: a.numeric_code(),
            currency_code_b: b.numeric_code(),
            date: None,
            rate_buy: Some(rate_buy),
            rate_sell: Some(rate_sell),
            rate_cross: None,
        }
    }

    /// Quote with only a cross rate.
    pub fn cross(a: Currency, b: Currency, rate_cross: Decimal) -> Self {
        Self {
            currency_code_a: a.numeric_code(),
            currency_code_b: b.numeric_code(),
            date: None,
            rate_buy: None,
            rate_sell: None,
            rate_cross: Some(rate_cross),
        }
    }

    /// Whether this quote is published for `a` priced in `b`.
    pub fn quotes(&self, a: Currency, b: Currency) -> bool {
        self.currency_code_a == a.numeric_code() && self.currency_code_b == b.numeric_code()
    }

    /// Whether `currency` is the quoted side.
    pub fn is_quoted(&self, currency: Currency) -> bool {
        self.currency_code_a == currency.numeric_code()
    }

    /// Quoted currency, if tracked.
    pub fn currency_a(&self) -> Option<Currency> {
        Currency::from_numeric(self.currency_code_a)
    }

    /// Pricing currency, if tracked.
    pub fn currency_b(&self) -> Option<Currency> {
        Currency::from_numeric(self.currency_code_b)
    }

    /// Publication time.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}
