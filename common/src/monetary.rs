//! Monetary types for spendtrack.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use crate::error::SpendtrackError;

/// A monetary amount with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount value (high precision decimal).
    pub value: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money instance.
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Create from a string value.
    pub fn from_str(value: &str, currency: Currency) -> Result<Self, rust_decimal::Error> {
        Ok(Self {
            value: value.parse()?,
            currency,
        })
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            value: Decimal::ZERO,
            currency,
        }
    }

    /// Check if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Check if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }

    /// Round to the currency's standard decimal places.
    pub fn round(&self) -> Self {
        Self {
            value: self.value.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

impl Add for Money {
    type Output = Result<Money, CurrencyMismatchError>;

    fn add(self, other: Money) -> Self::Output {
        if self.currency != other.currency {
            return Err(CurrencyMismatchError {
                expected: self.currency,
                actual: other.currency,
            });
        }
        Ok(Money {
            value: self.value + other.value,
            currency: self.currency,
        })
    }
}

impl Sub for Money {
    type Output = Result<Money, CurrencyMismatchError>;

    fn sub(self, other: Money) -> Self::Output {
        if self.currency != other.currency {
            return Err(CurrencyMismatchError {
                expected: self.currency,
                actual: other.currency,
            });
        }
        Ok(Money {
            value: self.value - other.value,
            currency: self.currency,
        })
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rate: Decimal) -> Self::Output {
        Money {
            value: self.value * rate,
            currency: self.currency,
        }
    }
}

/// Error when attempting operations on different currencies.
#[derive(Debug, Clone)]
pub struct CurrencyMismatchError {
    pub expected: Currency,
    pub actual: Currency,
}

impl fmt::Display for CurrencyMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Currency mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for CurrencyMismatchError {}

/// Currencies the application tracks.
///
/// The bank feed identifies currencies by ISO 4217 numeric code; everywhere
/// else they are referred to by symbolic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Ukrainian hryvnia, the home currency.
    Uah,
    Usd,
    Eur,
    Gbp,
    Pln,
}

impl Currency {
    /// Every supported currency, in declaration order.
    pub const ALL: [Currency; 5] = [
        Currency::Uah,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Pln,
    ];

    /// Symbolic ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Uah => "UAH",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Pln => "PLN",
        }
    }

    /// Numeric ISO 4217 code, as published by the bank feed.
    pub fn numeric_code(&self) -> u16 {
        match self {
            Currency::Uah => 980,
            Currency::Usd => 840,
            Currency::Eur => 978,
            Currency::Gbp => 826,
            Currency::Pln => 985,
        }
    }

    /// Look up a currency by numeric code.
    pub fn from_numeric(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.numeric_code() == code)
    }

    /// Get the standard decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        2
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = SpendtrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(SpendtrackError::UnknownCurrency(code))
    }
}

/// A directed currency pair.
///
/// `from -> to` and `to -> from` are distinct keys: bank quotes are not
/// reciprocal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(from: Currency, to: Currency) -> Self {
        Self { from, to }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    /// Whether either side is the given currency.
    pub fn involves(&self, currency: Currency) -> bool {
        self.from == currency || self.to == currency
    }

    /// Whether both sides are the same currency.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_operations() {
        let m1 = Money::from_str("100.00", Currency::Usd).unwrap();
        let m2 = Money::from_str("50.00", Currency::Usd).unwrap();

        let sum = (m1 + m2).unwrap();
        assert_eq!(sum.value, Decimal::from(150));

        let diff = (m1 - m2).unwrap();
        assert_eq!(diff.value, Decimal::from(50));
    }

    #[test]
    fn test_currency_mismatch() {
        let m1 = Money::from_str("100.00", Currency::Usd).unwrap();
        let m2 = Money::from_str("100.00", Currency::Eur).unwrap();

        assert!((m1 + m2).is_err());
    }

    #[test]
    fn test_money_round() {
        let m = Money::new(dec!(10.005), Currency::Uah) * dec!(3);
        assert_eq!(m.round().value, dec!(30.02));
    }

    #[test]
    fn test_numeric_codes() {
        assert_eq!(Currency::from_numeric(980), Some(Currency::Uah));
        assert_eq!(Currency::from_numeric(840), Some(Currency::Usd));
        assert_eq!(Currency::from_numeric(978), Some(Currency::Eur));
        assert_eq!(Currency::from_numeric(392), None);

        for currency in Currency::ALL {
            assert_eq!(Currency::from_numeric(currency.numeric_code()), Some(currency));
        }
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" EUR ".parse::<Currency>().unwrap(), Currency::Eur);
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(SpendtrackError::UnknownCurrency(code)) if code == "XYZ"
        ));
    }

    #[test]
    fn test_pair_display_and_inverse() {
        let pair = CurrencyPair::new(Currency::Eur, Currency::Usd);
        assert_eq!(pair.to_string(), "EUR-USD");
        assert_eq!(pair.inverse().to_string(), "USD-EUR");
        assert!(pair.involves(Currency::Usd));
        assert!(!pair.involves(Currency::Uah));
    }

    #[test]
    fn test_currency_serde() {
        let json = serde_json::to_string(&Currency::Uah).unwrap();
        assert_eq!(json, "\"UAH\"");
        let parsed: Currency = serde_json::from_str("\"PLN\"").unwrap();
        assert_eq!(parsed, Currency::Pln);
    }
}
