//! Aggregated balances across currencies.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendtrack_common::{Currency, Money};
use spendtrack_fx::{convert_or_passthrough, RateTable};
use tracing::debug;

use crate::transaction::{Transaction, TransactionKind};

/// Totals for one currency, in that currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub currency: Currency,
    pub income: Decimal,
    pub expense: Decimal,
    pub transactions: usize,
}

impl CurrencyBalance {
    /// Create a new zero balance.
    pub fn zero(currency: Currency) -> Self {
        Self {
            currency,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            transactions: 0,
        }
    }

    /// Income minus expense.
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }

    fn record(&mut self, tx: &Transaction) {
        match tx.kind {
            TransactionKind::Income => self.income += tx.amount.value,
            TransactionKind::Expense => self.expense += tx.amount.value,
        }
        self.transactions += 1;
    }
}

/// Balance of a set of transactions, with totals expressed in one target
/// currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Currency the totals are expressed in.
    pub target: Currency,
    /// Per-currency subtotals, unconverted.
    pub by_currency: BTreeMap<Currency, CurrencyBalance>,
    /// Converted income total.
    pub income: Money,
    /// Converted expense total.
    pub expense: Money,
    /// Currencies with no rate into `target`; their amounts were counted
    /// as if already in `target`.
    pub unconverted: Vec<Currency>,
}

impl BalanceSummary {
    /// Aggregate `transactions` and convert the subtotals into `target`.
    pub fn compute<'a, I>(transactions: I, target: Currency, rates: &RateTable) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut by_currency: BTreeMap<Currency, CurrencyBalance> = BTreeMap::new();
        for tx in transactions {
            by_currency
                .entry(tx.amount.currency)
                .or_insert_with(|| CurrencyBalance::zero(tx.amount.currency))
                .record(tx);
        }

        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        let mut unconverted = Vec::new();

        for balance in by_currency.values() {
            let converted_income =
                convert_or_passthrough(rates, &Money::new(balance.income, balance.currency), target);
            let converted_expense =
                convert_or_passthrough(rates, &Money::new(balance.expense, balance.currency), target);

            if converted_income.fallback || converted_expense.fallback {
                debug!(currency = %balance.currency, target = %target, "Balance counted without conversion");
                unconverted.push(balance.currency);
            }

            income += converted_income.output.value;
            expense += converted_expense.output.value;
        }

        Self {
            target,
            by_currency,
            income: Money::new(income, target),
            expense: Money::new(expense, target),
            unconverted,
        }
    }

    /// Converted income minus expense.
    pub fn net(&self) -> Money {
        Money::new(self.income.value - self.expense.value, self.target)
    }

    /// Number of transactions aggregated.
    pub fn transaction_count(&self) -> usize {
        self.by_currency.values().map(|b| b.transactions).sum()
    }

    /// Whether every currency could be converted.
    pub fn is_fully_converted(&self) -> bool {
        self.unconverted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use spendtrack_common::{CurrencyPair, UserId};

    fn rates() -> RateTable {
        [
            (CurrencyPair::new(Currency::Usd, Currency::Uah), dec!(41.05)),
            (CurrencyPair::new(Currency::Eur, Currency::Uah), dec!(43.00)),
        ]
        .into_iter()
        .collect()
    }

    fn tx(kind: TransactionKind, value: Decimal, currency: Currency) -> Transaction {
        Transaction::new(
            UserId::new("alice"),
            kind,
            Money::new(value, currency),
            "misc",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_currency_balance() {
        let mut balance = CurrencyBalance::zero(Currency::Uah);
        balance.record(&tx(TransactionKind::Income, dec!(1000), Currency::Uah));
        balance.record(&tx(TransactionKind::Expense, dec!(250.50), Currency::Uah));

        assert_eq!(balance.net(), dec!(749.50));
        assert_eq!(balance.transactions, 2);
    }

    #[test]
    fn test_summary_converts_into_target() {
        let transactions = vec![
            tx(TransactionKind::Income, dec!(1000), Currency::Usd),
            tx(TransactionKind::Expense, dec!(100), Currency::Eur),
            tx(TransactionKind::Expense, dec!(5000), Currency::Uah),
        ];

        let summary = BalanceSummary::compute(&transactions, Currency::Uah, &rates());

        assert_eq!(summary.income, Money::new(dec!(41050), Currency::Uah));
        assert_eq!(summary.expense, Money::new(dec!(9300), Currency::Uah));
        assert_eq!(summary.net(), Money::new(dec!(31750), Currency::Uah));
        assert_eq!(summary.transaction_count(), 3);
        assert!(summary.is_fully_converted());
        assert_eq!(summary.by_currency[&Currency::Usd].income, dec!(1000));
    }

    #[test]
    fn test_summary_passes_through_missing_rates() {
        let transactions = vec![
            tx(TransactionKind::Income, dec!(200), Currency::Pln),
            tx(TransactionKind::Income, dec!(10), Currency::Usd),
        ];

        let summary = BalanceSummary::compute(&transactions, Currency::Uah, &rates());

        assert_eq!(summary.unconverted, vec![Currency::Pln]);
        assert_eq!(summary.income.value, dec!(610.50));
        assert!(!summary.is_fully_converted());
    }

    #[test]
    fn test_empty_summary() {
        let summary = BalanceSummary::compute(&Vec::<Transaction>::new(), Currency::Eur, &RateTable::new());

        assert!(summary.net().is_zero());
        assert_eq!(summary.transaction_count(), 0);
        assert!(summary.by_currency.is_empty());
    }
}
