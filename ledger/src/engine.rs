//! Core ledger engine implementation.

use std::collections::HashMap;

use parking_lot::RwLock;
use spendtrack_common::time::Period;
use spendtrack_common::{Currency, Result, SpendtrackError, TransactionId, UserId};
use spendtrack_fx::RateTable;
use tracing::{info, instrument};

use crate::balance::BalanceSummary;
use crate::transaction::Transaction;

/// In-memory transaction store.
#[derive(Debug, Default)]
pub struct LedgerEngine {
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl LedgerEngine {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction.
    #[instrument(skip_all, fields(id = %transaction.id, user = %transaction.user_id))]
    pub fn record(&self, transaction: Transaction) -> TransactionId {
        let id = transaction.id;
        info!(
            kind = ?transaction.kind,
            amount = %transaction.amount,
            category = %transaction.category,
            "Recording transaction"
        );
        self.transactions.write().insert(id, transaction);
        id
    }

    /// Remove a transaction, returning it.
    #[instrument(skip(self))]
    pub fn remove(&self, id: TransactionId) -> Result<Transaction> {
        let removed = self
            .transactions
            .write()
            .remove(&id)
            .ok_or(SpendtrackError::TransactionNotFound(id))?;

        info!(user = %removed.user_id, "Transaction removed");
        Ok(removed)
    }

    pub fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.transactions.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.read().is_empty()
    }

    /// A user's transactions, oldest first, optionally limited to `period`.
    pub fn transactions_for(&self, user_id: &UserId, period: Option<Period>) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .read()
            .values()
            .filter(|tx| &tx.user_id == user_id)
            .filter(|tx| period.map_or(true, |p| p.contains(tx.occurred_at)))
            .cloned()
            .collect();

        transactions.sort_by(|a, b| {
            a.occurred_at
                .cmp(&b.occurred_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        transactions
    }

    /// A user's balance with totals converted into `target`.
    #[instrument(skip(self, rates))]
    pub fn balance(
        &self,
        user_id: &UserId,
        target: Currency,
        rates: &RateTable,
        period: Option<Period>,
    ) -> BalanceSummary {
        let transactions = self.transactions_for(user_id, period);
        let summary = BalanceSummary::compute(&transactions, target, rates);

        info!(
            transactions = summary.transaction_count(),
            net = %summary.net(),
            unconverted = summary.unconverted.len(),
            "Balance computed"
        );

        summary
    }
}
