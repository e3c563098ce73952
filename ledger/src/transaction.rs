//! Income and expense transactions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendtrack_common::{Money, Result, SpendtrackError, TransactionId, UserId};

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

/// A single recorded transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: TransactionId,
    /// Owner.
    pub user_id: UserId,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Amount, always positive; direction comes from `kind`.
    pub amount: Money,
    /// Free-form category ("groceries", "salary", ...).
    pub category: String,
    /// Optional note.
    pub description: Option<String>,
    /// When the transaction happened.
    pub occurred_at: DateTime<Utc>,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create an income transaction.
    pub fn income(
        user_id: UserId,
        amount: Money,
        category: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self> {
        Self::new(user_id, TransactionKind::Income, amount, category, occurred_at)
    }

    /// Create an expense transaction.
    pub fn expense(
        user_id: UserId,
        amount: Money,
        category: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self> {
        Self::new(user_id, TransactionKind::Expense, amount, category, occurred_at)
    }

    /// Create a transaction, validating the amount and owner.
    pub fn new(
        user_id: UserId,
        kind: TransactionKind,
        amount: Money,
        category: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self> {
        if !amount.is_positive() {
            return Err(SpendtrackError::InvalidAmount(amount.to_string()));
        }
        if !user_id.is_valid() {
            return Err(SpendtrackError::InvalidUser(user_id.to_string()));
        }

        Ok(Self {
            id: TransactionId::new(),
            user_id,
            kind,
            amount,
            category: category.into(),
            description: None,
            occurred_at,
            created_at: Utc::now(),
        })
    }

    /// Attach a note.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Positive for income, negative for expense.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount.value,
            TransactionKind::Expense => -self.amount.value,
        }
    }
}
