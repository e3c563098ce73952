//! Spendtrack Ledger
//!
//! Per-user income and expense records with balances reported in any
//! tracked currency.

pub mod balance;
pub mod engine;
pub mod transaction;

pub use balance::{BalanceSummary, CurrencyBalance};
pub use engine::LedgerEngine;
pub use transaction::{Transaction, TransactionKind};
