//! Error types shared across spendtrack crates.

use crate::{Currency, TransactionId};
use thiserror::Error;

/// Main error type for spendtrack operations.
#[derive(Error, Debug)]
pub enum SpendtrackError {
    /// Currency code not in the supported set.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch in an arithmetic operation.
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: Currency, actual: Currency },

    /// Transaction amount must be strictly positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Invalid user identifier.
    #[error("Invalid user: {0}")]
    InvalidUser(String),

    /// Exchange rates could not be obtained.
    #[error("Rates unavailable: {0}")]
    RatesUnavailable(String),

    /// Network error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl SpendtrackError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SpendtrackError::RatesUnavailable(_)
                | SpendtrackError::NetworkError(_)
        )
    }

    /// Stable error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            SpendtrackError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            SpendtrackError::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            SpendtrackError::InvalidAmount(_) => "INVALID_AMOUNT",
            SpendtrackError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            SpendtrackError::InvalidUser(_) => "INVALID_USER",
            SpendtrackError::RatesUnavailable(_) => "RATES_UNAVAILABLE",
            SpendtrackError::NetworkError(_) => "NETWORK_ERROR",
            SpendtrackError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl From<crate::CurrencyMismatchError> for SpendtrackError {
    fn from(err: crate::CurrencyMismatchError) -> Self {
        SpendtrackError::CurrencyMismatch {
            expected: err.expected,
            actual: err.actual,
        }
    }
}

/// Result type alias for spendtrack operations.
pub type Result<T> = std::result::Result<T, SpendtrackError>;
