//! FX error types.

use spendtrack_common::CurrencyPair;
use thiserror::Error;

/// Errors that can occur around rate fetching and conversion.
///
/// Pair resolution itself never fails: an unresolvable pair is `None`.
#[derive(Debug, Error)]
pub enum FxError {
    /// Rate not available for the requested currency pair.
    #[error("Rate not available for {0}")]
    RateNotAvailable(CurrencyPair),

    /// The upstream feed answered with an error status.
    #[error("Rate feed {source_name} returned status {status}")]
    Upstream { source_name: String, status: u16 },

    /// The upstream feed could not be reached.
    #[error("Rate feed request failed: {0}")]
    Request(String),

    /// The upstream payload could not be decoded.
    #[error("Rate feed payload invalid: {0}")]
    Decode(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FxError {
    /// Whether retrying the fetch later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FxError::Upstream { .. } | FxError::Request(_))
    }
}

impl From<reqwest::Error> for FxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FxError::Decode(err.to_string())
        } else {
            FxError::Request(err.to_string())
        }
    }
}

impl From<FxError> for spendtrack_common::SpendtrackError {
    fn from(err: FxError) -> Self {
        use spendtrack_common::SpendtrackError;
        match err {
            FxError::Config(msg) => SpendtrackError::ConfigurationError(msg),
            FxError::Request(msg) => SpendtrackError::NetworkError(msg),
            other => SpendtrackError::RatesUnavailable(other.to_string()),
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
