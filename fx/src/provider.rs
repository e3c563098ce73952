//! Quote source trait and implementations.

use async_trait::async_trait;
use spendtrack_common::time::DurationExt;
use spendtrack_common::RateQuote;
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Default public bank currency endpoint.
pub const DEFAULT_API_URL: &str = "https://api.monobank.ua/bank/currency";

/// Trait for upstream rate feeds.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch the full quote list.
    async fn fetch_quotes(&self) -> FxResult<Vec<RateQuote>>;
}

/// Fetches quotes from the bank's public JSON endpoint.
pub struct BankApiSource {
    url: String,
    client: reqwest::Client,
}

impl BankApiSource {
    /// Create a source for `url` with the given request timeout.
    pub fn new(url: impl Into<String>, timeout: chrono::Duration) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.as_std())
            .user_agent(concat!("spendtrack-fx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FxError::Config(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuoteSource for BankApiSource {
    fn name(&self) -> &str {
        "bank_api"
    }

    async fn fetch_quotes(&self) -> FxResult<Vec<RateQuote>> {
        let resp = self.client.get(&self.url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FxError::Upstream {
                source_name: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        let quotes: Vec<RateQuote> =
            serde_json::from_str(&body).map_err(|e| FxError::Decode(e.to_string()))?;

        debug!(source = self.name(), quotes = quotes.len(), "Fetched quotes");
        Ok(quotes)
    }
}

/// In-memory quote source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct StaticQuoteSource {
    name: String,
    quotes: parking_lot::RwLock<Vec<RateQuote>>,
    failing: std::sync::atomic::AtomicBool,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticQuoteSource {
    /// Create a new static source.
    pub fn new(name: impl Into<String>, quotes: Vec<RateQuote>) -> Self {
        Self {
            name: name.into(),
            quotes: parking_lot::RwLock::new(quotes),
            failing: std::sync::atomic::AtomicBool::new(false),
            fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Replace the served quotes.
    pub fn set_quotes(&self, quotes: Vec<RateQuote>) {
        *self.quotes.write() = quotes;
    }

    /// Make subsequent fetches fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of fetch attempts so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl QuoteSource for StaticQuoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_quotes(&self) -> FxResult<Vec<RateQuote>> {
        use std::sync::atomic::Ordering;

        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FxError::Request(format!("{} unavailable", self.name)));
        }
        Ok(self.quotes.read().clone())
    }
}
