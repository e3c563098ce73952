//! Short-lived snapshot cache in front of a quote source.

use chrono::Duration;
use parking_lot::RwLock;
use spendtrack_common::time::{constants, now, Timestamp};
use spendtrack_common::RateQuote;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::FxResult;
use crate::provider::QuoteSource;

/// Configuration for the quote feed.
#[derive(Debug, Clone)]
pub struct QuoteFeedConfig {
    /// How long a fetched snapshot is served before refetching.
    pub ttl: Duration,
}

impl Default for QuoteFeedConfig {
    fn default() -> Self {
        Self {
            ttl: constants::quote_snapshot_ttl(),
        }
    }
}

/// Quotes as of one successful fetch.
#[derive(Debug, Clone)]
pub struct QuoteSnapshot {
    pub quotes: Arc<Vec<RateQuote>>,
    pub fetched_at: Timestamp,
    /// Set when the latest refresh failed and this is the last known-good
    /// snapshot.
    pub stale: bool,
}

impl QuoteSnapshot {
    pub fn age(&self) -> Duration {
        now() - self.fetched_at
    }
}

#[derive(Debug, Clone)]
struct Cached {
    quotes: Arc<Vec<RateQuote>>,
    fetched_at: Timestamp,
}

impl Cached {
    fn is_fresh(&self, ttl: Duration) -> bool {
        now() - self.fetched_at < ttl
    }

    fn snapshot(&self, stale: bool) -> QuoteSnapshot {
        QuoteSnapshot {
            quotes: Arc::clone(&self.quotes),
            fetched_at: self.fetched_at,
            stale,
        }
    }
}

/// Serves quote snapshots, refetching at most once per TTL and falling back
/// to the last known-good snapshot when the source fails.
pub struct QuoteFeed {
    source: Arc<dyn QuoteSource>,
    config: QuoteFeedConfig,
    current: RwLock<Option<Cached>>,
    refresh: Mutex<()>,
}

impl QuoteFeed {
    /// Create a feed over `source`.
    pub fn new(source: Arc<dyn QuoteSource>, config: QuoteFeedConfig) -> Self {
        Self {
            source,
            config,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Current snapshot, refreshing it if older than the TTL.
    ///
    /// Fails only when the source fails and nothing was ever fetched.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn snapshot(&self) -> FxResult<QuoteSnapshot> {
        if let Some(fresh) = self.fresh() {
            return Ok(fresh);
        }

        // One refresh at a time; late arrivals reuse its result.
        let _guard = self.refresh.lock().await;
        if let Some(fresh) = self.fresh() {
            return Ok(fresh);
        }

        match self.source.fetch_quotes().await {
            Ok(quotes) => {
                let cached = Cached {
                    quotes: Arc::new(quotes),
                    fetched_at: now(),
                };
                info!(quotes = cached.quotes.len(), "Quote snapshot refreshed");
                let snapshot = cached.snapshot(false);
                *self.current.write() = Some(cached);
                Ok(snapshot)
            }
            Err(e) => {
                let last = self.current.read().clone();
                match last {
                    Some(last) => {
                        warn!(
                            error = %e,
                            fetched_at = %last.fetched_at,
                            "Quote refresh failed, serving last known-good snapshot"
                        );
                        Ok(last.snapshot(true))
                    }
                    None => {
                        warn!(error = %e, "Quote refresh failed with no snapshot to fall back on");
                        Err(e)
                    }
                }
            }
        }
    }

    /// When the current snapshot was fetched.
    pub fn last_fetched_at(&self) -> Option<Timestamp> {
        self.current.read().as_ref().map(|c| c.fetched_at)
    }

    /// Forget the current snapshot so the next call refetches.
    pub fn invalidate(&self) {
        *self.current.write() = None;
    }

    fn fresh(&self) -> Option<QuoteSnapshot> {
        let current = self.current.read();
        let cached = current.as_ref()?;
        if cached.is_fresh(self.config.ttl) {
            debug!("Serving cached quote snapshot");
            Some(cached.snapshot(false))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;
    use crate::provider::StaticQuoteSource;
    use rust_decimal_macros::dec;
    use spendtrack_common::Currency;

    fn usd_quote() -> RateQuote {
        RateQuote::buy_sell(Currency::Usd, Currency::Uah, dec!(41.05), dec!(41.4852))
    }

    fn feed_with(ttl: Duration) -> (Arc<StaticQuoteSource>, QuoteFeed) {
        let source = Arc::new(StaticQuoteSource::new("test", vec![usd_quote()]));
        let feed = QuoteFeed::new(source.clone(), QuoteFeedConfig { ttl });
        (source, feed)
    }

    #[tokio::test]
    async fn test_fresh_snapshot_is_reused() {
        let (source, feed) = feed_with(Duration::seconds(60));

        let first = feed.snapshot().await.unwrap();
        let second = feed.snapshot().await.unwrap();

        assert_eq!(source.fetch_count(), 1);
        assert!(!second.stale);
        assert_eq!(first.fetched_at, second.fetched_at);
        assert_eq!(second.quotes.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_refetched() {
        let (source, feed) = feed_with(Duration::zero());

        feed.snapshot().await.unwrap();
        source.set_quotes(vec![]);
        let snapshot = feed.snapshot().await.unwrap();

        assert_eq!(source.fetch_count(), 2);
        assert!(snapshot.quotes.is_empty());
    }

    #[tokio::test]
    async fn test_failure_serves_last_known_good() {
        let (source, feed) = feed_with(Duration::zero());

        let good = feed.snapshot().await.unwrap();
        source.set_failing(true);
        let fallback = feed.snapshot().await.unwrap();

        assert!(fallback.stale);
        assert_eq!(fallback.fetched_at, good.fetched_at);
        assert_eq!(*fallback.quotes, vec![usd_quote()]);
    }

    #[tokio::test]
    async fn test_failure_without_snapshot_propagates() {
        let (source, feed) = feed_with(Duration::seconds(60));
        source.set_failing(true);

        let result = feed.snapshot().await;

        assert!(matches!(result, Err(FxError::Request(_))));
        assert!(feed.last_fetched_at().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (source, feed) = feed_with(Duration::seconds(60));

        feed.snapshot().await.unwrap();
        feed.invalidate();
        feed.snapshot().await.unwrap();

        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let (source, feed) = feed_with(Duration::seconds(60));
        let feed = Arc::new(feed);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let feed = Arc::clone(&feed);
                tokio::spawn(async move { feed.snapshot().await.map(|s| s.quotes.len()) })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        }
        assert_eq!(source.fetch_count(), 1);
    }
}
