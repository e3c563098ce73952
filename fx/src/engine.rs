//! FX engine: quote feed plus memoized pair resolution.

use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use spendtrack_common::time::Timestamp;
use spendtrack_common::{Currency, Money};
use tracing::{debug, info, instrument};

use crate::cache::CacheStats;
use crate::config::FxConfig;
use crate::conversion::{convert_or_passthrough, Conversion};
use crate::error::FxResult;
use crate::feed::{QuoteFeed, QuoteSnapshot};
use crate::provider::QuoteSource;
use crate::resolver::RateResolver;
use crate::table::RateTable;

/// The main FX engine.
pub struct FxEngine {
    feed: QuoteFeed,
    resolver: RateResolver,
    config: FxConfig,
    /// Fetch time of the snapshot the memo was built from.
    memo_snapshot: Mutex<Option<Timestamp>>,
}

impl FxEngine {
    /// Create a new FX engine over the given quote source.
    pub fn new(source: Arc<dyn QuoteSource>, config: FxConfig) -> Self {
        Self {
            feed: QuoteFeed::new(source, config.feed_config()),
            resolver: RateResolver::new(config.resolver_config()),
            config,
            memo_snapshot: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    pub fn resolver(&self) -> &RateResolver {
        &self.resolver
    }

    /// Rates for every resolvable pair of tracked currencies.
    #[instrument(skip(self))]
    pub async fn currency_rates(&self) -> FxResult<RateTable> {
        let snapshot = self.feed.snapshot().await?;
        let table = self.with_resolver(&snapshot, |resolver| {
            resolver.build_all_pair_rates(&snapshot.quotes, &self.config.tracked)
        });

        info!(
            pairs = table.len(),
            stale = snapshot.stale,
            "Currency rates ready"
        );

        Ok(table)
    }

    /// Rate for one directed pair, `None` if unresolvable.
    #[instrument(skip_all, fields(from = %from, to = %to))]
    pub async fn rate(&self, from: Currency, to: Currency) -> FxResult<Option<Decimal>> {
        let snapshot = self.feed.snapshot().await?;
        Ok(self.with_resolver(&snapshot, |resolver| {
            resolver.resolve_pair_rate(from, to, &snapshot.quotes)
        }))
    }

    /// Convert an amount, passing it through unchanged if no rate exists.
    #[instrument(skip_all, fields(from = %amount.currency, to = %to, value = %amount.value))]
    pub async fn convert(&self, amount: &Money, to: Currency) -> FxResult<Conversion> {
        let table = self.currency_rates().await?;
        Ok(convert_or_passthrough(&table, amount, to))
    }

    /// Get engine statistics.
    pub fn stats(&self) -> FxEngineStats {
        FxEngineStats {
            cache_stats: self.resolver.stats(),
            snapshot_age: self
                .feed
                .last_fetched_at()
                .map(|fetched_at| spendtrack_common::now() - fetched_at),
        }
    }

    /// Drop the quote snapshot and all memoized rates.
    pub fn reset(&self) {
        self.feed.invalidate();
        let mut memo_snapshot = self.memo_snapshot.lock();
        self.resolver.invalidate();
        *memo_snapshot = None;
    }

    /// Run `f` against the resolver whose memo belongs to `snapshot`.
    ///
    /// The memo guard is held for the whole of `f`, so memo writes and a
    /// newer snapshot's reset never interleave. A snapshot older than the
    /// memo is resolved by a throwaway resolver and leaves the memo alone.
    fn with_resolver<T>(&self, snapshot: &QuoteSnapshot, f: impl FnOnce(&RateResolver) -> T) -> T {
        if !self.config.reset_memo_on_refresh {
            return f(&self.resolver);
        }

        let mut memo_snapshot = self.memo_snapshot.lock();
        match *memo_snapshot {
            Some(memo_at) if snapshot.fetched_at < memo_at => {
                debug!(
                    fetched_at = %snapshot.fetched_at,
                    memo_at = %memo_at,
                    "Snapshot older than rate memo, resolving without memo"
                );
                return f(&RateResolver::new(self.config.resolver_config()));
            }
            Some(memo_at) if snapshot.fetched_at > memo_at => {
                debug!(fetched_at = %snapshot.fetched_at, "New quote snapshot, clearing rate memo");
                self.resolver.invalidate();
            }
            _ => {}
        }
        *memo_snapshot = Some(snapshot.fetched_at);

        f(&self.resolver)
    }
}

/// Engine statistics.
#[derive(Debug, Clone)]
pub struct FxEngineStats {
    pub cache_stats: CacheStats,
    pub snapshot_age: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticQuoteSource;
    use rust_decimal_macros::dec;
    use spendtrack_common::RateQuote;

    fn quotes() -> Vec<RateQuote> {
        vec![
            RateQuote::buy_sell(Currency::Usd, Currency::Uah, dec!(41.05), dec!(41.4852)),
            RateQuote::buy_sell(Currency::Eur, Currency::Uah, dec!(43.00), dec!(43.50)),
        ]
    }

    fn setup_engine(config: FxConfig) -> (Arc<StaticQuoteSource>, FxEngine) {
        let source = Arc::new(StaticQuoteSource::new("test", quotes()));
        let engine = FxEngine::new(source.clone(), config);
        (source, engine)
    }

    #[tokio::test]
    async fn test_currency_rates() {
        let (_, engine) = setup_engine(FxConfig::default());

        let table = engine.currency_rates().await.unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(table.get(Currency::Uah, Currency::Usd), Some(dec!(41.4852)));
        assert_eq!(table.get(Currency::Usd, Currency::Uah), Some(dec!(41.05)));
        assert_eq!(table.get(Currency::Eur, Currency::Usd), Some(dec!(1.0486)));
        // 41.4852 / 43.50 = 0.95368...
        assert_eq!(table.get(Currency::Usd, Currency::Eur), Some(dec!(0.9537)));
    }

    #[tokio::test]
    async fn test_rate_and_convert() {
        let (_, engine) = setup_engine(FxConfig::default());

        assert_eq!(
            engine.rate(Currency::Usd, Currency::Uah).await.unwrap(),
            Some(dec!(41.05))
        );

        let conversion = engine
            .convert(&Money::new(dec!(100), Currency::Usd), Currency::Uah)
            .await
            .unwrap();
        assert_eq!(conversion.output, Money::new(dec!(4105), Currency::Uah));
        assert!(!conversion.fallback);

        // 100 / 41.4852 = 2.4104...
        let conversion = engine
            .convert(&Money::new(dec!(100), Currency::Uah), Currency::Usd)
            .await
            .unwrap();
        assert_eq!(conversion.output, Money::new(dec!(2.41), Currency::Usd));
    }

    #[tokio::test]
    async fn test_untracked_conversion_passes_through() {
        let (_, engine) = setup_engine(FxConfig::default());

        let conversion = engine
            .convert(&Money::new(dec!(50), Currency::Pln), Currency::Uah)
            .await
            .unwrap();

        assert!(conversion.fallback);
        assert_eq!(conversion.output.value, dec!(50));
    }

    #[tokio::test]
    async fn test_memo_reset_on_new_snapshot() {
        let config = FxConfig {
            quote_ttl: Duration::milliseconds(1),
            ..Default::default()
        };
        let (source, engine) = setup_engine(config);

        engine.currency_rates().await.unwrap();
        source.set_quotes(vec![RateQuote::buy_sell(
            Currency::Usd,
            Currency::Uah,
            dec!(40.00),
            dec!(40.50),
        )]);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let table = engine.currency_rates().await.unwrap();

        assert_eq!(table.get(Currency::Usd, Currency::Uah), Some(dec!(40.00)));
        assert_eq!(table.get(Currency::Uah, Currency::Eur), None);
    }

    #[tokio::test]
    async fn test_older_snapshot_does_not_repopulate_memo() {
        let (source, engine) = setup_engine(FxConfig::default());

        // A request picks up the first snapshot and is delayed.
        let older = engine.feed.snapshot().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        // Meanwhile quotes change and another request refreshes.
        source.set_quotes(vec![RateQuote::buy_sell(
            Currency::Usd,
            Currency::Uah,
            dec!(40.00),
            dec!(40.50),
        )]);
        engine.feed.invalidate();
        engine.rate(Currency::Eur, Currency::Usd).await.unwrap();

        // The delayed request finishes on its own snapshot.
        let delayed = engine.with_resolver(&older, |resolver| {
            resolver.build_all_pair_rates(&older.quotes, &engine.config.tracked)
        });
        assert_eq!(delayed.get(Currency::Usd, Currency::Uah), Some(dec!(41.05)));

        let table = engine.currency_rates().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
        assert_eq!(table.get(Currency::Usd, Currency::Uah), Some(dec!(40.00)));
        assert_eq!(table.get(Currency::Uah, Currency::Usd), Some(dec!(40.50)));
    }

    #[tokio::test]
    async fn test_memo_kept_across_snapshots_when_disabled() {
        let config = FxConfig {
            quote_ttl: Duration::milliseconds(1),
            reset_memo_on_refresh: false,
            ..Default::default()
        };
        let (source, engine) = setup_engine(config);

        engine.currency_rates().await.unwrap();
        source.set_quotes(vec![]);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let table = engine.currency_rates().await.unwrap();

        assert_eq!(source.fetch_count(), 2);
        assert_eq!(table.get(Currency::Usd, Currency::Uah), Some(dec!(41.05)));
    }

    #[tokio::test]
    async fn test_stale_snapshot_still_serves_rates() {
        let config = FxConfig {
            quote_ttl: Duration::milliseconds(1),
            ..Default::default()
        };
        let (source, engine) = setup_engine(config);

        engine.currency_rates().await.unwrap();
        source.set_failing(true);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let table = engine.currency_rates().await.unwrap();
        assert_eq!(table.len(), 6);
        assert!(engine.stats().snapshot_age.is_some());
    }

    #[tokio::test]
    async fn test_no_snapshot_propagates_error() {
        let (source, engine) = setup_engine(FxConfig::default());
        source.set_failing(true);

        assert!(engine.currency_rates().await.is_err());
        assert!(engine.stats().snapshot_age.is_none());
    }

    #[tokio::test]
    async fn test_reset() {
        let (source, engine) = setup_engine(FxConfig::default());

        engine.currency_rates().await.unwrap();
        assert_eq!(engine.stats().cache_stats.total_entries, 6);

        engine.reset();
        assert_eq!(engine.stats().cache_stats.total_entries, 0);

        engine.currency_rates().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }
}
