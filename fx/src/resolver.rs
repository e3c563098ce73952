//! Currency pair rate resolution over a raw quote snapshot.

use rust_decimal::Decimal;
use spendtrack_common::{Currency, CurrencyPair, RateQuote};
use std::collections::BTreeSet;
use tracing::{debug, instrument, trace};

use crate::cache::{CacheStats, RateCache};
use crate::strategy::{ResolutionStrategy, ResolveContext};
use crate::table::RateTable;

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Pivot currency.
    pub home: Currency,
    /// Foreign currencies whose buy/sell quotes against home are used
    /// directly, without falling back to cross rates.
    pub direct: Vec<Currency>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            home: Currency::Uah,
            direct: vec![Currency::Usd, Currency::Eur],
        }
    }
}

/// Resolves rates between tracked currencies, memoizing every attempt.
///
/// A memoized pair is answered from the cache without consulting the quotes
/// passed in; call [`RateResolver::invalidate`] when a new snapshot should
/// take effect.
#[derive(Debug, Default)]
pub struct RateResolver {
    config: ResolverConfig,
    cache: RateCache,
}

impl RateResolver {
    /// Create a resolver with the given configuration.
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            cache: RateCache::new(),
        }
    }

    /// Pivot currency.
    pub fn home(&self) -> Currency {
        self.config.home
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    /// Rate for `from -> to`, or `None` when no resolution path exists.
    ///
    /// Rates out of home are the bank's home-unit price of `to`; every
    /// other rate is the amount of `to` per unit of `from`.
    pub fn resolve_pair_rate(
        &self,
        from: Currency,
        to: Currency,
        quotes: &[RateQuote],
    ) -> Option<Decimal> {
        let pair = CurrencyPair::new(from, to);
        if pair.is_identity() {
            return Some(Decimal::ONE);
        }

        self.cache
            .get_or_insert_with(pair, || self.resolve_uncached(pair, quotes))
    }

    /// Resolve every ordered pair of distinct `tracked` currencies,
    /// keeping only the resolvable ones.
    #[instrument(skip(self, quotes, tracked), fields(quote_count = quotes.len()))]
    pub fn build_all_pair_rates(&self, quotes: &[RateQuote], tracked: &[Currency]) -> RateTable {
        let currencies: BTreeSet<Currency> = tracked.iter().copied().collect();
        let mut table = RateTable::new().with_home(self.config.home);

        for &from in &currencies {
            for &to in &currencies {
                if from == to {
                    continue;
                }
                if let Some(rate) = self.resolve_pair_rate(from, to, quotes) {
                    table.insert(CurrencyPair::new(from, to), rate);
                }
            }
        }

        debug!(
            tracked = currencies.len(),
            resolved = table.len(),
            "Built pair rate table"
        );

        table
    }

    /// Drop every memoized resolution.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn resolve_uncached(&self, pair: CurrencyPair, quotes: &[RateQuote]) -> Option<Decimal> {
        let ctx = ResolveContext {
            home: self.config.home,
            direct: &self.config.direct,
            quotes,
        };

        for strategy in ResolutionStrategy::ORDERED {
            if let Some(rate) = strategy.attempt(pair, &ctx) {
                trace!(pair = %pair, strategy = %strategy, rate = %rate, "Resolved pair");
                return Some(rate);
            }
        }

        debug!(pair = %pair, "Pair unresolvable");
        None
    }
}
