//! Memo of resolved pair rates.

use dashmap::DashMap;
use rust_decimal::Decimal;
use spendtrack_common::CurrencyPair;
use tracing::debug;

/// Thread-safe memo of pair resolutions.
///
/// A stored `None` records that the pair was attempted and could not be
/// resolved. Entries are never evicted by size; the key space is bounded by
/// the square of the tracked currency count.
#[derive(Debug, Default)]
pub struct RateCache {
    cache: DashMap<CurrencyPair, Option<Decimal>>,
}

impl RateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Look up a memoized resolution.
    ///
    /// Outer `None` is a miss; `Some(None)` is a cached unresolvable pair.
    pub fn get(&self, pair: &CurrencyPair) -> Option<Option<Decimal>> {
        match self.cache.get(pair) {
            Some(entry) => {
                debug!(pair = %pair, resolved = entry.is_some(), "Cache hit");
                Some(*entry)
            }
            None => {
                debug!(pair = %pair, "Cache miss");
                None
            }
        }
    }

    /// Record a resolution attempt.
    pub fn insert(&self, pair: CurrencyPair, rate: Option<Decimal>) {
        self.cache.insert(pair, rate);
    }

    /// Return the memoized value, computing and storing it on a miss.
    ///
    /// Concurrent callers for the same pair may both compute; the stored
    /// value is the same since resolution is deterministic for a snapshot.
    pub fn get_or_insert_with<F>(&self, pair: CurrencyPair, resolve: F) -> Option<Decimal>
    where
        F: FnOnce() -> Option<Decimal>,
    {
        if let Some(cached) = self.get(&pair) {
            return cached;
        }
        let rate = resolve();
        *self.cache.entry(pair).or_insert(rate)
    }

    /// Forget one pair.
    pub fn remove(&self, pair: &CurrencyPair) {
        self.cache.remove(pair);
    }

    /// Clear all memoized rates.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of entries in cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Whether the pair has been attempted.
    pub fn contains(&self, pair: &CurrencyPair) -> bool {
        self.cache.contains_key(pair)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.cache.len();
        let resolved = self.cache.iter().filter(|e| e.value().is_some()).count();

        CacheStats {
            total_entries: total,
            resolved_entries: resolved,
            unresolvable_entries: total - resolved,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub resolved_entries: usize,
    pub unresolvable_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use spendtrack_common::Currency;

    fn pair(from: Currency, to: Currency) -> CurrencyPair {
        CurrencyPair::new(from, to)
    }

    #[test]
    fn test_cache_insert_and_get() {
        let cache = RateCache::new();
        let usd_uah = pair(Currency::Usd, Currency::Uah);

        cache.insert(usd_uah, Some(dec!(41.05)));

        assert_eq!(cache.get(&usd_uah), Some(Some(dec!(41.05))));
    }

    #[test]
    fn test_cache_miss_vs_unresolvable() {
        let cache = RateCache::new();
        let gbp_pln = pair(Currency::Gbp, Currency::Pln);

        assert_eq!(cache.get(&gbp_pln), None);

        cache.insert(gbp_pln, None);

        assert_eq!(cache.get(&gbp_pln), Some(None));
        assert!(cache.contains(&gbp_pln));
    }

    #[test]
    fn test_directed_keys_are_independent() {
        let cache = RateCache::new();
        let uah_usd = pair(Currency::Uah, Currency::Usd);

        cache.insert(uah_usd, Some(dec!(41.4852)));

        assert!(cache.get(&uah_usd.inverse()).is_none());
    }

    #[test]
    fn test_get_or_insert_with_computes_once() {
        let cache = RateCache::new();
        let eur_usd = pair(Currency::Eur, Currency::Usd);
        let mut calls = 0;

        let first = cache.get_or_insert_with(eur_usd, || {
            calls += 1;
            Some(dec!(1.0486))
        });
        let second = cache.get_or_insert_with(eur_usd, || {
            calls += 1;
            Some(dec!(99))
        });

        assert_eq!(first, Some(dec!(1.0486)));
        assert_eq!(second, Some(dec!(1.0486)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_cache_stats_and_clear() {
        let cache = RateCache::new();
        cache.insert(pair(Currency::Usd, Currency::Uah), Some(dec!(41.05)));
        cache.insert(pair(Currency::Gbp, Currency::Pln), None);

        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 2,
                resolved_entries: 1,
                unresolvable_entries: 1,
            }
        );

        cache.remove(&pair(Currency::Gbp, Currency::Pln));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
