//! Spendtrack FX
//!
//! Resolves exchange rates between tracked currencies from a sparse,
//! asymmetric set of bank quotes, using the home currency as pivot.
//!
//! # Features
//!
//! - Direction-aware buy/sell picks for directly quoted currencies
//! - Published cross rates and pivot-derived cross rates as fallbacks
//! - Concurrency-safe memoization of every resolution attempt
//! - Bank feed client with a short-lived snapshot cache and last
//!   known-good fallback
//!
//! # Example
//!
//! ```rust,ignore
//! use spendtrack_fx::{BankApiSource, FxConfig, FxEngine};
//!
//! let config = FxConfig::from_env();
//! let source = Arc::new(BankApiSource::new(&config.api_url, config.request_timeout)?);
//! let engine = FxEngine::new(source, config);
//!
//! let rates = engine.currency_rates().await?;
//! let eur_usd = rates.get(Currency::Eur, Currency::Usd);
//! ```

pub mod cache;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod feed;
pub mod provider;
pub mod resolver;
pub mod strategy;
pub mod table;

pub use cache::RateCache;
pub use config::FxConfig;
pub use conversion::{convert_or_passthrough, Conversion};
pub use engine::{FxEngine, FxEngineStats};
pub use error::{FxError, FxResult};
pub use feed::{QuoteFeed, QuoteFeedConfig, QuoteSnapshot};
pub use provider::{BankApiSource, QuoteSource};
pub use resolver::{RateResolver, ResolverConfig};
pub use strategy::ResolutionStrategy;
pub use table::RateTable;

#[cfg(any(test, feature = "test-utils"))]
pub use provider::StaticQuoteSource;
