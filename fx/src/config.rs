//! FX configuration.

use chrono::Duration;
use spendtrack_common::time::constants;
use spendtrack_common::Currency;

use crate::feed::QuoteFeedConfig;
use crate::provider::DEFAULT_API_URL;
use crate::resolver::ResolverConfig;

/// Main FX configuration.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Bank currency endpoint.
    pub api_url: String,
    /// Upstream request timeout.
    pub request_timeout: Duration,
    /// Quote snapshot TTL.
    pub quote_ttl: Duration,
    /// Pivot currency.
    pub home: Currency,
    /// Currencies offered for conversion.
    pub tracked: Vec<Currency>,
    /// Currencies with buy/sell quotes used directly against home.
    pub direct: Vec<Currency>,
    /// Clear memoized pair rates whenever a new snapshot is fetched.
    pub reset_memo_on_refresh: bool,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: constants::quote_request_timeout(),
            quote_ttl: constants::quote_snapshot_ttl(),
            home: Currency::Uah,
            tracked: vec![Currency::Uah, Currency::Usd, Currency::Eur],
            direct: vec![Currency::Usd, Currency::Eur],
            reset_memo_on_refresh: true,
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FX_API_URL") {
            config.api_url = url;
        }

        if let Ok(secs) = std::env::var("FX_QUOTE_TTL_SECS") {
            if let Ok(secs) = secs.parse() {
                config.quote_ttl = Duration::seconds(secs);
            }
        }

        if let Ok(secs) = std::env::var("FX_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::seconds(secs);
            }
        }

        if let Ok(home) = std::env::var("FX_HOME_CURRENCY") {
            if let Ok(home) = home.parse() {
                config.home = home;
            }
        }

        if let Ok(list) = std::env::var("FX_TRACKED_CURRENCIES") {
            if let Some(tracked) = parse_currency_list(&list) {
                config.tracked = tracked;
            }
        }

        if let Ok(list) = std::env::var("FX_DIRECT_CURRENCIES") {
            if let Some(direct) = parse_currency_list(&list) {
                config.direct = direct;
            }
        }

        if let Ok(flag) = std::env::var("FX_RESET_MEMO_ON_REFRESH") {
            config.reset_memo_on_refresh = flag.to_lowercase() == "true" || flag == "1";
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.is_empty() {
            return Err("API URL cannot be empty".to_string());
        }

        if self.quote_ttl <= Duration::zero() {
            return Err("Quote TTL must be positive".to_string());
        }

        if self.request_timeout <= Duration::zero() {
            return Err("Request timeout must be positive".to_string());
        }

        if self.tracked.len() < 2 {
            return Err("At least two tracked currencies are required".to_string());
        }

        if !self.tracked.contains(&self.home) {
            return Err(format!("Home currency {} must be tracked", self.home));
        }

        if self.direct.contains(&self.home) {
            return Err(format!(
                "Home currency {} cannot be directly quoted against itself",
                self.home
            ));
        }

        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            home: self.home,
            direct: self.direct.clone(),
        }
    }

    pub fn feed_config(&self) -> QuoteFeedConfig {
        QuoteFeedConfig {
            ttl: self.quote_ttl,
        }
    }
}

/// Parse `"UAH, usd,EUR"`; `None` if any entry is unknown.
fn parse_currency_list(list: &str) -> Option<Vec<Currency>> {
    list.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| code.parse().ok())
        .collect()
}
