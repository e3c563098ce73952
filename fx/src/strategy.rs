//! Ordered pair resolution strategies.
//!
//! Each strategy either produces a rate for a directed pair or yields
//! `None`, in which case the resolver moves on to the next one.

use rust_decimal::{Decimal, RoundingStrategy};
use spendtrack_common::{Currency, CurrencyPair, RateQuote};
use std::fmt;

/// Decimal places kept for rates derived through the home currency.
pub const CROSS_RATE_DECIMALS: u32 = 4;

/// Inputs shared by all strategies for one resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Pivot currency most quotes are expressed in.
    pub home: Currency,
    /// Foreign currencies with published buy/sell quotes against home.
    pub direct: &'a [Currency],
    /// Raw feed snapshot.
    pub quotes: &'a [RateQuote],
}

impl<'a> ResolveContext<'a> {
    /// First `(currency, home)` quote carrying the requested side.
    fn home_quote_side<F>(&self, currency: Currency, side: F) -> Option<Decimal>
    where
        F: Fn(&RateQuote) -> Option<Decimal>,
    {
        self.quotes
            .iter()
            .filter(|q| q.quotes(currency, self.home))
            .find_map(side)
    }

    /// First cross rate published with `currency` as the quoted side.
    fn cross_rate(&self, currency: Currency) -> Option<Decimal> {
        self.quotes
            .iter()
            .filter(|q| q.is_quoted(currency))
            .find_map(|q| q.rate_cross)
    }

    /// Home-denominated value of one unit of `currency`: the bank's sell
    /// side when quoted directly, otherwise its cross rate.
    fn pivot_leg(&self, currency: Currency) -> Option<Decimal> {
        if currency == self.home {
            return Some(Decimal::ONE);
        }
        self.home_quote_side(currency, |q| q.rate_sell)
            .or_else(|| self.cross_rate(currency))
    }
}

/// Resolution strategies, tried in [`ResolutionStrategy::ORDERED`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Buy/sell quote between home and a directly quoted currency.
    DirectQuote,
    /// Published cross rate for a pair involving home.
    HomeCrossRate,
    /// Ratio of both currencies' home-denominated legs.
    PivotCrossRate,
}

impl ResolutionStrategy {
    /// Precedence used by the resolver.
    pub const ORDERED: [ResolutionStrategy; 3] = [
        ResolutionStrategy::DirectQuote,
        ResolutionStrategy::HomeCrossRate,
        ResolutionStrategy::PivotCrossRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResolutionStrategy::DirectQuote => "direct_quote",
            ResolutionStrategy::HomeCrossRate => "home_cross_rate",
            ResolutionStrategy::PivotCrossRate => "pivot_cross_rate",
        }
    }

    /// Attempt to resolve `pair`.
    pub fn attempt(&self, pair: CurrencyPair, ctx: &ResolveContext<'_>) -> Option<Decimal> {
        match self {
            ResolutionStrategy::DirectQuote => direct_quote(pair, ctx),
            ResolutionStrategy::HomeCrossRate => home_cross_rate(pair, ctx),
            ResolutionStrategy::PivotCrossRate => pivot_cross_rate(pair, ctx),
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `home -> f` uses the bank's sell rate, `f -> home` its buy rate, both
/// from the `(f, home)` quote. The two are deliberately not reciprocal.
fn direct_quote(pair: CurrencyPair, ctx: &ResolveContext<'_>) -> Option<Decimal> {
    if pair.from == ctx.home && ctx.direct.contains(&pair.to) {
        ctx.home_quote_side(pair.to, |q| q.rate_sell)
    } else if pair.to == ctx.home && ctx.direct.contains(&pair.from) {
        ctx.home_quote_side(pair.from, |q| q.rate_buy)
    } else {
        None
    }
}

fn home_cross_rate(pair: CurrencyPair, ctx: &ResolveContext<'_>) -> Option<Decimal> {
    if !pair.involves(ctx.home) {
        return None;
    }
    ctx.cross_rate(pair.from)
        .or_else(|| ctx.cross_rate(pair.to))
}

fn pivot_cross_rate(pair: CurrencyPair, ctx: &ResolveContext<'_>) -> Option<Decimal> {
    if pair.involves(ctx.home) {
        return None;
    }
    let to_pivot = ctx.pivot_leg(pair.from)?;
    let from_pivot = ctx.pivot_leg(pair.to)?;
    if to_pivot.is_zero() || from_pivot.is_zero() {
        return None;
    }
    to_pivot
        .checked_div(from_pivot)
        .map(|rate| rate.round_dp_with_strategy(CROSS_RATE_DECIMALS, RoundingStrategy::MidpointAwayFromZero))
}
