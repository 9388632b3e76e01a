//! Candidate symbol selection
//!
//! Narrows the exchange-wide 24h ticker list down to the liquid, volatile
//! symbols worth evaluating each cycle

use crate::feed::TickerSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Leveraged-token base suffixes
const LEVERAGED_SUFFIXES: [&str; 4] = ["UP", "DOWN", "BULL", "BEAR"];

/// Universe filter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UniverseFilter {
    /// Quote asset every candidate must trade against
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,

    /// Minimum 24h quote volume (exclusive)
    #[serde(default = "default_min_quote_volume")]
    pub min_quote_volume: Decimal,

    /// Number of symbols kept after ranking
    #[serde(default = "default_top_n")]
    pub top_n_symbols: usize,

    /// Base assets never selected
    #[serde(default = "default_excluded_bases")]
    pub excluded_bases: Vec<String>,

    /// Full symbols never selected
    #[serde(default)]
    pub excluded_symbols: Vec<String>,

    /// Drop leveraged tokens such as BTCUPUSDT
    ///
    /// A base counts as leveraged only when it is a listed underlying plus
    /// one of the suffixes, so JUP or SYRUP are never caught.
    #[serde(default)]
    pub exclude_leveraged: bool,
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}
fn default_min_quote_volume() -> Decimal {
    Decimal::new(5_000_000, 0)
}
fn default_top_n() -> usize {
    30
}
fn default_excluded_bases() -> Vec<String> {
    ["USDC", "BUSD", "TUSD", "FDUSD", "USDP", "DAI", "EUR", "AEUR"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for UniverseFilter {
    fn default() -> Self {
        Self {
            quote_asset: default_quote_asset(),
            min_quote_volume: default_min_quote_volume(),
            top_n_symbols: default_top_n(),
            excluded_bases: default_excluded_bases(),
            excluded_symbols: Vec::new(),
            exclude_leveraged: false,
        }
    }
}

impl UniverseFilter {
    fn admits(&self, ticker: &TickerSnapshot, listed: &HashSet<&str>) -> bool {
        let Some(base) = ticker.symbol.strip_suffix(&self.quote_asset) else {
            return false;
        };
        if base.is_empty() || ticker.quote_volume_24h <= self.min_quote_volume {
            return false;
        }
        if self.excluded_symbols.iter().any(|s| s == &ticker.symbol)
            || self.excluded_bases.iter().any(|b| b == base)
        {
            return false;
        }
        !(self.exclude_leveraged && self.is_leveraged(base, listed))
    }

    fn is_leveraged(&self, base: &str, listed: &HashSet<&str>) -> bool {
        LEVERAGED_SUFFIXES.iter().any(|suffix| match base.strip_suffix(*suffix) {
            Some(underlying) if !underlying.is_empty() => {
                let underlying_symbol = format!("{underlying}{}", self.quote_asset);
                listed.contains(underlying_symbol.as_str())
            }
            _ => false,
        })
    }
}

/// Select the symbols to evaluate this cycle
///
/// Ranked by absolute 24h price change, then 24h quote volume, both
/// descending. At most `top_n_symbols` are returned.
pub fn select(tickers: &[TickerSnapshot], filter: &UniverseFilter) -> Vec<String> {
    let listed: HashSet<&str> = tickers.iter().map(|t| t.symbol.as_str()).collect();
    let mut candidates: Vec<&TickerSnapshot> =
        tickers.iter().filter(|t| filter.admits(t, &listed)).collect();

    candidates.sort_by(|a, b| {
        b.price_change_pct_24h
            .abs()
            .cmp(&a.price_change_pct_24h.abs())
            .then_with(|| b.quote_volume_24h.cmp(&a.quote_volume_24h))
    });

    candidates
        .into_iter()
        .take(filter.top_n_symbols)
        .map(|t| t.symbol.clone())
        .collect()
}
