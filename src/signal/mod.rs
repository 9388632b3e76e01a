//! Signal generation module
//!
//! Independent evaluators over one symbol's multi-timeframe candles. Each
//! evaluator reads immutable series and returns at most one signal.

mod breakout;
mod liquidity;
mod manipulation;
mod render;
mod smart_money;
mod types;
mod volatility;
mod whale;

pub use breakout::{evaluate_breakout, BreakoutParams};
pub use liquidity::{evaluate_liquidity, LiquidityParams};
pub use manipulation::{evaluate_manipulation, ManipulationParams};
pub use smart_money::{evaluate_smart_money, SmartMoneyParams};
pub use types::{
    Breakout, EvalError, FlowDivergence, LiquidityZone, LiquidityZones, Manipulation, PreTop,
    Signal, SignalPayload, SignalType, SmartMoneyFlow, VolatilitySpike, WhaleActivity,
};
pub use volatility::{evaluate_volatility, VolatilityParams};
pub use whale::{evaluate_whale, WhaleParams};

use crate::feed::CandleSeries;
use crate::levels::Level;
use tracing::{debug, warn};

/// Thresholds for every evaluator
#[derive(Debug, Clone, Default)]
pub struct EvaluatorParams {
    pub breakout: BreakoutParams,
    pub whale: WhaleParams,
    pub volatility: VolatilityParams,
    pub manipulation: ManipulationParams,
    pub liquidity: LiquidityParams,
    pub smart_money: SmartMoneyParams,
}

/// Everything fetched for one symbol in one cycle
#[derive(Debug, Clone, Copy)]
pub struct MarketSnapshot<'a> {
    pub symbol: &'a str,
    pub h1: &'a CandleSeries,
    pub h4: &'a CandleSeries,
    pub m15: &'a CandleSeries,
    pub m5: &'a CandleSeries,
    /// Levels merged across the 1h and 4h series
    pub levels: &'a [Level],
}

/// Run every evaluator over a snapshot
///
/// Evaluator errors never escape: insufficient history is logged at debug,
/// anything else at warn, and the evaluator contributes nothing.
pub fn evaluate_all(snapshot: &MarketSnapshot<'_>, params: &EvaluatorParams) -> Vec<Signal> {
    let symbol = snapshot.symbol;
    let h1 = snapshot.h1.candles();

    let results = [
        (
            "breakout",
            evaluate_breakout(
                symbol,
                h1,
                snapshot.h4.candles(),
                snapshot.levels,
                &params.breakout,
            ),
        ),
        ("whale", evaluate_whale(symbol, snapshot.m15.candles(), &params.whale)),
        ("volatility", evaluate_volatility(symbol, h1, &params.volatility)),
        (
            "manipulation",
            evaluate_manipulation(symbol, snapshot.m5.candles(), &params.manipulation),
        ),
        ("liquidity", evaluate_liquidity(symbol, h1, &params.liquidity)),
        ("smart_money", evaluate_smart_money(symbol, h1, &params.smart_money)),
    ];

    results
        .into_iter()
        .filter_map(|(evaluator, result)| match result {
            Ok(signal) => signal,
            Err(e @ EvalError::InsufficientData { .. }) => {
                debug!(symbol, evaluator, "Skipped: {}", e);
                None
            }
            Err(e) => {
                warn!(symbol, evaluator, error = %e, "Evaluator failed");
                None
            }
        })
        .collect()
}

/// Candle builders shared by the evaluator tests
#[cfg(test)]
pub(crate) mod testing {
    use crate::feed::Candle;
    use chrono::{Duration, TimeZone, Utc};

    fn at(i: usize) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i as i64)
    }

    /// Flat candles where open, high, low and close are all the close
    pub fn candles(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Candle {
                timestamp: at(i),
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect()
    }

    /// (open, high, low, close) rows with unit volume
    pub fn ohlc(rows: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let rows: Vec<_> = rows.iter().map(|&(o, h, l, c)| (o, h, l, c, 1.0)).collect();
        ohlcv(&rows)
    }

    /// (open, high, low, close, volume) rows
    pub fn ohlcv(rows: &[(f64, f64, f64, f64, f64)]) -> Vec<Candle> {
        rows.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close, volume))| Candle {
                timestamp: at(i),
                open,
                high,
                low,
                close,
                volume,
            })
            .collect()
    }
}
