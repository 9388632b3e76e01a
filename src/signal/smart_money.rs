//! Smart-money flow: directional volume against price direction

use super::types::{
    finite, require, EvalError, FlowDivergence, Signal, SignalPayload, SmartMoneyFlow,
};
use crate::feed::Candle;
use crate::indicators::{change_over, mean};

#[derive(Debug, Clone)]
pub struct SmartMoneyParams {
    pub min_candles: usize,
    /// Periods for the price and volume change comparison
    pub lookback: usize,
    /// Minimum |price change| that counts as a move (default 1%)
    pub min_price_move: f64,
    /// Buy ratio above which flow is buy-dominated
    pub buy_dominance: f64,
    /// Buy ratio below which flow is sell-dominated
    pub sell_dominance: f64,
    /// Confidence assigned to any non-neutral classification
    pub divergence_confidence: f64,
}

impl Default for SmartMoneyParams {
    fn default() -> Self {
        Self {
            min_candles: 50,
            lookback: 20,
            min_price_move: 0.01,
            buy_dominance: 0.55,
            sell_dominance: 0.45,
            divergence_confidence: 0.5,
        }
    }
}

/// Classify accumulated buy/sell volume against recent price direction
pub fn evaluate_smart_money(
    symbol: &str,
    h1: &[Candle],
    params: &SmartMoneyParams,
) -> Result<Option<Signal>, EvalError> {
    require(h1.len(), params.min_candles.max(2 * params.lookback + 1))?;

    let (buy_volume, sell_volume) = h1.iter().fold((0.0, 0.0), |(buy, sell), c| {
        if c.close > c.open {
            (buy + c.volume, sell)
        } else if c.close < c.open {
            (buy, sell + c.volume)
        } else {
            (buy, sell)
        }
    });
    let directional = buy_volume + sell_volume;
    let buy_ratio = if directional > 0.0 {
        finite(buy_volume / directional, "buy ratio")?
    } else {
        0.5
    };

    let closes: Vec<f64> = h1.iter().map(|c| c.close).collect();
    let price_change = change_over(&closes, params.lookback).unwrap_or(0.0);

    let volumes: Vec<f64> = h1.iter().map(|c| c.volume).collect();
    let n = volumes.len();
    let recent = mean(&volumes[n - params.lookback..]).unwrap_or(0.0);
    let prior = mean(&volumes[n - 2 * params.lookback..n - params.lookback]).unwrap_or(0.0);
    let volume_change = if prior > 0.0 { recent / prior - 1.0 } else { 0.0 };

    let divergence = classify(buy_ratio, price_change, volume_change, params);
    let confidence = if divergence == FlowDivergence::Neutral {
        0.0
    } else {
        params.divergence_confidence
    };

    Ok(Some(Signal::new(
        symbol,
        confidence,
        SignalPayload::SmartMoneyFlow(SmartMoneyFlow {
            buy_volume,
            sell_volume,
            buy_ratio,
            price_change,
            volume_change,
            divergence,
        }),
    )))
}

fn classify(
    buy_ratio: f64,
    price_change: f64,
    volume_change: f64,
    params: &SmartMoneyParams,
) -> FlowDivergence {
    let rising = price_change >= params.min_price_move;
    let falling = price_change <= -params.min_price_move;
    let buying = buy_ratio > params.buy_dominance;
    let selling = buy_ratio < params.sell_dominance;
    let fading = volume_change < 0.0;

    match (rising, falling, buying, selling) {
        (false, true, true, _) => FlowDivergence::Bullish,
        (true, false, _, true) => FlowDivergence::Bearish,
        (true, false, true, _) if fading => FlowDivergence::HiddenBearish,
        (false, true, _, true) if fading => FlowDivergence::HiddenBullish,
        _ => FlowDivergence::Neutral,
    }
}
