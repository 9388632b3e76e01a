//! Breakout and pre-top detection against support/resistance levels

use super::types::{finite, require, Breakout, EvalError, PreTop, Signal, SignalPayload};
use crate::feed::Candle;
use crate::indicators::{change_over, mean};
use crate::levels::Level;

/// Thresholds for breakout and pre-top detection
#[derive(Debug, Clone)]
pub struct BreakoutParams {
    /// Margin a close must clear beyond the level (default 1%)
    pub margin: f64,
    /// Maximum distance to unbroken resistance for a pre-top (default 10%)
    pub pre_top_distance: f64,
    /// 1h momentum threshold (default 5%)
    pub momentum_1h: f64,
    /// 4h momentum threshold (default 8%)
    pub momentum_4h: f64,
    /// Candles over which momentum is measured
    pub momentum_lookback: usize,
    /// Latest volume over average that counts as a spike (default 2x)
    pub volume_spike_ratio: f64,
    /// Candles in the volume average
    pub volume_window: usize,
    pub long_confidence: f64,
    pub short_confidence: f64,
    pub pre_top_confidence: f64,
}

impl Default for BreakoutParams {
    fn default() -> Self {
        Self {
            margin: 0.01,
            pre_top_distance: 0.10,
            momentum_1h: 0.05,
            momentum_4h: 0.08,
            momentum_lookback: 6,
            volume_spike_ratio: 2.0,
            volume_window: 20,
            long_confidence: 0.75,
            short_confidence: 0.75,
            pre_top_confidence: 0.60,
        }
    }
}

/// Evaluate the latest 1h close against merged levels
///
/// A LONG candidate is a level the previous close sat at or below and the
/// latest close cleared by more than `margin`; SHORT mirrors it. A PRE_TOP
/// candidate is the nearest level above price, within `pre_top_distance`,
/// approached on strong 1h or 4h momentum with a volume spike. At most one
/// signal is emitted: the candidate with the largest relative distance.
pub fn evaluate_breakout(
    symbol: &str,
    h1: &[Candle],
    h4: &[Candle],
    levels: &[Level],
    params: &BreakoutParams,
) -> Result<Option<Signal>, EvalError> {
    require(h1.len(), 2)?;

    let price = h1[h1.len() - 1].close;
    let prev = h1[h1.len() - 2].close;

    // (distance, confidence, payload)
    let mut candidates: Vec<(f64, f64, SignalPayload)> = Vec::new();

    for level in levels.iter().filter(|l| l.price > 0.0) {
        let l = level.price;
        let distance = finite((price - l).abs() / l, "breakout distance")?;

        if prev <= l && price > l * (1.0 + params.margin) {
            candidates.push((
                distance,
                params.long_confidence,
                SignalPayload::BreakoutLong(Breakout {
                    level: l,
                    price,
                    distance,
                }),
            ));
        } else if prev >= l && price < l * (1.0 - params.margin) {
            candidates.push((
                distance,
                params.short_confidence,
                SignalPayload::BreakoutShort(Breakout {
                    level: l,
                    price,
                    distance,
                }),
            ));
        }
    }

    if let Some(pre_top) = pre_top(h1, h4, levels, price, params)? {
        candidates.push((pre_top.distance, params.pre_top_confidence, SignalPayload::PreTop(pre_top)));
    }

    let best = candidates
        .into_iter()
        .fold(None::<(f64, f64, SignalPayload)>, |best, c| match best {
            Some(b) if b.0 >= c.0 => Some(b),
            _ => Some(c),
        });

    Ok(best.map(|(_, confidence, payload)| Signal::new(symbol, confidence, payload)))
}

fn pre_top(
    h1: &[Candle],
    h4: &[Candle],
    levels: &[Level],
    price: f64,
    params: &BreakoutParams,
) -> Result<Option<PreTop>, EvalError> {
    if price <= 0.0 {
        return Ok(None);
    }

    let resistance = levels
        .iter()
        .map(|l| l.price)
        .filter(|&p| p > price)
        .fold(None::<f64>, |nearest, p| Some(nearest.map_or(p, |n| n.min(p))));

    let Some(resistance) = resistance else {
        return Ok(None);
    };

    let distance = finite((resistance - price) / price, "pre-top distance")?;
    if distance > params.pre_top_distance {
        return Ok(None);
    }

    let closes_1h: Vec<f64> = h1.iter().map(|c| c.close).collect();
    let closes_4h: Vec<f64> = h4.iter().map(|c| c.close).collect();
    let momentum_1h = change_over(&closes_1h, params.momentum_lookback);
    let momentum_4h = change_over(&closes_4h, params.momentum_lookback);

    let strong = momentum_4h.is_some_and(|m| m > params.momentum_4h)
        || momentum_1h.is_some_and(|m| m > params.momentum_1h);
    if !strong {
        return Ok(None);
    }

    if h1.len() <= params.volume_window {
        return Ok(None);
    }
    let latest_volume = h1[h1.len() - 1].volume;
    let trailing: Vec<f64> = h1[h1.len() - 1 - params.volume_window..h1.len() - 1]
        .iter()
        .map(|c| c.volume)
        .collect();
    let average = mean(&trailing).unwrap_or(0.0);
    if average <= 0.0 {
        return Ok(None);
    }
    let volume_ratio = finite(latest_volume / average, "volume ratio")?;
    if volume_ratio <= params.volume_spike_ratio {
        return Ok(None);
    }

    Ok(Some(PreTop {
        resistance,
        price,
        distance,
        momentum_1h,
        momentum_4h,
        volume_ratio,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Interval;
    use crate::signal::testing::candles;

    fn level(price: f64) -> Level {
        Level {
            price,
            timeframes: vec![Interval::H1],
        }
    }

    #[test]
    fn test_breakout_long_above_resistance() {
        let mut closes = vec![100.0; 50];
        closes.push(102.0);
        let h1 = candles(&closes, &[1000.0; 51]);

        let signal = evaluate_breakout("BTCUSDT", &h1, &[], &[level(100.0)], &BreakoutParams::default())
            .unwrap()
            .unwrap();

        match signal.payload {
            SignalPayload::BreakoutLong(b) => {
                assert_eq!(b.level, 100.0);
                assert_eq!(b.price, 102.0);
                assert!((b.distance - 0.02).abs() < 1e-12);
            }
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(signal.confidence, 0.75);
    }

    #[test]
    fn test_breakout_short_below_support() {
        let h1 = candles(&[100.0, 100.0, 97.0], &[1.0; 3]);
        let signal = evaluate_breakout("ETHUSDT", &h1, &[], &[level(99.0)], &BreakoutParams::default())
            .unwrap()
            .unwrap();
        assert!(matches!(signal.payload, SignalPayload::BreakoutShort(ref b) if b.level == 99.0));
    }

    #[test]
    fn test_move_within_margin_is_ignored() {
        let h1 = candles(&[100.0, 100.5], &[1.0; 2]);
        let result =
            evaluate_breakout("BTCUSDT", &h1, &[], &[level(100.0)], &BreakoutParams::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_level_already_broken_is_ignored() {
        // Previous close was already above the level
        let h1 = candles(&[104.0, 105.0], &[1.0; 2]);
        let result =
            evaluate_breakout("BTCUSDT", &h1, &[], &[level(100.0)], &BreakoutParams::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_largest_distance_wins() {
        let h1 = candles(&[90.0, 110.0], &[1.0; 2]);
        let signal = evaluate_breakout(
            "BTCUSDT",
            &h1,
            &[],
            &[level(95.0), level(100.0), level(105.0)],
            &BreakoutParams::default(),
        )
        .unwrap()
        .unwrap();
        assert!(matches!(signal.payload, SignalPayload::BreakoutLong(ref b) if b.level == 95.0));
    }

    #[test]
    fn test_pre_top_near_resistance_with_momentum_and_volume() {
        // Steady climb from 80, then a volume spike 3% under 104
        let mut closes: Vec<f64> = (0..30).map(|i| 80.0 + i as f64 * 0.6).collect();
        closes.push(101.0);
        let mut volumes = vec![100.0; 30];
        volumes.push(500.0);
        let h1 = candles(&closes, &volumes);

        let signal = evaluate_breakout("SOLUSDT", &h1, &[], &[level(104.0)], &BreakoutParams::default())
            .unwrap()
            .unwrap();

        match signal.payload {
            SignalPayload::PreTop(p) => {
                assert_eq!(p.resistance, 104.0);
                assert!((p.volume_ratio - 5.0).abs() < 1e-12);
                assert!(p.momentum_1h.unwrap() > 0.05);
                assert!(p.momentum_4h.is_none());
            }
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(signal.confidence, 0.60);
    }

    #[test]
    fn test_pre_top_on_4h_momentum_alone() {
        // Flat 1h tape, but the 4h closes are up 12% over six candles
        let mut closes = vec![100.0; 30];
        closes.push(101.0);
        let mut volumes = vec![100.0; 30];
        volumes.push(500.0);
        let h1 = candles(&closes, &volumes);
        let h4 = candles(&[90.0, 92.0, 94.0, 96.0, 98.0, 100.0, 101.0], &[1.0; 7]);

        let signal = evaluate_breakout("SOLUSDT", &h1, &h4, &[level(104.0)], &BreakoutParams::default())
            .unwrap()
            .unwrap();

        match signal.payload {
            SignalPayload::PreTop(p) => {
                assert!(p.momentum_1h.unwrap() < 0.05);
                assert!((p.momentum_4h.unwrap() - (101.0 / 90.0 - 1.0)).abs() < 1e-12);
            }
            other => panic!("unexpected payload {:?}", other),
        }

        // Same 1h tape with a flat 4h trend has no momentum
        let flat_h4 = candles(&[100.0; 7], &[1.0; 7]);
        let result =
            evaluate_breakout("SOLUSDT", &h1, &flat_h4, &[level(104.0)], &BreakoutParams::default())
                .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_pre_top_requires_volume_spike() {
        let mut closes: Vec<f64> = (0..30).map(|i| 80.0 + i as f64 * 0.6).collect();
        closes.push(101.0);
        let h1 = candles(&closes, &[100.0; 31]);
        let result =
            evaluate_breakout("SOLUSDT", &h1, &[], &[level(104.0)], &BreakoutParams::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_insufficient_history() {
        let h1 = candles(&[100.0], &[1.0]);
        let err = evaluate_breakout("BTCUSDT", &h1, &[], &[], &BreakoutParams::default()).unwrap_err();
        assert!(matches!(err, EvalError::InsufficientData { required: 2, .. }));
    }
}
