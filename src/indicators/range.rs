//! Moving averages and true-range measures

use crate::feed::Candle;

use super::stats::{mean, tail};

/// Simple moving average of the last `window` values
pub fn sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    mean(tail(values, window))
}

/// Exponential moving average, seeded with the SMA of the first `window` values
pub fn ema(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let alpha = 2.0 / (window as f64 + 1.0);
    let seed = mean(&values[..window])?;
    Some(
        values[window..]
            .iter()
            .fold(seed, |acc, v| alpha * v + (1.0 - alpha) * acc),
    )
}

/// True range of every candle
///
/// The first candle has no previous close, so its range is high - low.
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    let mut prev_close: Option<f64> = None;
    candles
        .iter()
        .map(|c| {
            let tr = match prev_close {
                Some(pc) => (c.high - c.low)
                    .max((c.high - pc).abs())
                    .max((c.low - pc).abs()),
                None => c.high - c.low,
            };
            prev_close = Some(c.close);
            tr
        })
        .collect()
}

/// Average true range: plain mean of the last `window` true ranges
pub fn atr(candles: &[Candle], window: usize) -> Option<f64> {
    sma(&true_ranges(candles), window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candle(i: i64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.timestamp_opt(0, 0).unwrap() + Duration::hours(i),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_sma() {
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        assert_eq!(sma(&[1.0], 2), None);
        assert_eq!(sma(&[1.0], 0), None);
    }

    #[test]
    fn test_ema_constant_series() {
        assert_eq!(ema(&[5.0; 10], 3), Some(5.0));
    }

    #[test]
    fn test_ema_reacts_to_latest() {
        let e = ema(&[1.0, 1.0, 1.0, 4.0], 3).unwrap();
        // alpha = 0.5, seed = 1.0
        assert!((e - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_true_range_uses_gap() {
        let candles = vec![candle(0, 11.0, 9.0, 10.0), candle(1, 14.0, 13.0, 13.5)];
        let tr = true_ranges(&candles);
        assert_eq!(tr, vec![2.0, 4.0]);
    }

    #[test]
    fn test_atr() {
        let candles = vec![
            candle(0, 11.0, 9.0, 10.0),
            candle(1, 11.0, 9.0, 10.0),
            candle(2, 12.0, 8.0, 10.0),
        ];
        assert_eq!(atr(&candles, 2), Some(3.0));
        assert_eq!(atr(&candles, 4), None);
    }
}
