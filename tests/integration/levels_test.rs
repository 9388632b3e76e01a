//! Integration tests for level detection and volume profiles

use market_radar::feed::{Candle, CandleSeries, Interval};
use market_radar::levels::{detect_levels, find_levels, DEFAULT_DELTA, DEFAULT_WINDOW};
use market_radar::profile::{build_profile, top_nodes};
use chrono::{Duration, TimeZone, Utc};

/// Deterministic pseudo-random walk
fn walk(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let mut price = 100.0;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let step = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            price = (price * (1.0 + step * 0.02)).max(1.0);
            price
        })
        .collect()
}

fn series(closes: &[f64]) -> CandleSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    CandleSeries::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: start + Duration::hours(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0 + (i % 7) as f64,
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_levels_are_sorted_and_spaced() {
    for seed in 1..20 {
        let levels = find_levels(&walk(300, seed), DEFAULT_WINDOW, DEFAULT_DELTA);
        for pair in levels.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[1] - pair[0] > DEFAULT_DELTA * pair[0], "seed {}", seed);
        }
    }
}

#[test]
fn test_monotonic_series_has_no_levels() {
    let rising: Vec<f64> = (0..200).map(|i| 10.0 + i as f64).collect();
    let falling: Vec<f64> = rising.iter().rev().copied().collect();
    assert!(find_levels(&rising, DEFAULT_WINDOW, DEFAULT_DELTA).is_empty());
    assert!(find_levels(&falling, DEFAULT_WINDOW, DEFAULT_DELTA).is_empty());
}

#[test]
fn test_merged_levels_cover_both_timeframes() {
    let h1 = series(&walk(200, 7));
    let h4 = series(&walk(200, 11));

    let h1_only = find_levels(&h1.closes(), DEFAULT_WINDOW, DEFAULT_DELTA);
    let h4_only = find_levels(&h4.closes(), DEFAULT_WINDOW, DEFAULT_DELTA);
    let merged = detect_levels(&[(Interval::H1, &h1), (Interval::H4, &h4)], DEFAULT_WINDOW, DEFAULT_DELTA);

    for price in h1_only.iter().chain(&h4_only) {
        assert!(merged.iter().any(|l| l.price == *price));
    }
    assert!(merged.windows(2).all(|w| w[0].price < w[1].price));
}

#[test]
fn test_profile_conserves_volume() {
    let closes = walk(500, 3);
    let volumes: Vec<f64> = (0..500).map(|i| 1.0 + (i % 13) as f64 * 2.5).collect();
    let total: f64 = volumes.iter().sum();

    for bins in [1, 5, 20, 64] {
        let profile = build_profile(&closes, &volumes, bins);
        assert!((profile.total_volume() - total).abs() < 1e-6 * total, "bins {}", bins);
    }
}

#[test]
fn test_top_nodes_are_heaviest() {
    let closes = walk(400, 5);
    let volumes = vec![1.0; 400];
    let profile = build_profile(&closes, &volumes, 20);
    let top = top_nodes(&profile, 3);

    assert_eq!(top.len(), 3);
    let lightest_top = top.iter().map(|n| n.volume).fold(f64::INFINITY, f64::min);
    let heavier_elsewhere = profile
        .nodes
        .iter()
        .filter(|n| !top.contains(n))
        .any(|n| n.volume > lightest_top);
    assert!(!heavier_elsewhere);
}
