//! Liquidity zones from density clustering of close prices

use super::types::{require, EvalError, LiquidityZone, LiquidityZones, Signal, SignalPayload};
use crate::feed::Candle;
use crate::profile::{build_profile, top_nodes, DEFAULT_BINS, DEFAULT_TOP_NODES};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct LiquidityParams {
    pub min_candles: usize,
    /// Neighbourhood radius as a fraction of the latest close
    pub eps_pct: f64,
    /// Points (self included) within eps that make a core point
    pub min_samples: usize,
    /// Zones reported, highest volume first
    pub max_zones: usize,
    pub profile_bins: usize,
}

impl Default for LiquidityParams {
    fn default() -> Self {
        Self {
            min_candles: 100,
            eps_pct: 0.005,
            min_samples: 5,
            max_zones: 5,
            profile_bins: DEFAULT_BINS,
        }
    }
}

/// Cluster 1h closes into liquidity bands
///
/// Ranking only: the signal carries no confidence and is never actionable.
/// Returns `None` when every close is noise.
pub fn evaluate_liquidity(
    symbol: &str,
    h1: &[Candle],
    params: &LiquidityParams,
) -> Result<Option<Signal>, EvalError> {
    require(h1.len(), params.min_candles)?;

    let Some(last) = h1.last() else {
        return Ok(None);
    };
    let eps = params.eps_pct * last.close;

    let points: Vec<(f64, f64)> = h1.iter().map(|c| (c.close, c.volume)).collect();
    let mut zones = cluster_zones(&points, eps, params.min_samples);
    if zones.is_empty() {
        return Ok(None);
    }

    zones.sort_by(|a, b| {
        b.total_volume
            .partial_cmp(&a.total_volume)
            .unwrap_or(Ordering::Equal)
    });
    zones.truncate(params.max_zones);

    let closes: Vec<f64> = points.iter().map(|p| p.0).collect();
    let volumes: Vec<f64> = points.iter().map(|p| p.1).collect();
    let profile = build_profile(&closes, &volumes, params.profile_bins);

    Ok(Some(Signal::new(
        symbol,
        0.0,
        SignalPayload::LiquidityZone(LiquidityZones {
            zones,
            volume_nodes: top_nodes(&profile, DEFAULT_TOP_NODES),
        }),
    )))
}

/// One-dimensional DBSCAN over (price, volume) points
///
/// Core points chain into one cluster while consecutive cores are within
/// `eps`; each border point joins the nearer neighbouring core's cluster.
fn cluster_zones(points: &[(f64, f64)], eps: f64, min_samples: usize) -> Vec<LiquidityZone> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    let n = sorted.len();
    if n == 0 || eps.is_nan() || eps < 0.0 {
        return Vec::new();
    }

    let core: Vec<bool> = sorted
        .iter()
        .map(|&(p, _)| {
            let lo = sorted.partition_point(|q| q.0 < p - eps);
            let hi = sorted.partition_point(|q| q.0 <= p + eps);
            hi - lo >= min_samples
        })
        .collect();

    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut clusters = 0usize;
    let mut prev_core: Option<usize> = None;
    for i in (0..n).filter(|&i| core[i]) {
        let joins_previous = prev_core.is_some_and(|j| sorted[i].0 - sorted[j].0 <= eps);
        if !joins_previous {
            clusters += 1;
        }
        labels[i] = Some(clusters - 1);
        prev_core = Some(i);
    }

    for i in (0..n).filter(|&i| !core[i]) {
        let before = (0..i).rev().find(|&j| core[j]);
        let after = (i + 1..n).find(|&j| core[j]);
        let nearest = [before, after]
            .into_iter()
            .flatten()
            .map(|j| (j, (sorted[i].0 - sorted[j].0).abs()))
            .filter(|&(_, d)| d <= eps)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        if let Some((j, _)) = nearest {
            labels[i] = labels[j];
        }
    }

    (0..clusters)
        .map(|c| {
            let members: Vec<(f64, f64)> = sorted
                .iter()
                .zip(&labels)
                .filter(|(_, l)| **l == Some(c))
                .map(|(p, _)| *p)
                .collect();
            summarize(&members, n)
        })
        .collect()
}

fn summarize(members: &[(f64, f64)], total_samples: usize) -> LiquidityZone {
    let total_volume: f64 = members.iter().map(|m| m.1).sum();
    let center = if total_volume > 0.0 {
        members.iter().map(|m| m.0 * m.1).sum::<f64>() / total_volume
    } else {
        members.iter().map(|m| m.0).sum::<f64>() / members.len() as f64
    };

    LiquidityZone {
        center,
        total_volume,
        density: members.len() as f64 / total_samples as f64,
        price_low: members.iter().map(|m| m.0).fold(f64::INFINITY, f64::min),
        price_high: members.iter().map(|m| m.0).fold(f64::NEG_INFINITY, f64::max),
        samples: members.len(),
    }
}
