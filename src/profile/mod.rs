//! Volume profile analysis
//!
//! Histogram of traded volume by close price

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default number of price bins
pub const DEFAULT_BINS: usize = 20;

/// Default number of nodes reported by [`top_nodes`]
pub const DEFAULT_TOP_NODES: usize = 3;

/// One price bin of a volume profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfileNode {
    /// Bin centre price
    pub price: f64,
    /// Volume attributed to the bin
    pub volume: f64,
}

/// Volume profile ordered by ascending bin price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub nodes: Vec<VolumeProfileNode>,
}

impl VolumeProfile {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total volume across all bins
    pub fn total_volume(&self) -> f64 {
        self.nodes.iter().map(|n| n.volume).sum()
    }
}

/// Build a volume profile with `bins` equal-width price bins
///
/// Each candle's volume goes to the bin holding its close; a close exactly
/// at the maximum is clamped into the last bin. A flat series yields one
/// node at that price. Extra elements in the longer input are ignored.
pub fn build_profile(closes: &[f64], volumes: &[f64], bins: usize) -> VolumeProfile {
    let n = closes.len().min(volumes.len());
    if n == 0 || bins == 0 {
        return VolumeProfile::default();
    }
    let closes = &closes[..n];
    let volumes = &volumes[..n];

    let min = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return VolumeProfile {
            nodes: vec![VolumeProfileNode {
                price: min,
                volume: volumes.iter().sum(),
            }],
        };
    }

    let width = (max - min) / bins as f64;
    let mut totals = vec![0.0; bins];
    for (close, volume) in closes.iter().zip(volumes) {
        let idx = (((close - min) / width) as usize).min(bins - 1);
        totals[idx] += volume;
    }

    VolumeProfile {
        nodes: totals
            .into_iter()
            .enumerate()
            .map(|(i, volume)| VolumeProfileNode {
                price: min + width * (i as f64 + 0.5),
                volume,
            })
            .collect(),
    }
}

/// The `n` highest-volume nodes, ties broken by lower price first
pub fn top_nodes(profile: &VolumeProfile, n: usize) -> Vec<VolumeProfileNode> {
    let mut nodes = profile.nodes.clone();
    nodes.sort_by(|a, b| {
        b.volume
            .partial_cmp(&a.volume)
            .unwrap_or(Ordering::Equal)
            .then(a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
    });
    nodes.truncate(n);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(build_profile(&[], &[], DEFAULT_BINS).is_empty());
        assert!(build_profile(&[1.0], &[1.0], 0).is_empty());
    }

    #[test]
    fn test_volume_conserved() {
        let closes: Vec<f64> = (0..200).map(|i| 50.0 + ((i * 37) % 101) as f64 * 0.3).collect();
        let volumes: Vec<f64> = (0..200).map(|i| ((i * 13) % 29 + 1) as f64).collect();

        let profile = build_profile(&closes, &volumes, DEFAULT_BINS);
        assert_eq!(profile.nodes.len(), DEFAULT_BINS);
        assert_eq!(profile.total_volume(), volumes.iter().sum::<f64>());
    }

    #[test]
    fn test_max_close_clamped_into_last_bin() {
        let profile = build_profile(&[0.0, 10.0], &[1.0, 2.0], 10);
        assert_eq!(profile.nodes.len(), 10);
        assert_eq!(profile.nodes[0].volume, 1.0);
        assert_eq!(profile.nodes[9].volume, 2.0);
        assert_eq!(profile.nodes[9].price, 9.5);
    }

    #[test]
    fn test_flat_series_single_node() {
        let profile = build_profile(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0], DEFAULT_BINS);
        assert_eq!(
            profile.nodes,
            vec![VolumeProfileNode {
                price: 5.0,
                volume: 6.0
            }]
        );
    }

    #[test]
    fn test_mismatched_lengths_use_shorter() {
        let profile = build_profile(&[1.0, 2.0, 3.0], &[1.0, 1.0], 2);
        assert_eq!(profile.total_volume(), 2.0);
    }

    #[test]
    fn test_top_nodes_order_and_ties() {
        let profile = VolumeProfile {
            nodes: vec![
                VolumeProfileNode { price: 1.0, volume: 5.0 },
                VolumeProfileNode { price: 2.0, volume: 9.0 },
                VolumeProfileNode { price: 3.0, volume: 5.0 },
                VolumeProfileNode { price: 4.0, volume: 1.0 },
            ],
        };

        let top = top_nodes(&profile, DEFAULT_TOP_NODES);
        let prices: Vec<f64> = top.iter().map(|n| n.price).collect();
        assert_eq!(prices, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_top_nodes_more_than_available() {
        let profile = build_profile(&[1.0, 2.0], &[1.0, 1.0], 2);
        assert_eq!(top_nodes(&profile, 10).len(), 2);
    }
}
