//! Levels command implementation

use super::build_source;
use crate::config::Config;
use crate::feed::{CandleSource, Interval};
use crate::indicators::ema;
use crate::levels::detect_levels;
use crate::profile::{build_profile, top_nodes, DEFAULT_TOP_NODES};
use clap::Args;

#[derive(Args, Debug)]
pub struct LevelsArgs {
    /// Trading symbol, e.g. BTCUSDT
    pub symbol: String,
}

impl LevelsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbol = self.symbol.to_uppercase();
        let source = build_source(config)?;
        let limit = config.feed.candle_limit;

        let h1 = source.get_candles(&symbol, Interval::H1, limit).await?;
        let h4 = source.get_candles(&symbol, Interval::H4, limit).await?;
        let Some(last) = h1.last() else {
            anyhow::bail!("No 1h candles for {}", symbol);
        };

        let levels = detect_levels(
            &[(Interval::H1, &h1), (Interval::H4, &h4)],
            config.levels.window,
            config.levels.delta,
        );
        let closes = h1.closes();
        let profile = build_profile(&closes, &h1.volumes(), config.levels.profile_bins);

        println!("{} @ {:.6} ({} x 1h, {} x 4h)", symbol, last.close, h1.len(), h4.len());
        if let (Some(fast), Some(slow)) = (ema(&closes, 20), ema(&closes, 50)) {
            println!("  EMA20 {:.6}  EMA50 {:.6}", fast, slow);
        }

        println!("Levels:");
        if levels.is_empty() {
            println!("  (none)");
        }
        for level in levels.iter().rev() {
            let side = if level.price > last.close {
                "resistance"
            } else {
                "support"
            };
            let timeframes: Vec<&str> = level.timeframes.iter().map(Interval::as_str).collect();
            println!(
                "  {:>14.6}  {:<10}  {:+.2}%  [{}]",
                level.price,
                side,
                (level.price / last.close - 1.0) * 100.0,
                timeframes.join(",")
            );
        }

        println!("Volume nodes:");
        for node in top_nodes(&profile, DEFAULT_TOP_NODES) {
            println!("  {:>14.6}  {:.2}", node.price, node.volume);
        }

        Ok(())
    }
}
