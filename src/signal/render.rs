//! Notification text for each signal kind

use super::types::{Signal, SignalPayload};

fn pct(value: f64) -> String {
    format!("{:+.2}%", value * 100.0)
}

impl Signal {
    /// Render the alert message body
    pub fn render(&self) -> String {
        let mut out = format!(
            "[{}] {} (confidence {:.0}%)\n",
            self.signal_type(),
            self.symbol,
            self.confidence * 100.0
        );

        let body = match &self.payload {
            SignalPayload::BreakoutLong(b) => format!(
                "Closed {} above resistance {:.6} at {:.6}",
                pct(b.distance),
                b.level,
                b.price
            ),
            SignalPayload::BreakoutShort(b) => format!(
                "Closed {} below support {:.6} at {:.6}",
                pct(b.distance),
                b.level,
                b.price
            ),
            SignalPayload::PreTop(p) => {
                let mut s = format!(
                    "Price {:.6} is {} under resistance {:.6}, volume {:.1}x average",
                    p.price,
                    pct(p.distance),
                    p.resistance,
                    p.volume_ratio
                );
                if let Some(m) = p.momentum_1h {
                    s.push_str(&format!(", 1h momentum {}", pct(m)));
                }
                if let Some(m) = p.momentum_4h {
                    s.push_str(&format!(", 4h momentum {}", pct(m)));
                }
                s
            }
            SignalPayload::WhaleActivity(w) => format!(
                "Volume {:.2} is {:.1}x the mean {:.2} (z {:.2}), candle move {}",
                w.latest_volume,
                w.volume_ratio,
                w.mean_volume,
                w.z_score,
                pct(w.price_change)
            ),
            SignalPayload::VolatilitySpike(v) => format!(
                "Volatility compressed to {:.2} of long-run, true range {:.6} vs ATR {:.6}",
                v.vol_ratio, v.current_tr, v.atr
            ),
            SignalPayload::Manipulation(m) => format!(
                "Manipulation score {}/4: correlation {:.2}, body ratio {:.2}, volume {:.1}x",
                m.manipulation_score, m.correlation, m.body_ratio, m.volume_ratio
            ),
            SignalPayload::LiquidityZone(z) => {
                let mut s = String::from("Liquidity zones:");
                for zone in &z.zones {
                    s.push_str(&format!(
                        "\n  {:.6} [{:.6} - {:.6}] volume {:.2}",
                        zone.center, zone.price_low, zone.price_high, zone.total_volume
                    ));
                }
                if !z.volume_nodes.is_empty() {
                    s.push_str("\nVolume nodes:");
                    for node in &z.volume_nodes {
                        s.push_str(&format!("\n  {:.6} volume {:.2}", node.price, node.volume));
                    }
                }
                s
            }
            SignalPayload::SmartMoneyFlow(f) => format!(
                "{} flow: buy ratio {:.2}, price {}, volume {}",
                f.divergence,
                f.buy_ratio,
                pct(f.price_change),
                pct(f.volume_change)
            ),
        };

        out.push_str(&body);
        out
    }
}
