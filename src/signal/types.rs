//! Signal types

use crate::profile::VolumeProfileNode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Evaluator failures; never propagated past [`super::evaluate_all`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Series shorter than the evaluator's minimum history
    #[error("Insufficient data: need {required} candles, have {available}")]
    InsufficientData { required: usize, available: usize },
    /// A computation produced NaN or infinity
    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),
}

/// Fail with `InsufficientData` unless `available >= required`
pub(crate) fn require(available: usize, required: usize) -> Result<(), EvalError> {
    if available < required {
        return Err(EvalError::InsufficientData {
            required,
            available,
        });
    }
    Ok(())
}

/// Fail with `NonFinite` unless `value` is finite
pub(crate) fn finite(value: f64, what: &'static str) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite(what))
    }
}

/// Signal kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    BreakoutLong,
    BreakoutShort,
    PreTop,
    WhaleActivity,
    VolatilitySpike,
    Manipulation,
    LiquidityZone,
    SmartMoneyFlow,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::BreakoutLong => "BREAKOUT_LONG",
            SignalType::BreakoutShort => "BREAKOUT_SHORT",
            SignalType::PreTop => "PRE_TOP",
            SignalType::WhaleActivity => "WHALE_ACTIVITY",
            SignalType::VolatilitySpike => "VOLATILITY_SPIKE",
            SignalType::Manipulation => "MANIPULATION",
            SignalType::LiquidityZone => "LIQUIDITY_ZONE",
            SignalType::SmartMoneyFlow => "SMART_MONEY_FLOW",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Close through a support/resistance level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakout {
    /// Level that was crossed
    pub level: f64,
    /// Last close
    pub price: f64,
    /// |price - level| / level
    pub distance: f64,
}

/// Strong momentum into nearby unbroken resistance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreTop {
    pub resistance: f64,
    pub price: f64,
    /// (resistance - price) / price
    pub distance: f64,
    pub momentum_1h: Option<f64>,
    pub momentum_4h: Option<f64>,
    /// Latest 1h volume over the trailing average
    pub volume_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleActivity {
    pub z_score: f64,
    /// Latest volume over the sample mean
    pub volume_ratio: f64,
    pub latest_volume: f64,
    pub mean_volume: f64,
    /// Latest candle close/open - 1
    pub price_change: f64,
    pub whale_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySpike {
    /// Short-window over long-window log-return stdev
    pub vol_ratio: f64,
    pub atr: f64,
    pub current_tr: f64,
    pub spike_predicted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manipulation {
    /// Number of criteria met, 0 to 4
    pub manipulation_score: u8,
    pub correlation: f64,
    pub body_ratio: f64,
    pub volume_ratio: f64,
    pub manipulation_detected: bool,
}

/// One density cluster of close prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityZone {
    /// Volume-weighted centre price
    pub center: f64,
    pub total_volume: f64,
    /// Share of all samples that fell in the zone
    pub density: f64,
    pub price_low: f64,
    pub price_high: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityZones {
    /// Highest-volume zones first
    pub zones: Vec<LiquidityZone>,
    /// Highest-volume profile bins
    pub volume_nodes: Vec<VolumeProfileNode>,
}

/// Flow vs price divergence class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowDivergence {
    Bullish,
    Bearish,
    HiddenBullish,
    HiddenBearish,
    Neutral,
}

impl fmt::Display for FlowDivergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowDivergence::Bullish => "BULLISH",
            FlowDivergence::Bearish => "BEARISH",
            FlowDivergence::HiddenBullish => "HIDDEN_BULLISH",
            FlowDivergence::HiddenBearish => "HIDDEN_BEARISH",
            FlowDivergence::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartMoneyFlow {
    pub buy_volume: f64,
    pub sell_volume: f64,
    /// buy / (buy + sell); 0.5 when there is no directional volume
    pub buy_ratio: f64,
    pub price_change: f64,
    pub volume_change: f64,
    pub divergence: FlowDivergence,
}

/// Typed payload, one variant per signal kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalPayload {
    BreakoutLong(Breakout),
    BreakoutShort(Breakout),
    PreTop(PreTop),
    WhaleActivity(WhaleActivity),
    VolatilitySpike(VolatilitySpike),
    Manipulation(Manipulation),
    LiquidityZone(LiquidityZones),
    SmartMoneyFlow(SmartMoneyFlow),
}

/// A market-structure signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Unique signal identifier
    pub id: Uuid,
    /// Trading symbol
    pub symbol: String,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f64,
    /// Kind-specific data
    pub payload: SignalPayload,
    /// Signal generation timestamp
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    /// Create a new signal; confidence is clamped into [0, 1]
    pub fn new(symbol: impl Into<String>, confidence: f64, payload: SignalPayload) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            confidence,
            payload,
            generated_at: Utc::now(),
        }
    }

    pub fn signal_type(&self) -> SignalType {
        match &self.payload {
            SignalPayload::BreakoutLong(_) => SignalType::BreakoutLong,
            SignalPayload::BreakoutShort(_) => SignalType::BreakoutShort,
            SignalPayload::PreTop(_) => SignalType::PreTop,
            SignalPayload::WhaleActivity(_) => SignalType::WhaleActivity,
            SignalPayload::VolatilitySpike(_) => SignalType::VolatilitySpike,
            SignalPayload::Manipulation(_) => SignalType::Manipulation,
            SignalPayload::LiquidityZone(_) => SignalType::LiquidityZone,
            SignalPayload::SmartMoneyFlow(_) => SignalType::SmartMoneyFlow,
        }
    }

    /// Whether the signal clears its evaluator's alert threshold
    ///
    /// Liquidity zones are informational and never alert.
    pub fn is_actionable(&self) -> bool {
        match &self.payload {
            SignalPayload::BreakoutLong(_)
            | SignalPayload::BreakoutShort(_)
            | SignalPayload::PreTop(_) => true,
            SignalPayload::WhaleActivity(w) => w.whale_detected,
            SignalPayload::VolatilitySpike(v) => v.spike_predicted,
            SignalPayload::Manipulation(m) => m.manipulation_detected,
            SignalPayload::LiquidityZone(_) => false,
            SignalPayload::SmartMoneyFlow(s) => s.divergence != FlowDivergence::Neutral,
        }
    }
}
