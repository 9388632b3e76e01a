//! market-radar: market-structure signal scanner for crypto spot symbols
//!
//! This library provides the core components for:
//! - Candle and 24h ticker feeds from the Binance REST API
//! - Liquid, volatile symbol selection
//! - Support/resistance levels and volume profiles
//! - Breakout, whale, volatility, manipulation, liquidity and flow signals
//! - Cooldown-based alert suppression and delivery
//! - A polling scheduler with graceful shutdown
//! - Structured logging and Prometheus metrics

pub mod alert;
pub mod cli;
pub mod config;
pub mod feed;
pub mod indicators;
pub mod levels;
pub mod profile;
pub mod scanner;
pub mod signal;
pub mod telemetry;
pub mod universe;
