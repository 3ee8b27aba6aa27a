//! Core domain types and logic.

pub mod backtest;
pub mod candle;
pub mod catalog;
pub mod config_validation;
pub mod error;
pub mod evaluation;
pub mod indicator;
pub mod indicator_helpers;
pub mod market_data;
pub mod metrics;
pub mod position;
pub mod segment;
pub mod series;
pub mod signal;
pub mod strategy;
