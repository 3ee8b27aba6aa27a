//! Built-in strategy catalog.
//!
//! Each entry pairs a declarative [`StrategyRuleSpec`] with the checklist
//! function that evaluates it. The table is built once and never mutated;
//! config overrides produce modified copies.

use std::collections::BTreeMap;

use crate::domain::signal::{
    bb_squeeze_breakout, ema_adx_trend, pcr_reversal, supertrend_macd, vwap_reclaim,
};
use crate::domain::strategy::{
    Checklist, EngineConfig, QualityRating, Strategy, StrategyId, StrategyRuleSpec,
};

fn params(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn checklist_for(id: StrategyId) -> Checklist {
    match id {
        StrategyId::EmaAdxTrend => ema_adx_trend,
        StrategyId::BbSqueezeBreakout => bb_squeeze_breakout,
        StrategyId::VwapReclaim => vwap_reclaim,
        StrategyId::SupertrendMacd => supertrend_macd,
        StrategyId::PcrReversal => pcr_reversal,
    }
}

pub fn rule_spec(id: StrategyId) -> StrategyRuleSpec {
    match id {
        StrategyId::EmaAdxTrend => StrategyRuleSpec {
            id,
            name: "EMA Trend Rider".into(),
            rating: QualityRating::APlus,
            entry_long: "Close above EMA9 above EMA21, ADX above threshold and rising, \
                         MACD histogram positive and expanding, 15m trend up"
                .into(),
            entry_short: "Close below EMA9 below EMA21, ADX above threshold and rising, \
                          MACD histogram negative and expanding, 15m trend down"
                .into(),
            exit: "Stop at swing or 1.5 ATR, target 2R, trail EMA9 after 1R, \
                   exit if ADX fails to expand within 3 bars"
                .into(),
            engine: EngineConfig {
                interval_minutes: 5,
                higher_timeframes: vec![15],
                atr_period: 14,
                sl_atr_mult: 1.5,
                reward_multiple: 2.0,
                max_bars_held: 24,
                min_bars_between_trades: 3,
                risk_per_trade_pct: 1.0,
                daily_risk_cap_pct: 3.0,
                params: params(&[
                    ("ema_fast", 9.0),
                    ("ema_slow", 21.0),
                    ("min_adx", 20.0),
                    ("adx_expansion", 2.0),
                    ("validation_bars", 3.0),
                    ("swing_lookback", 5.0),
                ]),
            },
        },
        StrategyId::BbSqueezeBreakout => StrategyRuleSpec {
            id,
            name: "Squeeze Breakout".into(),
            rating: QualityRating::A,
            entry_long: "Bollinger bandwidth compressed within the last 12 bars, close breaks \
                         above the upper band on 1.5x average volume with OBV rising"
                .into(),
            entry_short: "Bollinger bandwidth compressed within the last 12 bars, close breaks \
                          below the lower band on 1.5x average volume with OBV falling"
                .into(),
            exit: "Stop at swing or 1.2 ATR, target 2.5R, trail EMA21 after 1R".into(),
            engine: EngineConfig {
                interval_minutes: 5,
                higher_timeframes: vec![15],
                atr_period: 14,
                sl_atr_mult: 1.2,
                reward_multiple: 2.5,
                max_bars_held: 30,
                min_bars_between_trades: 4,
                risk_per_trade_pct: 1.0,
                daily_risk_cap_pct: 2.0,
                params: params(&[
                    ("bb_period", 20.0),
                    ("bb_mult", 2.0),
                    ("squeeze_bandwidth", 0.01),
                    ("squeeze_lookback", 12.0),
                    ("volume_mult", 1.5),
                    ("volume_period", 20.0),
                    ("swing_lookback", 5.0),
                ]),
            },
        },
        StrategyId::VwapReclaim => StrategyRuleSpec {
            id,
            name: "VWAP Reclaim".into(),
            rating: QualityRating::A,
            entry_long: "Previous close below session VWAP, close back above it, \
                         RSI at or above 50, 15m trend up"
                .into(),
            entry_short: "Previous close above session VWAP, close back below it, \
                          RSI at or below 50, 15m trend down"
                .into(),
            exit: "Stop at swing or 1 ATR, target 1.5R, trail EMA9 after 1R, \
                   exit if the next bar closes back across VWAP"
                .into(),
            engine: EngineConfig {
                interval_minutes: 3,
                higher_timeframes: vec![15],
                atr_period: 14,
                sl_atr_mult: 1.0,
                reward_multiple: 1.5,
                max_bars_held: 20,
                min_bars_between_trades: 5,
                risk_per_trade_pct: 0.75,
                daily_risk_cap_pct: 2.25,
                params: params(&[
                    ("rsi_floor", 50.0),
                    ("rsi_ceiling", 50.0),
                    ("swing_lookback", 4.0),
                ]),
            },
        },
        StrategyId::SupertrendMacd => StrategyRuleSpec {
            id,
            name: "Supertrend Momentum".into(),
            rating: QualityRating::APlus,
            entry_long: "Supertrend flipped up within 3 bars, MACD above signal with a \
                         positive histogram, ADX above threshold, 60m trend up"
                .into(),
            entry_short: "Supertrend flipped down within 3 bars, MACD below signal with a \
                          negative histogram, ADX above threshold, 60m trend down"
                .into(),
            exit: "Stop at swing or 1.8 ATR, target 2R, trail the Supertrend line after 1R, \
                   exit if ADX fails to expand within 2 bars"
                .into(),
            engine: EngineConfig {
                interval_minutes: 15,
                higher_timeframes: vec![60],
                atr_period: 14,
                sl_atr_mult: 1.8,
                reward_multiple: 2.0,
                max_bars_held: 16,
                min_bars_between_trades: 2,
                risk_per_trade_pct: 1.0,
                daily_risk_cap_pct: 3.0,
                params: params(&[
                    ("st_period", 10.0),
                    ("st_mult", 3.0),
                    ("flip_lookback", 3.0),
                    ("min_adx", 18.0),
                    ("adx_expansion", 1.5),
                    ("validation_bars", 2.0),
                    ("swing_lookback", 4.0),
                ]),
            },
        },
        StrategyId::PcrReversal => StrategyRuleSpec {
            id,
            name: "PCR Extreme Reversal".into(),
            rating: QualityRating::BPlus,
            entry_long: "PCR at or above 1.3, RSI oversold or bullish divergence, \
                         close crosses above EMA9"
                .into(),
            entry_short: "PCR at or below 0.7, RSI overbought or bearish divergence, \
                          close crosses below EMA9"
                .into(),
            exit: "Stop at swing or 1.5 ATR, target 1.8R, trail EMA21 after 1R".into(),
            engine: EngineConfig {
                interval_minutes: 5,
                higher_timeframes: vec![15],
                atr_period: 14,
                sl_atr_mult: 1.5,
                reward_multiple: 1.8,
                max_bars_held: 18,
                min_bars_between_trades: 6,
                risk_per_trade_pct: 0.5,
                daily_risk_cap_pct: 1.5,
                params: params(&[
                    ("pcr_high", 1.3),
                    ("pcr_low", 0.7),
                    ("rsi_oversold", 35.0),
                    ("rsi_overbought", 65.0),
                    ("divergence_lookback", 30.0),
                    ("pivot_span", 2.0),
                    ("swing_lookback", 5.0),
                ]),
            },
        },
    }
}

/// Catalog entry for one strategy.
pub fn lookup(id: StrategyId) -> Strategy {
    Strategy {
        spec: rule_spec(id),
        checklist: checklist_for(id),
    }
}

/// The full catalog in a stable order.
pub fn catalog() -> Vec<Strategy> {
    StrategyId::all().iter().map(|&id| lookup(id)).collect()
}
