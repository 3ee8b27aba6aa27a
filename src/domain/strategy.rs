//! Strategy rule specifications and engine parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::series::PreparedSeries;
use crate::domain::signal::SignalCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyId {
    EmaAdxTrend,
    BbSqueezeBreakout,
    VwapReclaim,
    SupertrendMacd,
    PcrReversal,
}

impl StrategyId {
    pub fn all() -> &'static [StrategyId] {
        &[
            StrategyId::EmaAdxTrend,
            StrategyId::BbSqueezeBreakout,
            StrategyId::VwapReclaim,
            StrategyId::SupertrendMacd,
            StrategyId::PcrReversal,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::EmaAdxTrend => "ema_adx_trend",
            StrategyId::BbSqueezeBreakout => "bb_squeeze_breakout",
            StrategyId::VwapReclaim => "vwap_reclaim",
            StrategyId::SupertrendMacd => "supertrend_macd",
            StrategyId::PcrReversal => "pcr_reversal",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StrategyId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// Qualitative catalog grade; better grades earn a flat score bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityRating {
    APlus,
    A,
    BPlus,
    B,
    C,
}

impl QualityRating {
    pub fn score_bonus(&self) -> f64 {
        match self {
            QualityRating::APlus => 8.0,
            QualityRating::A => 5.0,
            QualityRating::BPlus => 3.0,
            QualityRating::B => 1.0,
            QualityRating::C => 0.0,
        }
    }
}

impl fmt::Display for QualityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityRating::APlus => "A+",
            QualityRating::A => "A",
            QualityRating::BPlus => "B+",
            QualityRating::B => "B",
            QualityRating::C => "C",
        };
        f.write_str(label)
    }
}

/// Indicator line used to ratchet the stop once a trade is 1R in profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingMode {
    FastEma,
    SlowEma,
    Supertrend,
}

impl fmt::Display for TrailingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrailingMode::FastEma => "fast_ema",
            TrailingMode::SlowEma => "slow_ema",
            TrailingMode::Supertrend => "supertrend",
        };
        f.write_str(label)
    }
}

/// Machine-readable engine parameters for one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub interval_minutes: u32,
    pub higher_timeframes: Vec<u32>,
    pub atr_period: usize,
    pub sl_atr_mult: f64,
    pub reward_multiple: f64,
    pub max_bars_held: usize,
    pub min_bars_between_trades: usize,
    pub risk_per_trade_pct: f64,
    pub daily_risk_cap_pct: f64,
    pub params: BTreeMap<String, f64>,
}

impl EngineConfig {
    pub fn param(&self, key: &str, default: f64) -> f64 {
        self.params.get(key).copied().unwrap_or(default)
    }

    /// Integer parameter (periods, bar counts); negative values clamp to 0.
    pub fn period(&self, key: &str, default: usize) -> usize {
        self.params
            .get(key)
            .map(|v| v.max(0.0).round() as usize)
            .unwrap_or(default)
    }

    /// Set an engine field by name, or a parameter-map entry for any other key.
    pub fn apply_override(&mut self, key: &str, value: f64) {
        let count = value.max(0.0).round() as usize;
        match key {
            "interval_minutes" => self.interval_minutes = value.max(1.0).round() as u32,
            "atr_period" => self.atr_period = count,
            "sl_atr_mult" => self.sl_atr_mult = value,
            "reward_multiple" => self.reward_multiple = value,
            "max_bars_held" => self.max_bars_held = count,
            "min_bars_between_trades" => self.min_bars_between_trades = count,
            "risk_per_trade_pct" => self.risk_per_trade_pct = value,
            "daily_risk_cap_pct" => self.daily_risk_cap_pct = value,
            _ => {
                self.params.insert(key.to_string(), value);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRuleSpec {
    pub id: StrategyId,
    pub name: String,
    pub rating: QualityRating,
    pub entry_long: String,
    pub entry_short: String,
    pub exit: String,
    pub engine: EngineConfig,
}

/// Per-bar checklist deciding whether a trade opens at bar `i`.
pub type Checklist = fn(&StrategyRuleSpec, &PreparedSeries, usize) -> Option<SignalCandidate>;

/// A catalog entry: the rule spec plus the checklist that reads it.
#[derive(Clone)]
pub struct Strategy {
    pub spec: StrategyRuleSpec,
    pub checklist: Checklist,
}

impl Strategy {
    pub fn id(&self) -> StrategyId {
        self.spec.id
    }

    pub fn detect(&self, series: &PreparedSeries, i: usize) -> Option<SignalCandidate> {
        (self.checklist)(&self.spec, series, i)
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("spec", &self.spec).finish()
    }
}
