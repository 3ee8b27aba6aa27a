//! Open and completed trade records for the simulator.

use std::fmt;

use chrono::NaiveDateTime;

use crate::domain::signal::{Direction, EntryValidation};
use crate::domain::strategy::{StrategyId, TrailingMode};

/// Results within this many R of zero count as scratches.
pub const SCRATCH_BAND_R: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    AdxNotExpanded,
    VwapReclaimFailed,
    StopLoss,
    TrailingStop,
    Target,
    TimeStop,
    SessionClose,
    RangeEnd,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExitReason::AdxNotExpanded => "invalidated: adx did not expand",
            ExitReason::VwapReclaimFailed => "invalidated: vwap reclaim failed",
            ExitReason::StopLoss => "stop loss hit",
            ExitReason::TrailingStop => "trailing stop hit",
            ExitReason::Target => "target hit",
            ExitReason::TimeStop => "time stop",
            ExitReason::SessionClose => "session close",
            ExitReason::RangeEnd => "range end",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeOutcome {
    Win,
    Loss,
    Scratch,
}

impl TradeOutcome {
    pub fn classify(r_multiple: f64) -> Self {
        if r_multiple > SCRATCH_BAND_R {
            TradeOutcome::Win
        } else if r_multiple < -SCRATCH_BAND_R {
            TradeOutcome::Loss
        } else {
            TradeOutcome::Scratch
        }
    }
}

impl fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeOutcome::Win => f.write_str("win"),
            TradeOutcome::Loss => f.write_str("loss"),
            TradeOutcome::Scratch => f.write_str("scratch"),
        }
    }
}

/// The single open position of one simulation.
#[derive(Debug, Clone)]
pub struct ActiveTrade {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub initial_stop: f64,
    pub stop: f64,
    pub target: f64,
    pub risk: f64,
    pub trailing: TrailingMode,
    pub max_bars: usize,
    pub reached_one_r: bool,
    pub validation: Option<EntryValidation>,
    pub expansion_met: bool,
    pub confidence: f64,
    /// Best high (long) or low (short) seen on bars after entry.
    pub best_price: f64,
}

impl ActiveTrade {
    pub fn is_long(&self) -> bool {
        self.direction == Direction::Long
    }

    /// Favourable move from entry, in R, at the best price seen so far.
    pub fn best_excursion_r(&self) -> f64 {
        if self.risk <= 0.0 {
            return 0.0;
        }
        self.direction.sign() * (self.best_price - self.entry_price) / self.risk
    }

    pub fn record_bar(&mut self, high: f64, low: f64) {
        self.best_price = if self.is_long() {
            self.best_price.max(high)
        } else {
            self.best_price.min(low)
        };
    }

    /// Move the stop to `level` if that tightens it.
    pub fn tighten_stop(&mut self, level: f64) {
        if self.is_long() {
            self.stop = self.stop.max(level);
        } else {
            self.stop = self.stop.min(level);
        }
    }

    pub fn stop_moved(&self) -> bool {
        self.stop != self.initial_stop
    }

    pub fn stop_touched(&self, high: f64, low: f64) -> bool {
        if self.is_long() {
            low <= self.stop
        } else {
            high >= self.stop
        }
    }

    pub fn target_touched(&self, high: f64, low: f64) -> bool {
        if self.is_long() {
            high >= self.target
        } else {
            low <= self.target
        }
    }

    /// Fill for a stop exit; a bar opening through the stop fills at the open.
    pub fn stop_fill(&self, open: f64) -> f64 {
        if self.is_long() {
            open.min(self.stop)
        } else {
            open.max(self.stop)
        }
    }

    /// Fill for a target exit; a bar opening through the target fills at the open.
    pub fn target_fill(&self, open: f64) -> f64 {
        if self.is_long() {
            open.max(self.target)
        } else {
            open.min(self.target)
        }
    }

    pub fn close(
        self,
        strategy: StrategyId,
        segment: &str,
        exit_index: usize,
        exit_time: NaiveDateTime,
        exit_price: f64,
        reason: ExitReason,
    ) -> SimulatedTrade {
        let pnl_points = self.direction.sign() * (exit_price - self.entry_price);
        let r_multiple = if self.risk > 0.0 {
            pnl_points / self.risk
        } else {
            0.0
        };

        SimulatedTrade {
            strategy,
            segment: segment.to_string(),
            direction: self.direction,
            entry_time: self.entry_time,
            exit_time,
            entry_price: self.entry_price,
            exit_price,
            bars_held: exit_index.saturating_sub(self.entry_index),
            stop: self.initial_stop,
            target: self.target,
            risk: self.risk,
            pnl_points,
            r_multiple,
            outcome: TradeOutcome::classify(r_multiple),
            exit_reason: reason,
            confidence: self.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedTrade {
    pub strategy: StrategyId,
    pub segment: String,
    pub direction: Direction,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub bars_held: usize,
    pub stop: f64,
    pub target: f64,
    pub risk: f64,
    pub pnl_points: f64,
    pub r_multiple: f64,
    pub outcome: TradeOutcome,
    pub exit_reason: ExitReason,
    pub confidence: f64,
}
