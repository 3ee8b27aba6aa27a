//! Walk-forward trade simulation.
//!
//! One pass over the prepared bars with at most one open position. Entries
//! fill at the signal bar's close; exits are evaluated from the next bar on.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::domain::position::{ActiveTrade, ExitReason, SimulatedTrade};
use crate::domain::series::PreparedSeries;
use crate::domain::signal::{Direction, EntryValidation, SignalCandidate};
use crate::domain::strategy::{EngineConfig, Strategy};

const RISK_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Open positions are closed on the first bar at or after this time.
    pub session_close: NaiveTime,
    /// No new entries at or after this time.
    pub entry_cutoff: NaiveTime,
    /// Stop offset, in percent of entry, used when a proposed stop is unusable.
    pub fallback_stop_pct: f64,
    /// Per-unit risk below this is treated as noise and the signal dropped.
    pub min_risk_points: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            session_close: NaiveTime::from_hms_opt(15, 15, 0).unwrap_or(NaiveTime::MIN),
            entry_cutoff: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or(NaiveTime::MIN),
            fallback_stop_pct: 0.3,
            min_risk_points: 0.05,
        }
    }
}

pub fn run_backtest(
    strategy: &Strategy,
    series: &PreparedSeries,
    config: &BacktestConfig,
) -> Vec<SimulatedTrade> {
    let engine = &strategy.spec.engine;
    let n = series.len();
    let mut trades = Vec::new();
    let mut active: Option<ActiveTrade> = None;
    let mut last_exit: Option<usize> = None;
    let mut risk_used: HashMap<NaiveDate, f64> = HashMap::new();

    for i in 0..n {
        if let Some(mut trade) = active.take() {
            match manage_open_trade(&mut trade, series, i, config) {
                Some((price, reason)) => {
                    debug!(
                        strategy = %strategy.id(),
                        segment = %series.segment,
                        bar = i,
                        price,
                        reason = %reason,
                        "Trade closed"
                    );
                    trades.push(trade.close(
                        strategy.id(),
                        &series.segment,
                        i,
                        series.timestamps[i],
                        price,
                        reason,
                    ));
                    last_exit = Some(i);
                }
                None => active = Some(trade),
            }
            continue;
        }

        let session = series.session(i);
        let used = risk_used.get(&session).copied().unwrap_or(0.0);
        if !entry_allowed(engine, series, i, last_exit, used, config) {
            continue;
        }

        let Some(candidate) = strategy.detect(series, i) else {
            continue;
        };

        if let Some(trade) = open_trade(candidate, engine, series, i, config) {
            debug!(
                strategy = %strategy.id(),
                segment = %series.segment,
                bar = i,
                direction = %trade.direction,
                entry = trade.entry_price,
                stop = trade.stop,
                target = trade.target,
                "Trade opened"
            );
            *risk_used.entry(session).or_insert(0.0) += engine.risk_per_trade_pct;
            active = Some(trade);
        }
    }

    if let Some(trade) = active {
        let last = n - 1;
        trades.push(trade.close(
            strategy.id(),
            &series.segment,
            last,
            series.timestamps[last],
            series.close[last],
            ExitReason::RangeEnd,
        ));
    }

    trades
}

fn entry_allowed(
    engine: &EngineConfig,
    series: &PreparedSeries,
    i: usize,
    last_exit: Option<usize>,
    risk_used_today: f64,
    config: &BacktestConfig,
) -> bool {
    if i + 1 >= series.len() || series.closes_session(i) {
        return false;
    }
    if last_exit.is_some_and(|k| i < k.saturating_add(engine.min_bars_between_trades)) {
        return false;
    }
    if series.timestamps[i].time() >= config.entry_cutoff {
        return false;
    }
    risk_used_today + engine.risk_per_trade_pct <= engine.daily_risk_cap_pct + RISK_EPSILON
}

/// Stop on the protective side of `entry`, or the fixed-offset fallback.
pub fn resolve_stop(proposed: f64, entry: f64, direction: Direction, fallback_pct: f64) -> f64 {
    let sign = direction.sign();
    if proposed.is_finite() && sign * (entry - proposed) > 0.0 {
        proposed
    } else {
        entry * (1.0 - sign * fallback_pct / 100.0)
    }
}

fn open_trade(
    candidate: SignalCandidate,
    engine: &EngineConfig,
    series: &PreparedSeries,
    i: usize,
    config: &BacktestConfig,
) -> Option<ActiveTrade> {
    let entry = series.close[i];
    let direction = candidate.direction;
    let stop = resolve_stop(candidate.stop, entry, direction, config.fallback_stop_pct);
    let risk = (entry - stop).abs();
    if !(risk >= config.min_risk_points) {
        return None;
    }

    Some(ActiveTrade {
        direction,
        entry_index: i,
        entry_time: series.timestamps[i],
        entry_price: entry,
        initial_stop: stop,
        stop,
        target: entry + direction.sign() * risk * engine.reward_multiple,
        risk,
        trailing: candidate.trailing,
        max_bars: engine.max_bars_held,
        reached_one_r: false,
        validation: candidate.validation,
        expansion_met: false,
        confidence: candidate.confidence,
        best_price: entry,
    })
}

/// Process bar `j` for an open trade; returns the fill and reason on exit.
fn manage_open_trade(
    trade: &mut ActiveTrade,
    series: &PreparedSeries,
    j: usize,
    config: &BacktestConfig,
) -> Option<(f64, ExitReason)> {
    let (open, high, low, close) = (series.open[j], series.high[j], series.low[j], series.close[j]);

    update_trailing_stop(trade, series, j);

    if let Some(reason) = invalidation(trade, series, j) {
        return Some((close, reason));
    }
    if trade.stop_touched(high, low) {
        let reason = if trade.stop_moved() {
            ExitReason::TrailingStop
        } else {
            ExitReason::StopLoss
        };
        return Some((trade.stop_fill(open), reason));
    }
    if trade.target_touched(high, low) {
        return Some((trade.target_fill(open), ExitReason::Target));
    }
    if j - trade.entry_index >= trade.max_bars {
        return Some((close, ExitReason::TimeStop));
    }
    if series.closes_session(j) || series.timestamps[j].time() >= config.session_close {
        return Some((close, ExitReason::SessionClose));
    }

    trade.record_bar(high, low);
    None
}

/// Breakeven once the trade has run 1R, then follow the previous bar's
/// trailing line while it stays behind that bar's close.
fn update_trailing_stop(trade: &mut ActiveTrade, series: &PreparedSeries, j: usize) {
    if !trade.reached_one_r && trade.best_excursion_r() >= 1.0 {
        trade.reached_one_r = true;
        trade.tighten_stop(trade.entry_price);
    }
    if !trade.reached_one_r || j == 0 {
        return;
    }

    let line = series.trailing_line(trade.trailing, j - 1);
    let prev_close = series.close[j - 1];
    let behind = match trade.direction {
        Direction::Long => line < prev_close,
        Direction::Short => line > prev_close,
    };
    if line.is_finite() && behind {
        trade.tighten_stop(line);
    }
}

fn invalidation(trade: &mut ActiveTrade, series: &PreparedSeries, j: usize) -> Option<ExitReason> {
    match trade.validation? {
        EntryValidation::TrendExpansion {
            within_bars,
            min_adx,
        } => {
            if trade.expansion_met {
                return None;
            }
            if series.adx.adx[j] >= min_adx {
                trade.expansion_met = true;
                return None;
            }
            (j - trade.entry_index >= within_bars).then_some(ExitReason::AdxNotExpanded)
        }
        EntryValidation::VwapHold => {
            if j != trade.entry_index + 1 {
                return None;
            }
            let held = match trade.direction {
                Direction::Long => series.close[j] > series.vwap[j],
                Direction::Short => series.close[j] < series.vwap[j],
            };
            (!held).then_some(ExitReason::VwapReclaimFailed)
        }
    }
}
