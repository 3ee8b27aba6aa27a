//! Per-bar signal detection.
//!
//! Each strategy owns one checklist function. A checklist emits a candidate
//! only when every required condition for one direction holds; optional
//! confirmations only raise the confidence score.

use std::fmt;

use crate::domain::indicator::{bearish_divergence, bullish_divergence};
use crate::domain::indicator_helpers::{
    crossed_above, crossed_below, highest_at, is_falling, is_rising, lowest_at,
};
use crate::domain::series::PreparedSeries;
use crate::domain::strategy::{StrategyRuleSpec, TrailingMode};

pub const BASE_CONFIDENCE: f64 = 55.0;
pub const CONFIDENCE_BONUS_SPAN: f64 = 40.0;
pub const MIN_CONFIDENCE: f64 = 40.0;
pub const MAX_CONFIDENCE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => f.write_str("LONG"),
            Direction::Short => f.write_str("SHORT"),
        }
    }
}

/// Post-entry condition that must hold or the trade is closed early.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryValidation {
    /// ADX must reach `min_adx` by the time `within_bars` bars have elapsed.
    TrendExpansion { within_bars: usize, min_adx: f64 },
    /// The first bar after entry must close on the entry side of VWAP.
    VwapHold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalCandidate {
    pub direction: Direction,
    pub confidence: f64,
    pub stop: f64,
    pub trailing: TrailingMode,
    pub validation: Option<EntryValidation>,
}

/// Base score plus a bonus proportional to the share of true confirmations.
pub fn confidence(confirmations: &[bool]) -> f64 {
    let bonus = if confirmations.is_empty() {
        0.0
    } else {
        let hits = confirmations.iter().filter(|&&c| c).count();
        CONFIDENCE_BONUS_SPAN * hits as f64 / confirmations.len() as f64
    };
    (BASE_CONFIDENCE + bonus).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// The further of the recent swing extreme and the ATR buffer from the close.
pub fn initial_stop(
    series: &PreparedSeries,
    i: usize,
    direction: Direction,
    swing_lookback: usize,
    atr_mult: f64,
) -> f64 {
    let buffer = atr_mult * series.atr[i];
    match direction {
        Direction::Long => lowest_at(&series.low, i, swing_lookback).min(series.close[i] - buffer),
        Direction::Short => {
            highest_at(&series.high, i, swing_lookback).max(series.close[i] + buffer)
        }
    }
}

fn build_candidate(
    spec: &StrategyRuleSpec,
    series: &PreparedSeries,
    i: usize,
    direction: Direction,
    confirmations: &[bool],
    trailing: TrailingMode,
    validation: Option<EntryValidation>,
) -> SignalCandidate {
    let engine = &spec.engine;
    SignalCandidate {
        direction,
        confidence: confidence(confirmations),
        stop: initial_stop(
            series,
            i,
            direction,
            engine.period("swing_lookback", 5),
            engine.sl_atr_mult,
        ),
        trailing,
        validation,
    }
}

fn higher_trend_up(series: &PreparedSeries, i: usize) -> bool {
    series.primary_higher().map_or(true, |h| h.trend_up(i))
}

fn higher_trend_down(series: &PreparedSeries, i: usize) -> bool {
    series.primary_higher().map_or(true, |h| h.trend_down(i))
}

fn higher_adx(series: &PreparedSeries, i: usize) -> f64 {
    series.primary_higher().map_or(0.0, |h| h.adx[i])
}

fn volume_expanding(series: &PreparedSeries, i: usize, mult: f64) -> bool {
    series.volume_sma[i] > 0.0 && series.volume[i] >= mult * series.volume_sma[i]
}

fn trend_expansion(spec: &StrategyRuleSpec, series: &PreparedSeries, i: usize) -> EntryValidation {
    EntryValidation::TrendExpansion {
        within_bars: spec.engine.period("validation_bars", 3),
        min_adx: series.adx.adx[i] + spec.engine.param("adx_expansion", 2.0),
    }
}

/// EMA stack with a strengthening ADX and expanding MACD histogram.
pub fn ema_adx_trend(
    spec: &StrategyRuleSpec,
    series: &PreparedSeries,
    i: usize,
) -> Option<SignalCandidate> {
    if i < 2 {
        return None;
    }
    let min_adx = spec.engine.param("min_adx", 20.0);
    let close = series.close[i];
    let (fast, slow) = (series.ema_fast[i], series.ema_slow[i]);
    let adx = &series.adx;
    let hist = &series.macd.histogram;
    let adx_ok = adx.adx[i] >= min_adx && is_rising(&adx.adx, i);

    let long = close > fast
        && fast > slow
        && adx_ok
        && hist[i] > 0.0
        && is_rising(hist, i)
        && higher_trend_up(series, i);
    let short = close < fast
        && fast < slow
        && adx_ok
        && hist[i] < 0.0
        && is_falling(hist, i)
        && higher_trend_down(series, i);

    let direction = match (long, short) {
        (true, false) => Direction::Long,
        (false, true) => Direction::Short,
        _ => return None,
    };

    let confirmations = match direction {
        Direction::Long => [
            adx.plus_di[i] > adx.minus_di[i],
            series.rsi[i] > 50.0 && series.rsi[i] < 75.0,
            close > series.vwap[i],
            is_rising(&series.obv, i),
            volume_expanding(series, i, 1.0),
            higher_adx(series, i) >= min_adx,
        ],
        Direction::Short => [
            adx.minus_di[i] > adx.plus_di[i],
            series.rsi[i] < 50.0 && series.rsi[i] > 25.0,
            close < series.vwap[i],
            is_falling(&series.obv, i),
            volume_expanding(series, i, 1.0),
            higher_adx(series, i) >= min_adx,
        ],
    };

    Some(build_candidate(
        spec,
        series,
        i,
        direction,
        &confirmations,
        TrailingMode::FastEma,
        Some(trend_expansion(spec, series, i)),
    ))
}

/// Fresh Bollinger band break after a bandwidth squeeze, on expanding volume.
pub fn bb_squeeze_breakout(
    spec: &StrategyRuleSpec,
    series: &PreparedSeries,
    i: usize,
) -> Option<SignalCandidate> {
    let engine = &spec.engine;
    let lookback = engine.period("squeeze_lookback", 12).max(1);
    if i < lookback {
        return None;
    }
    let threshold = engine.param("squeeze_bandwidth", 0.01);
    let bands = &series.bollinger;
    let squeezed = (i - lookback..i).any(|j| bands.bandwidth[j] < threshold);
    let volume_ok = volume_expanding(series, i, engine.param("volume_mult", 1.5));
    let close = &series.close;

    let long = squeezed
        && close[i] > bands.upper[i]
        && close[i - 1] <= bands.upper[i - 1]
        && volume_ok
        && is_rising(&series.obv, i);
    let short = squeezed
        && close[i] < bands.lower[i]
        && close[i - 1] >= bands.lower[i - 1]
        && volume_ok
        && is_falling(&series.obv, i);

    let direction = match (long, short) {
        (true, false) => Direction::Long,
        (false, true) => Direction::Short,
        _ => return None,
    };

    let hist = series.macd.histogram[i];
    let confirmations = match direction {
        Direction::Long => [
            higher_trend_up(series, i),
            is_rising(&series.adx.adx, i),
            hist > 0.0,
            close[i] > series.vwap[i],
            series.rsi[i] > 55.0,
        ],
        Direction::Short => [
            higher_trend_down(series, i),
            is_rising(&series.adx.adx, i),
            hist < 0.0,
            close[i] < series.vwap[i],
            series.rsi[i] < 45.0,
        ],
    };

    Some(build_candidate(
        spec,
        series,
        i,
        direction,
        &confirmations,
        TrailingMode::SlowEma,
        None,
    ))
}

/// Close reclaims (or loses) the session VWAP in the direction of the higher trend.
pub fn vwap_reclaim(
    spec: &StrategyRuleSpec,
    series: &PreparedSeries,
    i: usize,
) -> Option<SignalCandidate> {
    if i < 1 {
        return None;
    }
    // A new session resets VWAP, so the previous bar must share the session.
    if series.session(i) != series.session(i - 1) {
        return None;
    }
    let engine = &spec.engine;
    let close = &series.close;
    let vwap = &series.vwap;
    let rsi = series.rsi[i];

    let long = close[i - 1] < vwap[i - 1]
        && close[i] > vwap[i]
        && rsi >= engine.param("rsi_floor", 50.0)
        && higher_trend_up(series, i);
    let short = close[i - 1] > vwap[i - 1]
        && close[i] < vwap[i]
        && rsi <= engine.param("rsi_ceiling", 50.0)
        && higher_trend_down(series, i);

    let direction = match (long, short) {
        (true, false) => Direction::Long,
        (false, true) => Direction::Short,
        _ => return None,
    };

    let oi_net = series.oi_buildup[i].as_ref().map(|p| p.net_change());
    let pressure = series.sentiment[i].as_ref().map(|s| s.buy_pressure());
    let hist = &series.macd.histogram;
    let confirmations = match direction {
        Direction::Long => [
            oi_net.is_some_and(|n| n > 0.0),
            pressure.is_some_and(|p| p > 0.5),
            volume_expanding(series, i, 1.0),
            series.ema_fast[i] > series.ema_slow[i],
            is_rising(hist, i),
        ],
        Direction::Short => [
            oi_net.is_some_and(|n| n < 0.0),
            pressure.is_some_and(|p| p < 0.5),
            volume_expanding(series, i, 1.0),
            series.ema_fast[i] < series.ema_slow[i],
            is_falling(hist, i),
        ],
    };

    Some(build_candidate(
        spec,
        series,
        i,
        direction,
        &confirmations,
        TrailingMode::FastEma,
        Some(EntryValidation::VwapHold),
    ))
}

/// Recent Supertrend flip confirmed by MACD and trend strength.
pub fn supertrend_macd(
    spec: &StrategyRuleSpec,
    series: &PreparedSeries,
    i: usize,
) -> Option<SignalCandidate> {
    if i < 2 {
        return None;
    }
    let engine = &spec.engine;
    let flip_lookback = engine.period("flip_lookback", 3).max(1);
    let st = &series.supertrend;
    let recent_flip = (i + 1).saturating_sub(flip_lookback).max(1)..=i;
    let flipped_recently = recent_flip.into_iter().any(|j| st.flipped_at(j));
    let macd = &series.macd;
    let adx_ok = series.adx.adx[i] >= engine.param("min_adx", 18.0);

    let long = st.trend[i] == 1
        && flipped_recently
        && macd.line[i] > macd.signal[i]
        && macd.histogram[i] > 0.0
        && adx_ok
        && higher_trend_up(series, i);
    let short = st.trend[i] == -1
        && flipped_recently
        && macd.line[i] < macd.signal[i]
        && macd.histogram[i] < 0.0
        && adx_ok
        && higher_trend_down(series, i);

    let direction = match (long, short) {
        (true, false) => Direction::Long,
        (false, true) => Direction::Short,
        _ => return None,
    };

    let close = series.close[i];
    let adx = &series.adx;
    let confirmations = match direction {
        Direction::Long => [
            adx.plus_di[i] > adx.minus_di[i],
            close > series.ema_slow[i],
            close > series.vwap[i],
            volume_expanding(series, i, 1.0),
            series.rsi[i] > 50.0,
        ],
        Direction::Short => [
            adx.minus_di[i] > adx.plus_di[i],
            close < series.ema_slow[i],
            close < series.vwap[i],
            volume_expanding(series, i, 1.0),
            series.rsi[i] < 50.0,
        ],
    };

    Some(build_candidate(
        spec,
        series,
        i,
        direction,
        &confirmations,
        TrailingMode::Supertrend,
        Some(trend_expansion(spec, series, i)),
    ))
}

/// Contrarian entry on an extreme put-call ratio once price turns through EMA9.
pub fn pcr_reversal(
    spec: &StrategyRuleSpec,
    series: &PreparedSeries,
    i: usize,
) -> Option<SignalCandidate> {
    if i < 3 {
        return None;
    }
    let snapshot = series.sentiment[i].as_ref()?;
    let engine = &spec.engine;
    let pcr = snapshot.put_call_ratio;
    let lookback = engine.period("divergence_lookback", 30);
    let span = engine.period("pivot_span", 2);
    let rsi = &series.rsi;
    let recent_rsi_low = lowest_at(rsi, i, 3);
    let recent_rsi_high = highest_at(rsi, i, 3);

    let long = pcr >= engine.param("pcr_high", 1.3)
        && (recent_rsi_low <= engine.param("rsi_oversold", 35.0)
            || bullish_divergence(&series.low, rsi, i, lookback, span))
        && crossed_above(&series.close, &series.ema_fast, i);
    let short = pcr <= engine.param("pcr_low", 0.7)
        && (recent_rsi_high >= engine.param("rsi_overbought", 65.0)
            || bearish_divergence(&series.high, rsi, i, lookback, span))
        && crossed_below(&series.close, &series.ema_fast, i);

    let direction = match (long, short) {
        (true, false) => Direction::Long,
        (false, true) => Direction::Short,
        _ => return None,
    };

    let oi_net = series.oi_buildup[i].as_ref().map(|p| p.net_change());
    let hist = &series.macd.histogram;
    let confirmations = match direction {
        Direction::Long => [
            oi_net.is_some_and(|n| n > 0.0),
            snapshot.buy_pressure() > 0.5,
            is_rising(hist, i),
            volume_expanding(series, i, 1.0),
            snapshot.last_price < snapshot.max_pain,
        ],
        Direction::Short => [
            oi_net.is_some_and(|n| n < 0.0),
            snapshot.buy_pressure() < 0.5,
            is_falling(hist, i),
            volume_expanding(series, i, 1.0),
            snapshot.last_price > snapshot.max_pain,
        ],
    };

    Some(build_candidate(
        spec,
        series,
        i,
        direction,
        &confirmations,
        TrailingMode::SlowEma,
        None,
    ))
}
