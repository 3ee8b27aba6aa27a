//! Series preparation: resampling, indicator computation and timeline alignment.
//!
//! Higher-timeframe indicators and point-in-time events are mapped onto the
//! execution timeline with a single forward pointer per source, so alignment
//! is one linear merge over two ascending sequences.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::candle::Candle;
use crate::domain::indicator::{
    self, AdxSeries, BollingerSeries, MacdSeries, SupertrendSeries, adx, bollinger, macd,
    supertrend,
};
use crate::domain::market_data::{OiBuildupPoint, SentimentSnapshot, Timestamped};
use crate::domain::segment::SegmentData;
use crate::domain::strategy::{EngineConfig, StrategyRuleSpec, TrailingMode};

/// Fewer execution bars than this leave indicators unstable.
pub const MIN_PREPARED_BARS: usize = 60;

const HTF_EMA_FAST: usize = 9;
const HTF_EMA_SLOW: usize = 21;

/// Higher-timeframe trend filter values, already aligned to execution bars.
#[derive(Debug, Clone, PartialEq)]
pub struct HigherTimeframeSeries {
    pub interval_minutes: u32,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub adx: Vec<f64>,
    pub close: Vec<f64>,
}

impl HigherTimeframeSeries {
    pub fn trend_up(&self, i: usize) -> bool {
        self.ema_fast[i] > self.ema_slow[i] && self.close[i] > self.ema_slow[i]
    }

    pub fn trend_down(&self, i: usize) -> bool {
        self.ema_fast[i] < self.ema_slow[i] && self.close[i] < self.ema_slow[i]
    }
}

#[derive(Debug, Clone)]
pub struct PreparedSeries {
    pub segment: String,
    pub interval_minutes: u32,
    pub timestamps: Vec<NaiveDateTime>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: MacdSeries,
    pub atr: Vec<f64>,
    pub adx: AdxSeries,
    pub bollinger: BollingerSeries,
    pub obv: Vec<f64>,
    pub supertrend: SupertrendSeries,
    pub vwap: Vec<f64>,
    pub volume_sma: Vec<f64>,
    pub higher: Vec<HigherTimeframeSeries>,
    pub sentiment: Vec<Option<SentimentSnapshot>>,
    pub oi_buildup: Vec<Option<OiBuildupPoint>>,
}

impl PreparedSeries {
    /// Compute every series from execution-interval `bars`; higher timeframes
    /// are resampled from the raw candles in `source`.
    pub fn build(engine: &EngineConfig, bars: &[Candle], source: &SegmentData) -> Self {
        let timestamps: Vec<NaiveDateTime> = bars.iter().map(|c| c.timestamp).collect();
        let close = indicator::closes(bars);
        let volume = indicator::volumes(bars);

        let higher = engine
            .higher_timeframes
            .iter()
            .map(|&interval| build_higher_timeframe(interval, &source.candles, &timestamps))
            .collect();

        PreparedSeries {
            segment: source.segment.clone(),
            interval_minutes: engine.interval_minutes,
            open: bars.iter().map(|c| c.open).collect(),
            high: bars.iter().map(|c| c.high).collect(),
            low: bars.iter().map(|c| c.low).collect(),
            ema_fast: indicator::calculate_ema(&close, engine.period("ema_fast", 9)),
            ema_slow: indicator::calculate_ema(&close, engine.period("ema_slow", 21)),
            rsi: indicator::calculate_rsi(&close, engine.period("rsi_period", 14)),
            macd: indicator::calculate_macd(
                &close,
                macd::DEFAULT_FAST,
                macd::DEFAULT_SLOW,
                macd::DEFAULT_SIGNAL,
            ),
            atr: indicator::calculate_atr(bars, engine.atr_period),
            adx: indicator::calculate_adx(bars, engine.period("adx_period", adx::DEFAULT_PERIOD)),
            bollinger: indicator::calculate_bollinger(
                &close,
                engine.period("bb_period", bollinger::DEFAULT_PERIOD),
                engine.param("bb_mult", bollinger::DEFAULT_MULTIPLIER),
            ),
            obv: indicator::calculate_obv(bars),
            supertrend: indicator::calculate_supertrend(
                bars,
                engine.period("st_period", supertrend::DEFAULT_PERIOD),
                engine.param("st_mult", supertrend::DEFAULT_MULTIPLIER),
            ),
            vwap: indicator::calculate_session_vwap(bars),
            volume_sma: indicator::calculate_sma(&volume, engine.period("volume_period", 20)),
            higher,
            sentiment: align_last_known(&timestamps, &source.sentiment),
            oi_buildup: align_last_known(&timestamps, &source.oi_buildup),
            timestamps,
            close,
            volume,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn session(&self, i: usize) -> NaiveDate {
        self.timestamps[i].date()
    }

    /// True when a later bar exists and it belongs to another session.
    pub fn closes_session(&self, i: usize) -> bool {
        i + 1 < self.len() && self.session(i + 1) != self.session(i)
    }

    /// First declared higher timeframe, the one checklists filter on.
    pub fn primary_higher(&self) -> Option<&HigherTimeframeSeries> {
        self.higher.first()
    }

    pub fn trailing_line(&self, mode: TrailingMode, i: usize) -> f64 {
        match mode {
            TrailingMode::FastEma => self.ema_fast[i],
            TrailingMode::SlowEma => self.ema_slow[i],
            TrailingMode::Supertrend => self.supertrend.line[i],
        }
    }
}

/// Resample to the strategy's execution interval and build the aligned bundle.
/// Returns `None` when fewer than `min_bars` execution bars are available.
pub fn prepare_series(
    spec: &StrategyRuleSpec,
    data: &SegmentData,
    min_bars: usize,
) -> Option<PreparedSeries> {
    let bars = indicator::resample(&data.candles, spec.engine.interval_minutes);
    if bars.len() < min_bars {
        return None;
    }
    Some(PreparedSeries::build(&spec.engine, &bars, data))
}

fn build_higher_timeframe(
    interval_minutes: u32,
    raw: &[Candle],
    targets: &[NaiveDateTime],
) -> HigherTimeframeSeries {
    let bars = indicator::resample(raw, interval_minutes);
    let source_times: Vec<NaiveDateTime> = bars.iter().map(|c| c.timestamp).collect();
    let close = indicator::closes(&bars);
    let ema_fast = indicator::calculate_ema(&close, HTF_EMA_FAST);
    let ema_slow = indicator::calculate_ema(&close, HTF_EMA_SLOW);
    let adx = indicator::calculate_adx(&bars, adx::DEFAULT_PERIOD).adx;

    let indices = last_known_indices(targets, &source_times);
    let pick = |values: &[f64]| align_with_fallback(&indices, values);

    HigherTimeframeSeries {
        interval_minutes,
        ema_fast: pick(&ema_fast),
        ema_slow: pick(&ema_slow),
        adx: pick(&adx),
        close: pick(&close),
    }
}

/// For each target, the index of the last source timestamp <= target.
/// Both inputs must be ascending; the pointer only moves forward.
pub fn last_known_indices(targets: &[NaiveDateTime], sources: &[NaiveDateTime]) -> Vec<Option<usize>> {
    let mut out = Vec::with_capacity(targets.len());
    let mut next = 0;

    for target in targets {
        while next < sources.len() && sources[next] <= *target {
            next += 1;
        }
        out.push(next.checked_sub(1));
    }

    out
}

/// Aligned values; targets before the first source repeat the first value.
fn align_with_fallback(indices: &[Option<usize>], values: &[f64]) -> Vec<f64> {
    let first = values.first().copied().unwrap_or(0.0);
    indices
        .iter()
        .map(|idx| idx.map(|j| values[j]).unwrap_or(first))
        .collect()
}

/// Nearest prior point for every target, `None` before the first point.
pub fn align_last_known<T: Timestamped + Clone>(
    targets: &[NaiveDateTime],
    points: &[T],
) -> Vec<Option<T>> {
    let times: Vec<NaiveDateTime> = points.iter().map(|p| p.timestamp()).collect();
    last_known_indices(targets, &times)
        .into_iter()
        .map(|idx| idx.map(|j| points[j].clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;
    use crate::domain::strategy::StrategyId;
    use chrono::Duration;

    fn t(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn minute_candles(count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.1).sin() * 2.0 + i as f64 * 0.01;
                Candle {
                    timestamp: t(i as i64),
                    open: close - 0.05,
                    high: close + 0.2,
                    low: close - 0.2,
                    close,
                    volume: 1_000.0 + (i % 7) as f64 * 10.0,
                }
            })
            .collect()
    }

    #[test]
    fn last_known_indices_forward_pointer() {
        let targets = [t(0), t(5), t(10), t(15), t(20)];
        let sources = [t(3), t(10), t(18)];
        assert_eq!(
            last_known_indices(&targets, &sources),
            vec![None, Some(0), Some(1), Some(1), Some(2)]
        );
    }

    #[test]
    fn last_known_indices_empty_sources() {
        assert_eq!(last_known_indices(&[t(0), t(1)], &[]), vec![None, None]);
    }

    #[test]
    fn fallback_repeats_first_value() {
        let indices = vec![None, Some(0), Some(1)];
        assert_eq!(align_with_fallback(&indices, &[7.0, 8.0]), vec![7.0, 7.0, 8.0]);
    }

    #[test]
    fn align_sentiment_absent_before_first_point() {
        let snaps = vec![SentimentSnapshot {
            timestamp: t(7),
            put_call_ratio: 1.4,
            buy_quantity: 1.0,
            sell_quantity: 1.0,
            traded_volume: 1.0,
            max_pain: 100.0,
            last_price: 100.0,
        }];
        let aligned = align_last_known(&[t(0), t(5), t(10)], &snaps);
        assert!(aligned[0].is_none());
        assert!(aligned[1].is_none());
        assert_eq!(aligned[2].as_ref().map(|s| s.put_call_ratio), Some(1.4));
    }

    #[test]
    fn prepare_series_rejects_short_history() {
        let spec = catalog::rule_spec(StrategyId::EmaAdxTrend);
        // 5-minute strategy: 250 one-minute candles give 50 bars.
        let data = SegmentData::new("NIFTY", minute_candles(250));
        assert!(prepare_series(&spec, &data, MIN_PREPARED_BARS).is_none());
    }

    #[test]
    fn prepare_series_aligns_every_array() {
        let spec = catalog::rule_spec(StrategyId::EmaAdxTrend);
        let data = SegmentData::new("NIFTY", minute_candles(360));
        let series = prepare_series(&spec, &data, MIN_PREPARED_BARS).unwrap();

        let n = series.len();
        assert_eq!(n, 72);
        assert_eq!(series.segment, "NIFTY");
        assert_eq!(series.interval_minutes, 5);
        for len in [
            series.close.len(),
            series.ema_fast.len(),
            series.ema_slow.len(),
            series.rsi.len(),
            series.macd.histogram.len(),
            series.atr.len(),
            series.adx.adx.len(),
            series.bollinger.bandwidth.len(),
            series.obv.len(),
            series.supertrend.line.len(),
            series.vwap.len(),
            series.volume_sma.len(),
            series.sentiment.len(),
            series.oi_buildup.len(),
        ] {
            assert_eq!(len, n);
        }
        assert_eq!(series.higher.len(), 1);
        assert_eq!(series.higher[0].interval_minutes, 15);
        assert_eq!(series.higher[0].close.len(), n);
    }

    #[test]
    fn higher_timeframe_close_tracks_bucket() {
        let spec = catalog::rule_spec(StrategyId::EmaAdxTrend);
        let data = SegmentData::new("NIFTY", minute_candles(360));
        let series = prepare_series(&spec, &data, MIN_PREPARED_BARS).unwrap();
        let htf_bars = indicator::resample(&data.candles, 15);

        // Execution bar 3 starts at 09:30, the second 15m bucket.
        assert_eq!(series.higher[0].close[3], htf_bars[1].close);
        assert_eq!(series.higher[0].close[0], htf_bars[0].close);
    }

    #[test]
    fn closes_session_only_before_a_date_change() {
        let spec = catalog::rule_spec(StrategyId::EmaAdxTrend);
        let mut candles = minute_candles(360);
        for c in candles.iter_mut().skip(180) {
            c.timestamp += Duration::days(1);
        }
        let data = SegmentData::new("NIFTY", candles);
        let series = prepare_series(&spec, &data, MIN_PREPARED_BARS).unwrap();
        assert!(series.closes_session(35));
        assert!(!series.closes_session(34));
        assert!(!series.closes_session(series.len() - 1));
    }

    #[test]
    fn indicator_outputs_are_finite() {
        for strategy in catalog::catalog() {
            let data = SegmentData::new("NIFTY", minute_candles(1_200));
            let series = prepare_series(&strategy.spec, &data, MIN_PREPARED_BARS).unwrap();
            for i in 0..series.len() {
                assert!(series.rsi[i].is_finite());
                assert!(series.adx.adx[i].is_finite());
                assert!(series.bollinger.bandwidth[i].is_finite());
                assert!(series.supertrend.line[i].is_finite());
                assert!(series.vwap[i].is_finite());
            }
        }
    }
}
