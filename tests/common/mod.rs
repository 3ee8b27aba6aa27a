#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use stratlab::domain::candle::Candle;
use stratlab::domain::catalog;
use stratlab::domain::error::StratlabError;
use stratlab::domain::market_data::{OiBuildupPoint, SentimentSnapshot};
use stratlab::domain::segment::DateRange;
use stratlab::domain::series::PreparedSeries;
use stratlab::domain::signal::{Direction, SignalCandidate};
use stratlab::domain::strategy::{Checklist, Strategy, StrategyId, TrailingMode};
use stratlab::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub struct MockDataPort {
    pub candles: HashMap<String, Vec<Candle>>,
    pub sentiment: HashMap<String, Vec<SentimentSnapshot>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            candles: HashMap::new(),
            sentiment: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, segment: &str, candles: Vec<Candle>) -> Self {
        self.candles.insert(segment.to_string(), candles);
        self
    }

    pub fn with_sentiment(mut self, segment: &str, snapshots: Vec<SentimentSnapshot>) -> Self {
        self.sentiment.insert(segment.to_string(), snapshots);
        self
    }

    pub fn with_error(mut self, segment: &str, reason: &str) -> Self {
        self.errors.insert(segment.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(
        &self,
        segment: &str,
        range: &DateRange,
    ) -> Result<Vec<Candle>, StratlabError> {
        if let Some(reason) = self.errors.get(segment) {
            return Err(StratlabError::data(reason.clone()));
        }
        Ok(self
            .candles
            .get(segment)
            .map(|c| {
                c.iter()
                    .filter(|c| range.contains(c.timestamp.date()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_sentiment(
        &self,
        segment: &str,
        range: &DateRange,
    ) -> Result<Vec<SentimentSnapshot>, StratlabError> {
        Ok(self
            .sentiment
            .get(segment)
            .map(|s| {
                s.iter()
                    .filter(|s| range.contains(s.timestamp.date()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_oi_buildup(
        &self,
        _segment: &str,
        _range: &DateRange,
    ) -> Result<Vec<OiBuildupPoint>, StratlabError> {
        Ok(Vec::new())
    }

    fn list_segments(&self) -> Result<Vec<String>, StratlabError> {
        let mut segments: Vec<String> = self.candles.keys().cloned().collect();
        segments.sort();
        Ok(segments)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn session_open(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(9, 15, 0).unwrap()
}

pub fn candle(ts: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: ts,
        open,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

/// Flat bars at 100 with a 0.2 point range, one minute apart.
pub fn quiet_bars(from: NaiveDateTime, count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| candle(from + Duration::minutes(i as i64), 100.0, 100.2, 99.8, 100.0))
        .collect()
}

/// Full 375-minute sessions of a gently oscillating market on consecutive days.
pub fn oscillating_sessions(first_day: NaiveDate, sessions: usize) -> Vec<Candle> {
    let mut out = Vec::with_capacity(sessions * 375);
    for s in 0..sessions {
        let open = session_open(first_day + Duration::days(s as i64));
        for m in 0..375 {
            let i = (s * 375 + m) as f64;
            let close = 100.0 + (i / 15.0).sin() * 3.0 + i * 0.005;
            out.push(Candle {
                timestamp: open + Duration::minutes(m as i64),
                open: close - 0.1,
                high: close + 0.4,
                low: close - 0.4,
                close,
                volume: 1000.0 + (m % 7) as f64 * 150.0,
            });
        }
    }
    out
}

/// A catalog strategy re-timed to one-minute bars with no higher-timeframe
/// filter, driven by a test checklist.
pub fn test_strategy(checklist: Checklist) -> Strategy {
    let mut spec = catalog::rule_spec(StrategyId::EmaAdxTrend);
    spec.engine.interval_minutes = 1;
    spec.engine.higher_timeframes.clear();
    spec.engine.reward_multiple = 2.0;
    spec.engine.max_bars_held = 100;
    spec.engine.min_bars_between_trades = 0;
    spec.engine.risk_per_trade_pct = 1.0;
    spec.engine.daily_risk_cap_pct = 100.0;
    Strategy { spec, checklist }
}

pub fn long_with_stop(stop: f64) -> SignalCandidate {
    SignalCandidate {
        direction: Direction::Long,
        confidence: 60.0,
        stop,
        trailing: TrailingMode::FastEma,
        validation: None,
    }
}

pub fn prepared(strategy: &Strategy, segment: &str, bars: &[Candle]) -> PreparedSeries {
    let data = stratlab::domain::segment::SegmentData::new(segment, bars.to_vec());
    PreparedSeries::build(&strategy.spec.engine, bars, &data)
}

pub fn write_candles_csv(dir: &Path, segment: &str, candles: &[Candle]) {
    let path = dir.join(format!("{segment}_candles.csv"));
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
    for c in candles {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            c.timestamp.format("%Y-%m-%d %H:%M:%S"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        )
        .unwrap();
    }
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
