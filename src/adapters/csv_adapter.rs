//! CSV file data adapter.
//!
//! Layout under the base directory, one set per segment:
//! `<SEG>_candles.csv`, `<SEG>_sentiment.csv`, `<SEG>_oi.csv`.
//! The last two are optional.

use crate::domain::candle::Candle;
use crate::domain::error::StratlabError;
use crate::domain::market_data::{OiBuildupPoint, SentimentSnapshot, Timestamped};
use crate::domain::segment::DateRange;
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CANDLES_SUFFIX: &str = "_candles.csv";
const SENTIMENT_SUFFIX: &str = "_sentiment.csv";
const OI_SUFFIX: &str = "_oi.csv";

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct SentimentRow {
    timestamp: String,
    put_call_ratio: f64,
    buy_quantity: f64,
    sell_quantity: f64,
    traded_volume: f64,
    max_pain: f64,
    last_price: f64,
}

#[derive(Debug, Deserialize)]
struct OiRow {
    timestamp: String,
    long_oi_change: f64,
    short_oi_change: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, segment: &str, suffix: &str) -> PathBuf {
        self.base_path.join(format!("{}{}", segment, suffix))
    }
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, StratlabError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| StratlabError::data(format!("invalid timestamp '{}': {}", value, e)))
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StratlabError> {
    let content = fs::read_to_string(path).map_err(|e| {
        StratlabError::data(format!("failed to read {}: {}", path.display(), e))
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    rdr.deserialize()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| {
                StratlabError::data(format!("{} row {}: {}", path.display(), i + 1, e))
            })
        })
        .collect()
}

fn read_optional_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StratlabError> {
    if path.exists() {
        read_rows(path)
    } else {
        Ok(Vec::new())
    }
}

/// Drop points outside `range` and order the rest by timestamp.
fn in_range<T: Timestamped>(mut points: Vec<T>, range: &DateRange) -> Vec<T> {
    points.retain(|p| range.contains(p.timestamp().date()));
    points.sort_by_key(|p| p.timestamp());
    points
}

impl DataPort for CsvAdapter {
    fn fetch_candles(
        &self,
        segment: &str,
        range: &DateRange,
    ) -> Result<Vec<Candle>, StratlabError> {
        let path = self.csv_path(segment, CANDLES_SUFFIX);
        let rows: Vec<CandleRow> = read_rows(&path)?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            let candle = Candle {
                timestamp: parse_timestamp(&row.timestamp)?,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            };
            if !candle.is_consistent() {
                return Err(StratlabError::data(format!(
                    "{}: inconsistent candle at {}",
                    path.display(),
                    row.timestamp
                )));
            }
            candles.push(candle);
        }

        Ok(in_range(candles, range))
    }

    fn fetch_sentiment(
        &self,
        segment: &str,
        range: &DateRange,
    ) -> Result<Vec<SentimentSnapshot>, StratlabError> {
        let rows: Vec<SentimentRow> =
            read_optional_rows(&self.csv_path(segment, SENTIMENT_SUFFIX))?;

        let snapshots = rows
            .into_iter()
            .map(|row| {
                Ok(SentimentSnapshot {
                    timestamp: parse_timestamp(&row.timestamp)?,
                    put_call_ratio: row.put_call_ratio,
                    buy_quantity: row.buy_quantity,
                    sell_quantity: row.sell_quantity,
                    traded_volume: row.traded_volume,
                    max_pain: row.max_pain,
                    last_price: row.last_price,
                })
            })
            .collect::<Result<Vec<_>, StratlabError>>()?;

        Ok(in_range(snapshots, range))
    }

    fn fetch_oi_buildup(
        &self,
        segment: &str,
        range: &DateRange,
    ) -> Result<Vec<OiBuildupPoint>, StratlabError> {
        let rows: Vec<OiRow> = read_optional_rows(&self.csv_path(segment, OI_SUFFIX))?;

        let points = rows
            .into_iter()
            .map(|row| {
                Ok(OiBuildupPoint {
                    timestamp: parse_timestamp(&row.timestamp)?,
                    long_oi_change: row.long_oi_change,
                    short_oi_change: row.short_oi_change,
                })
            })
            .collect::<Result<Vec<_>, StratlabError>>()?;

        Ok(in_range(points, range))
    }

    fn list_segments(&self) -> Result<Vec<String>, StratlabError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            StratlabError::data(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut segments = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| StratlabError::data(format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(segment) = name_str.strip_suffix(CANDLES_SUFFIX) {
                segments.push(segment.to_string());
            }
        }

        segments.sort();
        Ok(segments)
    }
}
