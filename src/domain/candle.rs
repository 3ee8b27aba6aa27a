//! Candle representation.

use chrono::{NaiveDate, NaiveDateTime};

/// One OHLCV bar. Timestamps are exchange-local wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Trading date the bar belongs to.
    pub fn session(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// True when every field is finite, the OHLC relationship holds and
    /// volume is non-negative.
    pub fn is_consistent(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
            && self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
            && self.volume >= 0.0
    }
}
