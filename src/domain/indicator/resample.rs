//! Candle resampling into fixed-size time buckets.
//!
//! Buckets are `interval` minutes wide and anchored at midnight of each
//! trading date, so a bucket never spans two sessions. Input must be
//! ascending by timestamp.

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::domain::candle::Candle;

/// Start of the bucket containing `timestamp`.
pub fn bucket_start(timestamp: NaiveDateTime, interval_minutes: u32) -> NaiveDateTime {
    let interval = interval_minutes.max(1);
    let minute_of_day = timestamp.hour() * 60 + timestamp.minute();
    let bucket_minute = minute_of_day / interval * interval;
    timestamp.date().and_time(chrono::NaiveTime::MIN) + Duration::minutes(bucket_minute as i64)
}

pub fn resample(candles: &[Candle], interval_minutes: u32) -> Vec<Candle> {
    let mut out: Vec<Candle> = Vec::new();

    for candle in candles {
        let start = bucket_start(candle.timestamp, interval_minutes);
        match out.last_mut() {
            Some(bucket) if bucket.timestamp == start => {
                bucket.high = bucket.high.max(candle.high);
                bucket.low = bucket.low.min(candle.low);
                bucket.close = candle.close;
                bucket.volume += candle.volume;
            }
            _ => out.push(Candle {
                timestamp: start,
                ..candle.clone()
            }),
        }
    }

    out
}
