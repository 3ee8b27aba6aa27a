//! Segments (tradable underlyings) and their in-memory market data.

use crate::domain::candle::Candle;
use crate::domain::market_data::{OiBuildupPoint, SentimentSnapshot};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Everything the engine needs for one segment, ascending by timestamp.
#[derive(Debug, Clone, Default)]
pub struct SegmentData {
    pub segment: String,
    pub candles: Vec<Candle>,
    pub sentiment: Vec<SentimentSnapshot>,
    pub oi_buildup: Vec<OiBuildupPoint>,
}

impl SegmentData {
    pub fn new(segment: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            segment: segment.into(),
            candles,
            sentiment: Vec::new(),
            oi_buildup: Vec::new(),
        }
    }

    pub fn with_sentiment(mut self, sentiment: Vec<SentimentSnapshot>) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn with_oi_buildup(mut self, oi_buildup: Vec<OiBuildupPoint>) -> Self {
        self.oi_buildup = oi_buildup;
        self
    }

    pub fn candle_count(&self) -> usize {
        self.candles.len()
    }
}

/// Inclusive calendar-date window; an open bound admits everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SegmentListError {
    #[error("empty token in segment list")]
    EmptyToken,

    #[error("duplicate segment: {0}")]
    DuplicateSegment(String),
}

/// Parse a comma separated segment list, upper-casing each entry.
pub fn parse_segments(input: &str) -> Result<Vec<String>, SegmentListError> {
    let mut segments = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SegmentListError::EmptyToken);
        }
        let segment = trimmed.to_uppercase();
        if !seen.insert(segment.clone()) {
            return Err(SegmentListError::DuplicateSegment(segment));
        }
        segments.push(segment);
    }

    Ok(segments)
}
