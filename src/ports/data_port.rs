//! Market data access port trait.

use crate::domain::candle::Candle;
use crate::domain::error::StratlabError;
use crate::domain::market_data::{OiBuildupPoint, SentimentSnapshot};
use crate::domain::segment::{DateRange, SegmentData};

/// Read side of the data store. Every fetch returns points ascending by
/// timestamp, restricted to `range`.
pub trait DataPort {
    fn fetch_candles(&self, segment: &str, range: &DateRange)
        -> Result<Vec<Candle>, StratlabError>;

    /// Segments without sentiment history yield an empty list.
    fn fetch_sentiment(
        &self,
        segment: &str,
        range: &DateRange,
    ) -> Result<Vec<SentimentSnapshot>, StratlabError>;

    /// Segments without OI history yield an empty list.
    fn fetch_oi_buildup(
        &self,
        segment: &str,
        range: &DateRange,
    ) -> Result<Vec<OiBuildupPoint>, StratlabError>;

    fn list_segments(&self) -> Result<Vec<String>, StratlabError>;

    /// All three series for one segment; no candles is a [`StratlabError::NoData`].
    fn load_segment(&self, segment: &str, range: &DateRange) -> Result<SegmentData, StratlabError> {
        let candles = self.fetch_candles(segment, range)?;
        if candles.is_empty() {
            return Err(StratlabError::NoData {
                segment: segment.to_string(),
            });
        }
        Ok(SegmentData::new(segment, candles)
            .with_sentiment(self.fetch_sentiment(segment, range)?)
            .with_oi_buildup(self.fetch_oi_buildup(segment, range)?))
    }
}
