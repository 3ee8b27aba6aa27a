//! Technical indicator implementations.
//!
//! Every function here is pure and returns a series with exactly one value per
//! input bar. Warm-up bars carry seeded values instead of gaps, and degenerate
//! denominators resolve to fixed sentinels so downstream comparisons never see
//! NaN or infinity.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod divergence;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod resample;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod supertrend;
pub mod vwap;

pub use adx::{calculate_adx, AdxSeries};
pub use atr::{calculate_atr, calculate_true_range};
pub use bollinger::{calculate_bollinger, BollingerSeries};
pub use divergence::{bearish_divergence, bullish_divergence, pivot_highs, pivot_lows};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use obv::calculate_obv;
pub use resample::resample;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;
pub use supertrend::{calculate_supertrend, SupertrendSeries};
pub use vwap::calculate_session_vwap;

use crate::domain::candle::Candle;

/// Closing prices of a candle slice.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Volumes of a candle slice.
pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

/// Start index of a window of `period` bars ending at `i`, shrunk at the series start.
pub(crate) fn window_start(i: usize, period: usize) -> usize {
    (i + 1).saturating_sub(period.max(1))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::candle::Candle;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    pub fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
    }

    /// One-minute candles with flat OHLC at each close.
    pub fn flat_candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: base_time() + Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    /// One-minute candles with a symmetric range around each close.
    pub fn ranged_candles(closes: &[f64], half_range: f64) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: base_time() + Duration::minutes(i as i64),
                open: close,
                high: close + half_range,
                low: close - half_range,
                close,
                volume: 1000.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_start_shrinks_at_series_start() {
        assert_eq!(window_start(0, 20), 0);
        assert_eq!(window_start(5, 20), 0);
        assert_eq!(window_start(19, 20), 0);
        assert_eq!(window_start(20, 20), 1);
    }

    #[test]
    fn window_start_period_zero_is_single_bar() {
        assert_eq!(window_start(7, 0), 7);
    }

    #[test]
    fn closes_and_volumes_extract_fields() {
        let candles = test_support::flat_candles(&[1.0, 2.0, 3.0]);
        assert_eq!(closes(&candles), vec![1.0, 2.0, 3.0]);
        assert_eq!(volumes(&candles), vec![1000.0, 1000.0, 1000.0]);
    }
}
