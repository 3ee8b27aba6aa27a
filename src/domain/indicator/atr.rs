//! True Range and Average True Range.
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-prevC|, |L-prevC|).
//! ATR is the EMA of true range.

use super::ema::calculate_ema;
use crate::domain::candle::Candle;

pub fn calculate_true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            if i == 0 {
                candle.high - candle.low
            } else {
                candle.true_range(candles[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(candles: &[Candle], period: usize) -> Vec<f64> {
    calculate_ema(&calculate_true_range(candles), period)
}
