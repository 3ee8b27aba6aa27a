//! Supertrend stop-and-reverse line.
//!
//! Basic bands are hl2 ± multiplier × ATR. The final upper band only moves
//! down while price stays below it and the final lower band only moves up
//! while price stays above it. The trend flips when the close crosses the
//! opposite final band; the line is the lower band in an uptrend and the
//! upper band in a downtrend.

use super::atr::calculate_atr;
use crate::domain::candle::Candle;

pub const DEFAULT_PERIOD: usize = 10;
pub const DEFAULT_MULTIPLIER: f64 = 3.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupertrendSeries {
    pub line: Vec<f64>,
    /// +1 for an uptrend, -1 for a downtrend.
    pub trend: Vec<i8>,
}

impl SupertrendSeries {
    /// True when the trend at `i` differs from the trend at `i - 1`.
    pub fn flipped_at(&self, i: usize) -> bool {
        i > 0 && i < self.trend.len() && self.trend[i] != self.trend[i - 1]
    }
}

pub fn calculate_supertrend(candles: &[Candle], period: usize, multiplier: f64) -> SupertrendSeries {
    let n = candles.len();
    let atr = calculate_atr(candles, period);
    let mut line = Vec::with_capacity(n);
    let mut trend = Vec::with_capacity(n);

    let mut final_upper = 0.0;
    let mut final_lower = 0.0;
    let mut current: i8 = 1;

    for i in 0..n {
        let hl2 = (candles[i].high + candles[i].low) / 2.0;
        let basic_upper = hl2 + multiplier * atr[i];
        let basic_lower = hl2 - multiplier * atr[i];

        if i == 0 {
            final_upper = basic_upper;
            final_lower = basic_lower;
        } else {
            let prev_close = candles[i - 1].close;
            if basic_upper < final_upper || prev_close > final_upper {
                final_upper = basic_upper;
            }
            if basic_lower > final_lower || prev_close < final_lower {
                final_lower = basic_lower;
            }

            let close = candles[i].close;
            if current == 1 && close < final_lower {
                current = -1;
            } else if current == -1 && close > final_upper {
                current = 1;
            }
        }

        trend.push(current);
        line.push(if current == 1 { final_lower } else { final_upper });
    }

    SupertrendSeries { line, trend }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::ranged_candles;

    #[test]
    fn supertrend_uptrend_line_below_price() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let st = calculate_supertrend(&ranged_candles(&closes, 0.5), 10, 3.0);
        assert_eq!(st.trend[49], 1);
        assert!(st.line[49] < closes[49]);
    }

    #[test]
    fn supertrend_flips_on_reversal() {
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        closes.extend((0..40).map(|i| 139.0 - 3.0 * i as f64));
        let st = calculate_supertrend(&ranged_candles(&closes, 0.5), 10, 3.0);
        assert_eq!(st.trend[79], -1);
        assert!(st.line[79] > closes[79]);
        assert!((1..80).any(|i| st.flipped_at(i)));
    }

    #[test]
    fn supertrend_lower_band_never_loosens_in_uptrend() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let st = calculate_supertrend(&ranged_candles(&closes, 0.5), 10, 3.0);
        for i in 1..60 {
            if st.trend[i] == 1 && st.trend[i - 1] == 1 {
                assert!(st.line[i] >= st.line[i - 1] - 1e-9);
            }
        }
    }
}
