//! ADX (Average Directional Index).
//!
//! +DM/-DM are smoothed with an EMA and divided by ATR to get +DI/-DI.
//! DX = 100 * |+DI - -DI| / (+DI + -DI), ADX = EMA(DX).
//! A zero ATR gives DI of 0 and a zero DI sum gives DX of 0.

use super::atr::calculate_atr;
use super::ema::calculate_ema;
use crate::domain::candle::Candle;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

pub fn calculate_adx(candles: &[Candle], period: usize) -> AdxSeries {
    let n = candles.len();
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];

    for i in 1..n {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let atr = calculate_atr(candles, period);
    let smooth_plus = calculate_ema(&plus_dm, period);
    let smooth_minus = calculate_ema(&minus_dm, period);

    let mut plus_di = Vec::with_capacity(n);
    let mut minus_di = Vec::with_capacity(n);
    let mut dx = Vec::with_capacity(n);

    for i in 0..n {
        let (p, m) = if atr[i] > 0.0 {
            (100.0 * smooth_plus[i] / atr[i], 100.0 * smooth_minus[i] / atr[i])
        } else {
            (0.0, 0.0)
        };
        let sum = p + m;
        dx.push(if sum > 0.0 { 100.0 * (p - m).abs() / sum } else { 0.0 });
        plus_di.push(p);
        minus_di.push(m);
    }

    AdxSeries {
        adx: calculate_ema(&dx, period),
        plus_di,
        minus_di,
    }
}
