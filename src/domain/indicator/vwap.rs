//! Session VWAP, reset whenever the calendar date changes.
//!
//! VWAP = Σ(typical × volume) / Σ volume within the session; a session
//! with no volume so far reports the bar's typical price.

use crate::domain::candle::Candle;

pub fn calculate_session_vwap(candles: &[Candle]) -> Vec<f64> {
    let mut out = Vec::with_capacity(candles.len());
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if i > 0 && candle.session() != candles[i - 1].session() {
            cum_pv = 0.0;
            cum_volume = 0.0;
        }
        let typical = candle.typical_price();
        cum_pv += typical * candle.volume;
        cum_volume += candle.volume;
        out.push(if cum_volume > 0.0 {
            cum_pv / cum_volume
        } else {
            typical
        });
    }

    out
}
