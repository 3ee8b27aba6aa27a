//! OBV (On-Balance Volume).

use crate::domain::candle::Candle;

/// OBV[0] = 0; each later bar adds its volume on an up close, subtracts it
/// on a down close and carries the previous value on an unchanged close.
pub fn calculate_obv(candles: &[Candle]) -> Vec<f64> {
    let mut out = Vec::with_capacity(candles.len());
    let mut obv = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if i > 0 {
            let prev_close = candles[i - 1].close;
            if candle.close > prev_close {
                obv += candle.volume;
            } else if candle.close < prev_close {
                obv -= candle.volume;
            }
        }
        out.push(obv);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::flat_candles;

    #[test]
    fn obv_signed_accumulation() {
        let mut candles = flat_candles(&[10.0, 11.0, 10.5, 10.5, 12.0]);
        for (i, c) in candles.iter_mut().enumerate() {
            c.volume = 100.0 * (i + 1) as f64;
        }
        let obv = calculate_obv(&candles);
        assert_eq!(obv, vec![0.0, 200.0, -100.0, -100.0, 400.0]);
    }

    #[test]
    fn obv_empty() {
        assert!(calculate_obv(&[]).is_empty());
    }
}
