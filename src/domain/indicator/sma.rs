//! Simple Moving Average over a window that shrinks at the series start.

use super::window_start;

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for i in 0..values.len() {
        sum += values[i];
        let start = window_start(i, period);
        if start > 0 {
            sum -= values[start - 1];
        }
        out.push(sum / (i + 1 - start) as f64);
    }

    out
}
