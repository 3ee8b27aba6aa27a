//! Rolling population standard deviation.
//!
//! Uses the same shrinking window as SMA; a single-point window yields 0.

use super::window_start;

pub fn calculate_stddev(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        let window = &values[window_start(i, period)..=i];
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let variance = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        out.push(variance.max(0.0).sqrt());
    }

    out
}
