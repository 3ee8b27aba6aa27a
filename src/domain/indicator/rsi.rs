//! RSI (Relative Strength Index) with Wilder smoothing.
//!
//! - First average: simple mean of the first n gains/losses
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss); avg_loss == 0 gives 100.
//! The first n bars repeat the first computed value. With fewer than n+1
//! prices every bar is the neutral 50.

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    if values.len() <= period {
        return vec![NEUTRAL_RSI; values.len()];
    }

    let mut out = vec![0.0; values.len()];
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    let seed = rsi_from_averages(avg_gain, avg_loss);
    for slot in out.iter_mut().take(period + 1) {
        *slot = seed;
    }

    for i in (period + 1)..values.len() {
        let change = values[i] - values[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        out[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
