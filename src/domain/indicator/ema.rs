//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first value, then EMA[i] = X[i]*k + EMA[i-1]*(1-k).

pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return out;
    };

    let k = 2.0 / (period.max(1) as f64 + 1.0);
    let mut ema = first;
    out.push(ema);

    for &value in &values[1..] {
        ema = value * k + ema * (1.0 - k);
        out.push(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ema_seed_is_first_value() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 3);
        assert_relative_eq!(series[0], 10.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0], 3);
        let k = 0.5;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);
        assert_relative_eq!(series[1], e1);
        assert_relative_eq!(series[2], e2);
        assert_relative_eq!(series[3], e3);
    }

    #[test]
    fn ema_period_1_tracks_input() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(series, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ema_constant_series() {
        let series = calculate_ema(&[100.0; 50], 21);
        assert!(series.iter().all(|v| (v - 100.0).abs() < 1e-12));
    }

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 9).is_empty());
    }

    #[test]
    fn ema_same_length_as_input() {
        assert_eq!(calculate_ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 9).len(), 5);
    }
}
