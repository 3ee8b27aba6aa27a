//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper/Lower: Middle ± multiplier × population stddev
//! - Bandwidth: (Upper - Lower) / Middle, 0 when Middle is 0
//!
//! A low bandwidth marks a volatility squeeze.

use super::sma::calculate_sma;
use super::stddev::calculate_stddev;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub bandwidth: Vec<f64>,
}

pub fn calculate_bollinger(values: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    let middle = calculate_sma(values, period);
    let stddev = calculate_stddev(values, period);

    let mut upper = Vec::with_capacity(values.len());
    let mut lower = Vec::with_capacity(values.len());
    let mut bandwidth = Vec::with_capacity(values.len());

    for (mid, sd) in middle.iter().zip(&stddev) {
        let u = mid + multiplier * sd;
        let l = mid - multiplier * sd;
        upper.push(u);
        lower.push(l);
        bandwidth.push(if *mid != 0.0 { (u - l) / mid } else { 0.0 });
    }

    BollingerSeries {
        upper,
        middle,
        lower,
        bandwidth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bollinger_constant_values_collapse() {
        let bands = calculate_bollinger(&[100.0; 30], 20, 2.0);
        assert_relative_eq!(bands.upper[25], 100.0);
        assert_relative_eq!(bands.lower[25], 100.0);
        assert_relative_eq!(bands.bandwidth[25], 0.0);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bands = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0);
        let variance: f64 = (100.0 + 0.0 + 100.0) / 3.0;
        let sd = variance.sqrt();
        assert_relative_eq!(bands.middle[2], 20.0);
        assert_relative_eq!(bands.upper[2], 20.0 + 2.0 * sd, epsilon = 1e-10);
        assert_relative_eq!(bands.lower[2], 20.0 - 2.0 * sd, epsilon = 1e-10);
        assert_relative_eq!(bands.bandwidth[2], 4.0 * sd / 20.0, epsilon = 1e-10);
    }

    #[test]
    fn bollinger_zero_middle_bandwidth_sentinel() {
        let bands = calculate_bollinger(&[1.0, -1.0], 2, 2.0);
        assert_relative_eq!(bands.bandwidth[1], 0.0);
    }

    #[test]
    fn bollinger_symmetry() {
        let bands = calculate_bollinger(&[10.0, 12.0, 9.0, 14.0, 11.0], 3, 1.5);
        for i in 0..5 {
            assert_relative_eq!(
                bands.upper[i] - bands.middle[i],
                bands.middle[i] - bands.lower[i],
                epsilon = 1e-10
            );
        }
    }
}
