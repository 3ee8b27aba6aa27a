//! Shared helpers for checklist evaluation over indicator series.

use crate::domain::indicator::window_start;

/// `a` crossed above `b` between bars `i - 1` and `i`.
pub fn crossed_above(a: &[f64], b: &[f64], i: usize) -> bool {
    i > 0 && i < a.len() && i < b.len() && a[i - 1] <= b[i - 1] && a[i] > b[i]
}

/// `a` crossed below `b` between bars `i - 1` and `i`.
pub fn crossed_below(a: &[f64], b: &[f64], i: usize) -> bool {
    i > 0 && i < a.len() && i < b.len() && a[i - 1] >= b[i - 1] && a[i] < b[i]
}

/// Highest value of the `period` bars ending at `i`.
pub fn highest_at(values: &[f64], i: usize, period: usize) -> f64 {
    values[window_start(i, period)..=i]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Lowest value of the `period` bars ending at `i`.
pub fn lowest_at(values: &[f64], i: usize, period: usize) -> f64 {
    values[window_start(i, period)..=i]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min)
}

/// Strictly greater than the previous bar.
pub fn is_rising(values: &[f64], i: usize) -> bool {
    i > 0 && i < values.len() && values[i] > values[i - 1]
}

/// Strictly lower than the previous bar.
pub fn is_falling(values: &[f64], i: usize) -> bool {
    i > 0 && i < values.len() && values[i] < values[i - 1]
}
