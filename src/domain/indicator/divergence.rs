//! Pivot detection and price/oscillator divergence.
//!
//! A pivot low at `j` is strictly lower than the `span` bars before it and no
//! higher than the `span` bars after it; a pivot needs `span` bars on its
//! right before it is confirmed, so detection at bar `i` only considers
//! pivots at or before `i - span`.

/// Confirmed pivot lows in `[i - lookback, i - span]`, oldest first.
pub fn pivot_lows(lows: &[f64], i: usize, lookback: usize, span: usize) -> Vec<usize> {
    pivots(lows, i, lookback, span, |center, other| center < other, |center, other| center <= other)
}

/// Confirmed pivot highs in `[i - lookback, i - span]`, oldest first.
pub fn pivot_highs(highs: &[f64], i: usize, lookback: usize, span: usize) -> Vec<usize> {
    pivots(highs, i, lookback, span, |center, other| center > other, |center, other| center >= other)
}

fn pivots(
    values: &[f64],
    i: usize,
    lookback: usize,
    span: usize,
    beats_left: impl Fn(f64, f64) -> bool,
    beats_right: impl Fn(f64, f64) -> bool,
) -> Vec<usize> {
    let span = span.max(1);
    if i >= values.len() || i < 2 * span {
        return Vec::new();
    }

    let first = i.saturating_sub(lookback).max(span);
    let last = i - span;

    (first..=last)
        .filter(|&j| {
            (1..=span).all(|k| beats_left(values[j], values[j - k]))
                && (1..=span).all(|k| beats_right(values[j], values[j + k]))
        })
        .collect()
}

/// Price prints a lower low while the oscillator prints a higher low.
pub fn bullish_divergence(
    lows: &[f64],
    oscillator: &[f64],
    i: usize,
    lookback: usize,
    span: usize,
) -> bool {
    assert_eq!(lows.len(), oscillator.len(), "price and oscillator lengths differ");
    match last_two(&pivot_lows(lows, i, lookback, span)) {
        Some((older, newer)) => lows[newer] < lows[older] && oscillator[newer] > oscillator[older],
        None => false,
    }
}

/// Price prints a higher high while the oscillator prints a lower high.
pub fn bearish_divergence(
    highs: &[f64],
    oscillator: &[f64],
    i: usize,
    lookback: usize,
    span: usize,
) -> bool {
    assert_eq!(highs.len(), oscillator.len(), "price and oscillator lengths differ");
    match last_two(&pivot_highs(highs, i, lookback, span)) {
        Some((older, newer)) => {
            highs[newer] > highs[older] && oscillator[newer] < oscillator[older]
        }
        None => false,
    }
}

fn last_two(pivots: &[usize]) -> Option<(usize, usize)> {
    match pivots {
        [.., older, newer] => Some((*older, *newer)),
        _ => None,
    }
}
