//! Property tests for indicator and scoring invariants.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use stratlab::domain::backtest::resolve_stop;
use stratlab::domain::candle::Candle;
use stratlab::domain::indicator::{calculate_ema, calculate_rsi, calculate_session_vwap, resample};
use stratlab::domain::metrics::{max_drawdown, sharpe_like};
use stratlab::domain::signal::{Direction, confidence};

fn arb_candles() -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec((1i64..4, 50.0..150.0_f64, 0.0..2.0_f64, 1.0..5000.0_f64), 1..200).prop_map(
        |rows| {
            let mut ts = NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap();
            rows.into_iter()
                .map(|(step, close, spread, volume)| {
                    ts += Duration::minutes(step);
                    Candle {
                        timestamp: ts,
                        open: close,
                        high: close + spread,
                        low: close - spread,
                        close,
                        volume,
                    }
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn ema_of_constant_is_constant(value in 1.0..1000.0_f64, len in 1usize..100, period in 1usize..50) {
        let ema = calculate_ema(&vec![value; len], period);
        prop_assert_eq!(ema.len(), len);
        for v in ema {
            prop_assert!((v - value).abs() < 1e-9 * value);
        }
    }

    #[test]
    fn rsi_stays_in_bounds(values in prop::collection::vec(1.0..500.0_f64, 0..120)) {
        let rsi = calculate_rsi(&values, 14);
        prop_assert_eq!(rsi.len(), values.len());
        prop_assert!(rsi.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn rsi_saturates_on_one_way_moves(steps in prop::collection::vec(0.01..5.0_f64, 15..80)) {
        let mut up = vec![100.0];
        let mut down = vec![1000.0];
        for s in &steps {
            up.push(up.last().unwrap() + s);
            down.push(down.last().unwrap() - s);
        }
        prop_assert!((calculate_rsi(&up, 14).last().unwrap() - 100.0).abs() < 1e-9);
        prop_assert!(calculate_rsi(&down, 14).last().unwrap().abs() < 1e-9);
    }

    #[test]
    fn resample_conserves_volume_and_range(candles in arb_candles(), interval in 1u32..30) {
        let bars = resample(&candles, interval);
        prop_assert!(!bars.is_empty());
        prop_assert!(bars.len() <= candles.len());

        let raw: f64 = candles.iter().map(|c| c.volume).sum();
        let merged: f64 = bars.iter().map(|c| c.volume).sum();
        prop_assert!((raw - merged).abs() < 1e-6 * raw);

        let max_high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let min_low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        for bar in &bars {
            prop_assert!(bar.high >= bar.low);
            prop_assert!(bar.high <= max_high && bar.low >= min_low);
        }
        prop_assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn vwap_lies_within_traded_range(candles in arb_candles()) {
        let vwap = calculate_session_vwap(&candles);
        let max_high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let min_low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        for v in vwap {
            prop_assert!(v <= max_high + 1e-9 && v >= min_low - 1e-9);
        }
    }

    #[test]
    fn confidence_is_clamped(flags in prop::collection::vec(any::<bool>(), 0..10)) {
        let c = confidence(&flags);
        prop_assert!((40.0..=95.0).contains(&c));
    }

    #[test]
    fn resolved_stop_sits_on_the_risk_side(
        entry in 10.0..50_000.0_f64,
        proposed in -1_000.0..60_000.0_f64,
        pct in 0.01..10.0_f64,
        long in any::<bool>(),
    ) {
        let direction = if long { Direction::Long } else { Direction::Short };
        let stop = resolve_stop(proposed, entry, direction, pct);
        match direction {
            Direction::Long => prop_assert!(stop < entry),
            Direction::Short => prop_assert!(stop > entry),
        }
    }

    #[test]
    fn drawdown_bounded_by_losses(returns in prop::collection::vec(-3.0..3.0_f64, 0..60)) {
        let dd = max_drawdown(&returns);
        let total_loss: f64 = returns.iter().filter(|r| **r < 0.0).map(|r| -r).sum();
        prop_assert!(dd >= 0.0);
        prop_assert!(dd <= total_loss + 1e-9);
        prop_assert!(sharpe_like(&returns).is_finite());
    }
}
