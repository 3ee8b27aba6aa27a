//! Point-in-time market events consumed alongside candles.

use chrono::NaiveDateTime;

/// Anything carrying an exchange-local timestamp, used by last-known-value alignment.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

/// Option-chain sentiment snapshot for a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSnapshot {
    pub timestamp: NaiveDateTime,
    pub put_call_ratio: f64,
    pub buy_quantity: f64,
    pub sell_quantity: f64,
    pub traded_volume: f64,
    pub max_pain: f64,
    pub last_price: f64,
}

impl SentimentSnapshot {
    /// Share of resting buy quantity in the order book, 0.5 when both sides are empty.
    pub fn buy_pressure(&self) -> f64 {
        let total = self.buy_quantity + self.sell_quantity;
        if total > 0.0 {
            self.buy_quantity / total
        } else {
            0.5
        }
    }
}

/// Aggregated open-interest buildup at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct OiBuildupPoint {
    pub timestamp: NaiveDateTime,
    pub long_oi_change: f64,
    pub short_oi_change: f64,
}

impl OiBuildupPoint {
    /// Positive when long buildup outweighs short buildup.
    pub fn net_change(&self) -> f64 {
        self.long_oi_change - self.short_oi_change
    }
}

impl Timestamped for SentimentSnapshot {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl Timestamped for OiBuildupPoint {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl Timestamped for crate::domain::candle::Candle {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn buy_pressure_ratio() {
        let snap = SentimentSnapshot {
            timestamp: ts(),
            put_call_ratio: 1.1,
            buy_quantity: 300.0,
            sell_quantity: 100.0,
            traded_volume: 1_000.0,
            max_pain: 22_000.0,
            last_price: 22_050.0,
        };
        assert!((snap.buy_pressure() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn buy_pressure_empty_book_is_neutral() {
        let snap = SentimentSnapshot {
            timestamp: ts(),
            put_call_ratio: 1.0,
            buy_quantity: 0.0,
            sell_quantity: 0.0,
            traded_volume: 0.0,
            max_pain: 0.0,
            last_price: 0.0,
        };
        assert!((snap.buy_pressure() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn oi_net_change() {
        let point = OiBuildupPoint {
            timestamp: ts(),
            long_oi_change: 1_200.0,
            short_oi_change: 800.0,
        };
        assert!((point.net_change() - 400.0).abs() < f64::EPSILON);
    }
}
