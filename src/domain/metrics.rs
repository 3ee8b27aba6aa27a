//! Trade statistics and the composite ranking score.
//!
//! All figures are in R (multiples of the per-trade risk) except `net_points`.
//! Outcomes follow the scratch band in [`crate::domain::position`].

use crate::domain::position::{SimulatedTrade, TradeOutcome};
use crate::domain::strategy::QualityRating;

/// Profit factor reported when there are winners but no losers.
pub const DEFAULT_PROFIT_FACTOR_CAP: f64 = 9.99;

/// Below this many trades the score is penalised.
pub const LOW_SAMPLE_TRADES: usize = 3;
/// Above this many trades the score earns a bonus.
pub const HIGH_SAMPLE_TRADES: usize = 25;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyKpis {
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub scratches: usize,
    pub win_rate: f64,
    pub net_points: f64,
    pub net_r: f64,
    pub avg_r: f64,
    pub expectancy: f64,
    pub profit_factor: f64,
    pub max_drawdown_r: f64,
    pub sharpe: f64,
}

impl StrategyKpis {
    pub fn compute(trades: &[SimulatedTrade], profit_factor_cap: f64) -> Self {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut scratches = 0usize;
        let mut gross_win_r = 0.0_f64;
        let mut gross_loss_r = 0.0_f64;
        let mut net_points = 0.0_f64;

        for trade in trades {
            net_points += trade.pnl_points;
            match trade.outcome {
                TradeOutcome::Win => {
                    wins += 1;
                    gross_win_r += trade.r_multiple;
                }
                TradeOutcome::Loss => {
                    losses += 1;
                    gross_loss_r += trade.r_multiple.abs();
                }
                TradeOutcome::Scratch => scratches += 1,
            }
        }

        let returns: Vec<f64> = trades.iter().map(|t| t.r_multiple).collect();
        let count = trades.len();
        let net_r: f64 = returns.iter().sum();

        let (win_rate, avg_r) = if count > 0 {
            let n = count as f64;
            (wins as f64 / n * 100.0, net_r / n)
        } else {
            (0.0, 0.0)
        };

        let profit_factor = if gross_loss_r > 0.0 {
            gross_win_r / gross_loss_r
        } else if gross_win_r > 0.0 {
            profit_factor_cap
        } else {
            0.0
        };

        StrategyKpis {
            trades: count,
            wins,
            losses,
            scratches,
            win_rate,
            net_points,
            net_r,
            avg_r,
            // Scratches count toward expectancy.
            expectancy: avg_r,
            profit_factor,
            max_drawdown_r: max_drawdown(&returns),
            sharpe: sharpe_like(&returns),
        }
    }
}

/// Largest peak-to-trough drop of the cumulative curve, starting from 0.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;

    for r in returns {
        equity += r;
        peak = peak.max(equity);
        worst = worst.max(peak - equity);
    }

    worst
}

/// mean / sample stdev * sqrt(n). One trade returns its own R.
pub fn sharpe_like(returns: &[f64]) -> f64 {
    match returns.len() {
        0 => 0.0,
        1 => returns[0],
        n => {
            let n_f = n as f64;
            let mean = returns.iter().sum::<f64>() / n_f;
            let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n_f - 1.0);
            let stdev = variance.sqrt();
            if stdev > 0.0 {
                mean / stdev * n_f.sqrt()
            } else {
                0.0
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    pub net_r: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
    pub sharpe: f64,
    pub drawdown: f64,
    pub profit_factor_cap: f64,
    pub low_sample_penalty: f64,
    pub high_sample_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            net_r: 1.0,
            win_rate: 0.2,
            profit_factor: 5.0,
            expectancy: 10.0,
            sharpe: 2.0,
            drawdown: 1.5,
            profit_factor_cap: DEFAULT_PROFIT_FACTOR_CAP,
            low_sample_penalty: 15.0,
            high_sample_bonus: 5.0,
        }
    }
}

pub fn composite_score(kpis: &StrategyKpis, rating: QualityRating, weights: &ScoringWeights) -> f64 {
    let mut score = weights.net_r * kpis.net_r
        + weights.win_rate * kpis.win_rate
        + weights.profit_factor * kpis.profit_factor
        + weights.expectancy * kpis.expectancy
        + weights.sharpe * kpis.sharpe
        - weights.drawdown * kpis.max_drawdown_r
        + rating.score_bonus();

    if kpis.trades < LOW_SAMPLE_TRADES {
        score -= weights.low_sample_penalty;
    } else if kpis.trades > HIGH_SAMPLE_TRADES {
        score += weights.high_sample_bonus;
    }

    score
}
