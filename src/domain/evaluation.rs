//! Strategy x segment evaluation and ranking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::backtest::{BacktestConfig, run_backtest};
use crate::domain::metrics::{ScoringWeights, StrategyKpis, composite_score};
use crate::domain::position::SimulatedTrade;
use crate::domain::segment::SegmentData;
use crate::domain::series::{MIN_PREPARED_BARS, prepare_series};
use crate::domain::strategy::{QualityRating, Strategy, StrategyId};

/// Knobs shared by every evaluation in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    pub backtest: BacktestConfig,
    pub weights: ScoringWeights,
    pub min_bars: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        EvaluationSettings {
            backtest: BacktestConfig::default(),
            weights: ScoringWeights::default(),
            min_bars: MIN_PREPARED_BARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyEvaluation {
    pub strategy: StrategyId,
    pub strategy_name: String,
    pub segment: String,
    pub rating: QualityRating,
    pub kpis: StrategyKpis,
    pub score: f64,
    pub trades: Vec<SimulatedTrade>,
    pub bars_evaluated: usize,
    pub warning: Option<String>,
}

pub fn evaluate_strategy(
    strategy: &Strategy,
    data: &SegmentData,
    settings: &EvaluationSettings,
) -> StrategyEvaluation {
    let spec = &strategy.spec;
    let (trades, bars_evaluated, warning) = match prepare_series(spec, data, settings.min_bars) {
        Some(series) => {
            let trades = run_backtest(strategy, &series, &settings.backtest);
            debug!(
                strategy = %spec.id,
                segment = %data.segment,
                bars = series.len(),
                trades = trades.len(),
                "Evaluation complete"
            );
            (trades, series.len(), None)
        }
        None => {
            let message = format!(
                "insufficient data: {} one-minute candles do not yield {} bars at {}m",
                data.candle_count(),
                settings.min_bars,
                spec.engine.interval_minutes
            );
            warn!(strategy = %spec.id, segment = %data.segment, "{}", message);
            (Vec::new(), 0, Some(message))
        }
    };

    let kpis = StrategyKpis::compute(&trades, settings.weights.profit_factor_cap);
    let score = composite_score(&kpis, spec.rating, &settings.weights);

    StrategyEvaluation {
        strategy: spec.id,
        strategy_name: spec.name.clone(),
        segment: data.segment.clone(),
        rating: spec.rating,
        kpis,
        score,
        trades,
        bars_evaluated,
        warning,
    }
}

/// Evaluations sorted best first, plus the winning index per segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub evaluations: Vec<StrategyEvaluation>,
    pub best_by_segment: BTreeMap<String, usize>,
}

impl Ranking {
    pub fn from_evaluations(mut evaluations: Vec<StrategyEvaluation>) -> Self {
        evaluations.sort_by(compare_evaluations);

        let mut best_by_segment = BTreeMap::new();
        for (idx, eval) in evaluations.iter().enumerate() {
            best_by_segment.entry(eval.segment.clone()).or_insert(idx);
        }

        Ranking {
            evaluations,
            best_by_segment,
        }
    }

    pub fn best(&self) -> Option<&StrategyEvaluation> {
        self.evaluations.first()
    }

    pub fn best_for(&self, segment: &str) -> Option<&StrategyEvaluation> {
        self.best_by_segment
            .get(segment)
            .and_then(|&idx| self.evaluations.get(idx))
    }

    pub fn total_trades(&self) -> usize {
        self.evaluations.iter().map(|e| e.kpis.trades).sum()
    }
}

/// Higher score first; ties by strategy id, then segment.
fn compare_evaluations(a: &StrategyEvaluation, b: &StrategyEvaluation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.strategy.cmp(&b.strategy))
        .then_with(|| a.segment.cmp(&b.segment))
}

/// Evaluate every strategy against every segment in parallel.
pub fn evaluate_all(
    strategies: &[Strategy],
    segments: &[SegmentData],
    settings: &EvaluationSettings,
) -> Ranking {
    let pairs: Vec<(&Strategy, &SegmentData)> = strategies
        .iter()
        .flat_map(|s| segments.iter().map(move |d| (s, d)))
        .collect();

    let evaluations = pairs
        .par_iter()
        .map(|(strategy, data)| evaluate_strategy(strategy, data, settings))
        .collect();

    Ranking::from_evaluations(evaluations)
}
