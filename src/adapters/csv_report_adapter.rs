//! CSV report adapter: ranking table and trade ledger.

use std::path::Path;

use serde::Serialize;

use crate::adapters::csv_adapter::TIMESTAMP_FORMAT;
use crate::domain::error::StratlabError;
use crate::domain::evaluation::{Ranking, StrategyEvaluation};
use crate::domain::position::SimulatedTrade;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    rank: usize,
    strategy: &'a str,
    name: &'a str,
    segment: &'a str,
    rating: String,
    score: f64,
    trades: usize,
    wins: usize,
    losses: usize,
    scratches: usize,
    win_rate: f64,
    net_points: f64,
    net_r: f64,
    avg_r: f64,
    expectancy: f64,
    profit_factor: f64,
    max_drawdown_r: f64,
    sharpe: f64,
    bars_evaluated: usize,
    best_for_segment: bool,
    warning: &'a str,
}

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    strategy: &'a str,
    segment: &'a str,
    direction: String,
    entry_time: String,
    exit_time: String,
    entry_price: f64,
    exit_price: f64,
    stop: f64,
    target: f64,
    risk: f64,
    bars_held: usize,
    pnl_points: f64,
    r_multiple: f64,
    outcome: String,
    exit_reason: String,
    confidence: f64,
}

impl<'a> RankingRow<'a> {
    fn new(rank: usize, eval: &'a StrategyEvaluation, best: bool) -> Self {
        let k = &eval.kpis;
        RankingRow {
            rank,
            strategy: eval.strategy.as_str(),
            name: &eval.strategy_name,
            segment: &eval.segment,
            rating: eval.rating.to_string(),
            score: eval.score,
            trades: k.trades,
            wins: k.wins,
            losses: k.losses,
            scratches: k.scratches,
            win_rate: k.win_rate,
            net_points: k.net_points,
            net_r: k.net_r,
            avg_r: k.avg_r,
            expectancy: k.expectancy,
            profit_factor: k.profit_factor,
            max_drawdown_r: k.max_drawdown_r,
            sharpe: k.sharpe,
            bars_evaluated: eval.bars_evaluated,
            best_for_segment: best,
            warning: eval.warning.as_deref().unwrap_or(""),
        }
    }
}

impl<'a> From<&'a SimulatedTrade> for TradeRow<'a> {
    fn from(t: &'a SimulatedTrade) -> Self {
        TradeRow {
            strategy: t.strategy.as_str(),
            segment: &t.segment,
            direction: t.direction.to_string(),
            entry_time: t.entry_time.format(TIMESTAMP_FORMAT).to_string(),
            exit_time: t.exit_time.format(TIMESTAMP_FORMAT).to_string(),
            entry_price: t.entry_price,
            exit_price: t.exit_price,
            stop: t.stop,
            target: t.target,
            risk: t.risk,
            bars_held: t.bars_held,
            pnl_points: t.pnl_points,
            r_multiple: t.r_multiple,
            outcome: t.outcome.to_string(),
            exit_reason: t.exit_reason.to_string(),
            confidence: t.confidence,
        }
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> StratlabError {
    StratlabError::Io(std::io::Error::other(format!(
        "failed to write {}: {}",
        path.display(),
        e
    )))
}

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write_ranking(&self, ranking: &Ranking, path: &Path) -> Result<(), StratlabError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| write_error(path, e))?;
        for (idx, eval) in ranking.evaluations.iter().enumerate() {
            let best = ranking.best_by_segment.get(&eval.segment) == Some(&idx);
            wtr.serialize(RankingRow::new(idx + 1, eval, best))
                .map_err(|e| write_error(path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades(&self, ranking: &Ranking, path: &Path) -> Result<(), StratlabError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| write_error(path, e))?;
        for trade in ranking.evaluations.iter().flat_map(|e| &e.trades) {
            wtr.serialize(TradeRow::from(trade))
                .map_err(|e| write_error(path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
