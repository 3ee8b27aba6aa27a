//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::BacktestConfig;
use crate::domain::catalog;
use crate::domain::config_validation::{
    configured_segments, number, overrides_for, parse_date_key, parse_time_key, resolve_strategy_ids, validate_config,
};
use crate::domain::error::StratlabError;
use crate::domain::evaluation::{EvaluationSettings, Ranking, evaluate_all};
use crate::domain::metrics::ScoringWeights;
use crate::domain::segment::{DateRange, SegmentData, parse_segments};
use crate::domain::series::MIN_PREPARED_BARS;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stratlab", about = "Intraday strategy evaluation and ranking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate strategies against historical data and rank them
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// Evaluate only this segment (or comma separated list)
        #[arg(long)]
        segment: Option<String>,
        /// Evaluate only this strategy id (or comma separated list)
        #[arg(long)]
        strategy: Option<String>,
        /// Write the ranking as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write every simulated trade as CSV
        #[arg(long)]
        trades: Option<PathBuf>,
    },
    /// List the built-in strategy catalog
    ListStrategies,
    /// Validate an evaluation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Evaluate {
            config,
            segment,
            strategy,
            output,
            trades,
        } => run_evaluate(
            &config,
            segment.as_deref(),
            strategy.as_deref(),
            output.as_ref(),
            trades.as_ref(),
        ),
        Command::ListStrategies => run_list_strategies(),
        Command::Validate { config } => run_validate(&config),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second call (tests driving `run` repeatedly) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .try_init();
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StratlabError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, StratlabError> {
    let defaults = BacktestConfig::default();
    Ok(BacktestConfig {
        session_close: parse_time_key(adapter, "backtest", "session_close")?
            .unwrap_or(defaults.session_close),
        entry_cutoff: parse_time_key(adapter, "backtest", "entry_cutoff")?
            .unwrap_or(defaults.entry_cutoff),
        fallback_stop_pct: number(adapter, "backtest", "fallback_stop_pct")?
            .unwrap_or(defaults.fallback_stop_pct),
        min_risk_points: number(adapter, "backtest", "min_risk_points")?
            .unwrap_or(defaults.min_risk_points),
    })
}

pub fn build_scoring_weights(adapter: &dyn ConfigPort) -> Result<ScoringWeights, StratlabError> {
    let d = ScoringWeights::default();
    let get = |key: &str, default: f64| -> Result<f64, StratlabError> {
        Ok(number(adapter, "scoring", key)?.unwrap_or(default))
    };
    Ok(ScoringWeights {
        net_r: get("net_r", d.net_r)?,
        win_rate: get("win_rate", d.win_rate)?,
        profit_factor: get("profit_factor", d.profit_factor)?,
        expectancy: get("expectancy", d.expectancy)?,
        sharpe: get("sharpe", d.sharpe)?,
        drawdown: get("drawdown", d.drawdown)?,
        profit_factor_cap: get("profit_factor_cap", d.profit_factor_cap)?,
        low_sample_penalty: get("low_sample_penalty", d.low_sample_penalty)?,
        high_sample_bonus: get("high_sample_bonus", d.high_sample_bonus)?,
    })
}

pub fn build_settings(adapter: &dyn ConfigPort) -> Result<EvaluationSettings, StratlabError> {
    let min_bars = number(adapter, "evaluation", "min_bars")?
        .map(|v| v.round() as usize)
        .unwrap_or(MIN_PREPARED_BARS)
        .max(MIN_PREPARED_BARS);
    Ok(EvaluationSettings {
        backtest: build_backtest_config(adapter)?,
        weights: build_scoring_weights(adapter)?,
        min_bars,
    })
}

/// Catalog entries selected by `strategy_override` or `[evaluation] strategies`,
/// with `[strategy.<id>]` overrides applied.
pub fn build_strategies(
    adapter: &dyn ConfigPort,
    strategy_override: Option<&str>,
) -> Result<Vec<Strategy>, StratlabError> {
    let selection = match strategy_override {
        Some(s) => Some(s.to_string()),
        None => adapter.get_string("evaluation", "strategies"),
    };

    resolve_strategy_ids(selection.as_deref())?
        .into_iter()
        .map(|id| {
            let mut strategy = catalog::lookup(id);
            for (key, value) in overrides_for(adapter, id)? {
                strategy.spec.engine.apply_override(&key, value);
            }
            Ok(strategy)
        })
        .collect()
}

/// Segments named by `--segment` or `[evaluation] segments`; when neither
/// names any, every segment the data port knows about.
pub fn resolve_segments(
    segment_override: Option<&str>,
    adapter: &dyn ConfigPort,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, StratlabError> {
    let explicit = match segment_override {
        Some(s) => Some(parse_segments(s)?),
        None => configured_segments(adapter.get_string("evaluation", "segments").as_deref())?,
    };
    if let Some(segments) = explicit {
        return Ok(segments);
    }

    let discovered = data_port.list_segments()?;
    if discovered.is_empty() {
        return Err(StratlabError::NoData {
            segment: "all".into(),
        });
    }
    info!(segments = %discovered.join(","), "Discovered segments");
    Ok(discovered)
}

pub fn build_date_range(adapter: &dyn ConfigPort) -> Result<DateRange, StratlabError> {
    Ok(DateRange::new(
        parse_date_key(adapter, "evaluation", "start_date")?,
        parse_date_key(adapter, "evaluation", "end_date")?,
    ))
}

/// Load every segment, skipping those without usable data, and rank the matrix.
pub fn run_evaluation_pipeline(
    data_port: &dyn DataPort,
    strategies: &[Strategy],
    segments: &[String],
    range: &DateRange,
    settings: &EvaluationSettings,
) -> Result<Ranking, StratlabError> {
    let mut loaded: Vec<SegmentData> = Vec::with_capacity(segments.len());
    for segment in segments {
        match data_port.load_segment(segment, range) {
            Ok(data) => {
                info!(
                    segment = %segment,
                    candles = data.candle_count(),
                    snapshots = data.sentiment.len(),
                    oi_points = data.oi_buildup.len(),
                    "Segment loaded"
                );
                loaded.push(data);
            }
            Err(e @ (StratlabError::NoData { .. } | StratlabError::Data { .. })) => {
                warn!(segment = %segment, error = %e, "Skipping segment");
            }
            Err(e) => return Err(e),
        }
    }

    if loaded.is_empty() {
        return Err(StratlabError::NoData {
            segment: segments.join(","),
        });
    }

    info!(
        strategies = strategies.len(),
        segments = loaded.len(),
        "Evaluating strategy matrix"
    );
    Ok(evaluate_all(strategies, &loaded, settings))
}

fn fail(err: StratlabError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

fn run_evaluate(
    config_path: &PathBuf,
    segment_override: Option<&str>,
    strategy_override: Option<&str>,
    output_path: Option<&PathBuf>,
    trades_path: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&adapter) {
        return fail(e);
    }

    let data_dir = adapter
        .get_string("evaluation", "data_dir")
        .unwrap_or_default();
    let data_port = CsvAdapter::new(PathBuf::from(data_dir.trim()));

    let prepared = build_settings(&adapter).and_then(|settings| {
        let strategies = build_strategies(&adapter, strategy_override)?;
        let segments = resolve_segments(segment_override, &adapter, &data_port)?;
        let range = build_date_range(&adapter)?;
        Ok((settings, strategies, segments, range))
    });
    let (settings, strategies, segments, range) = match prepared {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let ranking =
        match run_evaluation_pipeline(&data_port, &strategies, &segments, &range, &settings) {
            Ok(r) => r,
            Err(e) => return fail(e),
        };

    print_summary(&ranking);

    let reporter = CsvReportAdapter;
    if let Some(path) = output_path {
        if let Err(e) = reporter.write_ranking(&ranking, path) {
            return fail(e);
        }
        eprintln!("\nRanking written to: {}", path.display());
    }
    if let Some(path) = trades_path {
        if let Err(e) = reporter.write_trades(&ranking, path) {
            return fail(e);
        }
        eprintln!("Trades written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(ranking: &Ranking) {
    eprintln!("\n=== Strategy Ranking ===");
    eprintln!(
        "{:>4}  {:<20} {:<10} {:<3} {:>6} {:>7} {:>8} {:>6} {:>8}",
        "#", "strategy", "segment", "rtg", "trades", "win%", "net R", "PF", "score"
    );
    for (idx, eval) in ranking.evaluations.iter().enumerate() {
        let k = &eval.kpis;
        eprintln!(
            "{:>4}  {:<20} {:<10} {:<3} {:>6} {:>6.1}% {:>8.2} {:>6.2} {:>8.2}",
            idx + 1,
            eval.strategy.as_str(),
            eval.segment,
            eval.rating.to_string(),
            k.trades,
            k.win_rate,
            k.net_r,
            k.profit_factor,
            eval.score,
        );
        if let Some(warning) = &eval.warning {
            eprintln!("        warning: {warning}");
        }
    }

    eprintln!("\n=== Best Per Segment ===");
    for segment in ranking.best_by_segment.keys() {
        if let Some(best) = ranking.best_for(segment) {
            eprintln!(
                "  {}: {} ({}), score {:.2}",
                segment, best.strategy_name, best.strategy, best.score
            );
        }
    }
    eprintln!("\nTotal trades: {}", ranking.total_trades());
}

fn run_list_strategies() -> ExitCode {
    for strategy in catalog::catalog() {
        let spec = &strategy.spec;
        let engine = &spec.engine;
        let higher: Vec<String> = engine
            .higher_timeframes
            .iter()
            .map(|m| format!("{m}m"))
            .collect();
        println!("{} - {} [{}]", spec.id, spec.name, spec.rating);
        println!(
            "  interval {}m, filters {}, stop {}x ATR, target {}R, max {} bars",
            engine.interval_minutes,
            if higher.is_empty() {
                "none".to_string()
            } else {
                higher.join("/")
            },
            engine.sl_atr_mult,
            engine.reward_multiple,
            engine.max_bars_held,
        );
        println!("  long:  {}", spec.entry_long);
        println!("  short: {}", spec.entry_short);
        println!("  exit:  {}", spec.exit);
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        return fail(e);
    }

    let resolved = build_strategies(&adapter, None).and_then(|strategies| {
        let segments =
            configured_segments(adapter.get_string("evaluation", "segments").as_deref())?;
        Ok((strategies, segments))
    });
    let (strategies, segments) = match resolved {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    match segments {
        Some(list) => eprintln!("  segments:   {}", list.join(", ")),
        None => eprintln!("  segments:   all found in data_dir"),
    }
    let ids: Vec<&str> = strategies.iter().map(|s| s.id().as_str()).collect();
    eprintln!("  strategies: {}", ids.join(", "));
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
