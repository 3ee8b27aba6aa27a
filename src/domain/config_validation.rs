//! Configuration validation.
//!
//! Every section is checked before any evaluation runs so a bad value fails
//! fast with the section and key that caused it.

use chrono::{NaiveDate, NaiveTime};

use crate::domain::catalog;
use crate::domain::error::StratlabError;
use crate::domain::segment::parse_segments;
use crate::domain::series::MIN_PREPARED_BARS;
use crate::domain::strategy::{EngineConfig, StrategyId};
use crate::ports::config_port::ConfigPort;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const STRATEGY_SECTION_PREFIX: &str = "strategy.";

const SCORING_WEIGHT_KEYS: [&str; 6] = [
    "net_r",
    "win_rate",
    "profit_factor",
    "expectancy",
    "sharpe",
    "drawdown",
];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StratlabError> {
    validate_evaluation_config(config)?;
    validate_backtest_section(config)?;
    validate_scoring_section(config)?;
    validate_strategy_overrides(config)?;
    Ok(())
}

pub fn validate_evaluation_config(config: &dyn ConfigPort) -> Result<(), StratlabError> {
    match config.get_string("evaluation", "data_dir") {
        Some(s) if !s.trim().is_empty() => {}
        _ => return Err(missing("evaluation", "data_dir")),
    }

    configured_segments(config.get_string("evaluation", "segments").as_deref())?;

    resolve_strategy_ids(config.get_string("evaluation", "strategies").as_deref())?;

    let start = parse_date_key(config, "evaluation", "start_date")?;
    let end = parse_date_key(config, "evaluation", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "evaluation",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }

    if let Some(min_bars) = number(config, "evaluation", "min_bars")? {
        if min_bars < MIN_PREPARED_BARS as f64 {
            return Err(invalid(
                "evaluation",
                "min_bars",
                &format!("min_bars must be at least {MIN_PREPARED_BARS}"),
            ));
        }
    }
    Ok(())
}

pub fn validate_backtest_section(config: &dyn ConfigPort) -> Result<(), StratlabError> {
    let session_close = parse_time_key(config, "backtest", "session_close")?;
    let entry_cutoff = parse_time_key(config, "backtest", "entry_cutoff")?;
    if let (Some(close), Some(cutoff)) = (session_close, entry_cutoff) {
        if cutoff > close {
            return Err(invalid(
                "backtest",
                "entry_cutoff",
                "entry_cutoff must not be after session_close",
            ));
        }
    }

    if let Some(pct) = number(config, "backtest", "fallback_stop_pct")? {
        if pct <= 0.0 || pct > 10.0 {
            return Err(invalid(
                "backtest",
                "fallback_stop_pct",
                "fallback_stop_pct must be in (0, 10]",
            ));
        }
    }
    if let Some(points) = number(config, "backtest", "min_risk_points")? {
        if points < 0.0 {
            return Err(invalid(
                "backtest",
                "min_risk_points",
                "min_risk_points must be non-negative",
            ));
        }
    }
    Ok(())
}

pub fn validate_scoring_section(config: &dyn ConfigPort) -> Result<(), StratlabError> {
    for key in SCORING_WEIGHT_KEYS
        .iter()
        .chain(["low_sample_penalty", "high_sample_bonus"].iter())
    {
        if let Some(value) = number(config, "scoring", key)? {
            if value < 0.0 {
                return Err(invalid("scoring", key, &format!("{key} must be non-negative")));
            }
        }
    }
    if let Some(cap) = number(config, "scoring", "profit_factor_cap")? {
        if cap <= 0.0 {
            return Err(invalid(
                "scoring",
                "profit_factor_cap",
                "profit_factor_cap must be positive",
            ));
        }
    }
    Ok(())
}

/// Every `[strategy.<id>]` section must name a catalog strategy and carry
/// numeric values that leave its engine config usable.
pub fn validate_strategy_overrides(config: &dyn ConfigPort) -> Result<(), StratlabError> {
    for section in config.sections() {
        let Some(raw_id) = section.strip_prefix(STRATEGY_SECTION_PREFIX) else {
            continue;
        };
        let id: StrategyId = raw_id
            .parse()
            .map_err(|_| StratlabError::UnknownStrategy(raw_id.to_string()))?;

        let mut engine = catalog::rule_spec(id).engine;
        for (key, value) in overrides_for(config, id)? {
            engine.apply_override(&key, value);
        }
        validate_engine(&section, &engine)?;
    }
    Ok(())
}

fn validate_engine(section: &str, engine: &EngineConfig) -> Result<(), StratlabError> {
    if engine.sl_atr_mult <= 0.0 {
        return Err(invalid(section, "sl_atr_mult", "sl_atr_mult must be positive"));
    }
    if engine.reward_multiple <= 0.0 {
        return Err(invalid(section, "reward_multiple", "reward_multiple must be positive"));
    }
    if engine.max_bars_held < 1 {
        return Err(invalid(section, "max_bars_held", "max_bars_held must be at least 1"));
    }
    if engine.atr_period < 1 {
        return Err(invalid(section, "atr_period", "atr_period must be at least 1"));
    }
    if engine.risk_per_trade_pct <= 0.0 {
        return Err(invalid(
            section,
            "risk_per_trade_pct",
            "risk_per_trade_pct must be positive",
        ));
    }
    if engine.daily_risk_cap_pct < engine.risk_per_trade_pct {
        return Err(invalid(
            section,
            "daily_risk_cap_pct",
            "daily_risk_cap_pct must be at least risk_per_trade_pct",
        ));
    }
    Ok(())
}

/// Numeric overrides from `[strategy.<id>]`, in key order.
pub fn overrides_for(
    config: &dyn ConfigPort,
    id: StrategyId,
) -> Result<Vec<(String, f64)>, StratlabError> {
    let section = format!("{STRATEGY_SECTION_PREFIX}{id}");
    config
        .keys(&section)
        .into_iter()
        .filter_map(|key| match number(config, &section, &key) {
            Ok(Some(value)) => Some(Ok((key, value))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        })
        .collect()
}

/// `None`, blank or `all` means "discover from the data store"; otherwise
/// the parsed comma separated list.
pub fn configured_segments(value: Option<&str>) -> Result<Option<Vec<String>>, StratlabError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(list) if list.eq_ignore_ascii_case("all") => Ok(None),
        Some(list) => Ok(Some(parse_segments(list)?)),
    }
}

/// `None` or `all` selects the whole catalog; otherwise a comma separated id list.
pub fn resolve_strategy_ids(value: Option<&str>) -> Result<Vec<StrategyId>, StratlabError> {
    let Some(list) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(StrategyId::all().to_vec());
    };
    if list.eq_ignore_ascii_case("all") {
        return Ok(StrategyId::all().to_vec());
    }

    let mut ids = Vec::new();
    for token in list.split(',') {
        let id: StrategyId = token
            .parse()
            .map_err(|_| StratlabError::UnknownStrategy(token.trim().to_string()))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

pub fn parse_date_key(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, StratlabError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| invalid(section, key, &format!("invalid {key} format, expected YYYY-MM-DD"))),
    }
}

pub fn parse_time_key(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveTime>, StratlabError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
            .map(Some)
            .map_err(|_| invalid(section, key, &format!("invalid {key} format, expected HH:MM"))),
    }
}

/// A present key must hold a finite number.
pub fn number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, StratlabError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(section, key, "expected a number")),
        },
    }
}

fn missing(section: &str, key: &str) -> StratlabError {
    StratlabError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> StratlabError {
    StratlabError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
