//! Configuration validation.
//!
//! Reads the `[pipeline]` and `[indicators]` sections through a
//! [`ConfigPort`], validating every field, and builds the typed
//! [`PipelineConfig`]. Nothing runs until the whole file is accepted.

use crate::domain::error::SignalforgeError;
use crate::domain::frame::Column;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::pipeline::PipelineConfig;
use crate::domain::position::PositionMode;
use crate::domain::strategy::StrategyKind;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

const PIPELINE: &str = "pipeline";
const INDICATORS: &str = "indicators";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "out";

pub fn load_pipeline_config(config: &dyn ConfigPort) -> Result<PipelineConfig, SignalforgeError> {
    let tickers = match config.get_string(PIPELINE, "tickers") {
        None => return Err(missing(PIPELINE, "tickers")),
        Some(s) => parse_tickers(&s).map_err(|e| invalid(PIPELINE, "tickers", e.to_string()))?,
    };

    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if start_date >= end_date {
        return Err(invalid(
            PIPELINE,
            "start_date",
            "start_date must be before end_date",
        ));
    }

    let strategy: StrategyKind = match config.get_string(PIPELINE, "strategy") {
        None => return Err(missing(PIPELINE, "strategy")),
        Some(s) => s
            .parse()
            .map_err(|e: SignalforgeError| invalid(PIPELINE, "strategy", e.to_string()))?,
    };

    let position_mode = match non_empty(config, PIPELINE, "position_mode") {
        None => PositionMode::default(),
        Some(s) => s
            .parse()
            .map_err(|e: String| invalid(PIPELINE, "position_mode", e))?,
    };

    let data_dir =
        non_empty(config, PIPELINE, "data_dir").unwrap_or_else(|| DEFAULT_DATA_DIR.into());
    let output_dir =
        non_empty(config, PIPELINE, "output_dir").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into());

    let indicators = load_indicator_config(config)?;
    check_strategy_columns(strategy, &indicators)?;

    Ok(PipelineConfig {
        tickers,
        start_date,
        end_date,
        data_dir: PathBuf::from(data_dir),
        output_dir: PathBuf::from(output_dir),
        strategy,
        position_mode,
        parallel: config.get_bool(PIPELINE, "parallel", true),
        indicators,
    })
}

/// Build an [`IndicatorConfig`], falling back to defaults for absent keys.
pub fn load_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, SignalforgeError> {
    let defaults = IndicatorConfig::default();

    let windows = match non_empty(config, INDICATORS, "windows") {
        None => defaults.windows.clone(),
        Some(s) => parse_windows(&s)?,
    };

    let period = |key: &str, default: usize| read_period(config, key, default);

    let out = IndicatorConfig {
        windows,
        rsi_window: period("rsi_window", defaults.rsi_window)?,
        macd_fast: period("macd_fast", defaults.macd_fast)?,
        macd_slow: period("macd_slow", defaults.macd_slow)?,
        macd_signal: period("macd_signal", defaults.macd_signal)?,
        bollinger_window: period("bollinger_window", defaults.bollinger_window)?,
        bollinger_mult: read_multiplier(config, defaults.bollinger_mult)?,
        atr_window: period("atr_window", defaults.atr_window)?,
        adx_window: period("adx_window", defaults.adx_window)?,
        cci_window: period("cci_window", defaults.cci_window)?,
        roc_period: period("roc_period", defaults.roc_period)?,
        stochastic_window: period("stochastic_window", defaults.stochastic_window)?,
        stochastic_smoothing: period("stochastic_smoothing", defaults.stochastic_smoothing)?,
        williams_window: period("williams_window", defaults.williams_window)?,
        cmf_window: period("cmf_window", defaults.cmf_window)?,
        donchian_window: period("donchian_window", defaults.donchian_window)?,
    };

    if out.macd_fast >= out.macd_slow {
        return Err(invalid(
            INDICATORS,
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(out)
}

/// Fail when `strategy` reads a column the indicator configuration will not
/// produce, naming the config key that would fix it.
pub fn check_strategy_columns(
    strategy: StrategyKind,
    indicators: &IndicatorConfig,
) -> Result<(), SignalforgeError> {
    let produced = indicators.output_columns();
    for column in strategy.required_columns() {
        if column.is_input() || produced.contains(&column) {
            continue;
        }
        // only the parameterised columns can go missing
        let key = match column {
            Column::Roc(_) => "roc_period",
            _ => "windows",
        };
        return Err(invalid(
            INDICATORS,
            key,
            format!("strategy {} needs column {}", strategy, column),
        ));
    }
    Ok(())
}

fn parse_windows(value: &str) -> Result<Vec<usize>, SignalforgeError> {
    let mut windows = Vec::new();
    for token in value.split(',') {
        let w = parse_positive(token.trim()).ok_or_else(|| {
            invalid(
                INDICATORS,
                "windows",
                format!("'{}' is not a positive integer", token.trim()),
            )
        })?;
        if !windows.contains(&w) {
            windows.push(w);
        }
    }
    Ok(windows)
}

fn read_period(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, SignalforgeError> {
    match non_empty(config, INDICATORS, key) {
        None => Ok(default),
        Some(s) => parse_positive(&s).ok_or_else(|| {
            invalid(
                INDICATORS,
                key,
                format!("{} must be a positive integer", key),
            )
        }),
    }
}

fn read_multiplier(config: &dyn ConfigPort, default: f64) -> Result<f64, SignalforgeError> {
    match non_empty(config, INDICATORS, "bollinger_mult") {
        None => Ok(default),
        Some(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
            _ => Err(invalid(
                INDICATORS,
                "bollinger_mult",
                "bollinger_mult must be a positive number",
            )),
        },
    }
}

fn parse_positive(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|v| *v >= 1)
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, SignalforgeError> {
    match non_empty(config, PIPELINE, field) {
        None => Err(missing(PIPELINE, field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                PIPELINE,
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .filter(|s| !s.trim().is_empty())
}

fn missing(section: &str, key: &str) -> SignalforgeError {
    SignalforgeError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SignalforgeError {
    SignalforgeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}
