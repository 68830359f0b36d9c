//! Per-ticker pipeline and the universe runner.
//!
//! A ticker runs through explicit stages, each returning a new value:
//! `clean_bars` → `TimeSeriesFrame::from_bars` → `compute_indicators` →
//! `StrategyKind::generate` → `PositionMode::apply`. Tickers share nothing,
//! so the universe runner fans them out over rayon's pool and collects one
//! outcome per ticker. A failing ticker does not stop the others.

use crate::domain::cleaning::clean_bars;
use crate::domain::error::SignalforgeError;
use crate::domain::frame::TimeSeriesFrame;
use crate::domain::indicator::{IndicatorConfig, IndicatorEngine};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::{PositionMode, TransitionKind, transitions};
use crate::domain::strategy::{SignalMasks, StrategyKind};
use crate::domain::universe::TickerSelection;
use crate::ports::data_port::DataPort;
use crate::ports::sink_port::SinkPort;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Validated run configuration, built by `config_validation`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub tickers: TickerSelection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub strategy: StrategyKind,
    pub position_mode: PositionMode,
    pub parallel: bool,
    pub indicators: IndicatorConfig,
}

/// Everything one ticker's pipeline produced.
#[derive(Debug, Clone)]
pub struct TickerRun {
    pub strategy: StrategyKind,
    pub position_mode: PositionMode,
    pub frame: TimeSeriesFrame,
    pub signals: SignalMasks,
    pub positions: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticker: String,
    pub bars: usize,
    pub entries: usize,
    pub exits: usize,
    pub final_position: f64,
    /// Fraction of bars held long.
    pub exposure: f64,
}

impl TickerRun {
    pub fn ticker(&self) -> &str {
        self.frame.ticker()
    }

    pub fn summary(&self) -> RunSummary {
        let events = transitions(&self.positions);
        let entries = events
            .iter()
            .filter(|t| t.kind == TransitionKind::Entry)
            .count();
        let bars = self.positions.len();
        let long_bars = self.positions.iter().filter(|p| **p > 0.0).count();
        RunSummary {
            ticker: self.ticker().to_string(),
            bars,
            entries,
            exits: events.len() - entries,
            final_position: self.positions.last().copied().unwrap_or(0.0),
            exposure: if bars == 0 {
                0.0
            } else {
                long_bars as f64 / bars as f64
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    engine: IndicatorEngine,
    strategy: StrategyKind,
    position_mode: PositionMode,
}

impl Pipeline {
    pub fn new(
        indicators: IndicatorConfig,
        strategy: StrategyKind,
        position_mode: PositionMode,
    ) -> Self {
        Self {
            engine: IndicatorEngine::new(indicators),
            strategy,
            position_mode,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.indicators.clone(), config.strategy, config.position_mode)
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Clean raw bars and add indicator columns.
    pub fn enrich(
        &self,
        ticker: &str,
        bars: Vec<OhlcvBar>,
    ) -> Result<TimeSeriesFrame, SignalforgeError> {
        let bars = clean_bars(ticker, bars);
        if bars.is_empty() {
            return Err(SignalforgeError::EmptySeries {
                ticker: ticker.to_string(),
            });
        }
        let frame = TimeSeriesFrame::from_bars(ticker, &bars)?;
        self.engine.compute(&frame)
    }

    /// Signals and positions for an already enriched frame.
    pub fn run_frame(&self, frame: TimeSeriesFrame) -> Result<TickerRun, SignalforgeError> {
        let signals = self.strategy.generate(&frame)?;
        let positions = self.position_mode.apply(&signals.buy, &signals.sell)?;
        Ok(TickerRun {
            strategy: self.strategy,
            position_mode: self.position_mode,
            frame,
            signals,
            positions,
        })
    }

    pub fn run_bars(
        &self,
        ticker: &str,
        bars: Vec<OhlcvBar>,
    ) -> Result<TickerRun, SignalforgeError> {
        let frame = self.enrich(ticker, bars)?;
        self.run_frame(frame)
    }
}

#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: String,
    pub result: Result<RunSummary, SignalforgeError>,
}

#[derive(Debug, Default)]
pub struct UniverseReport {
    pub outcomes: Vec<TickerOutcome>,
}

impl UniverseReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &RunSummary> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &SignalforgeError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.ticker.as_str(), e)))
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded().next().is_none()
    }
}

pub struct UniverseRunner<'a> {
    pipeline: &'a Pipeline,
    data: &'a dyn DataPort,
    sinks: Vec<&'a dyn SinkPort>,
    start: NaiveDate,
    end: NaiveDate,
    parallel: bool,
}

impl<'a> UniverseRunner<'a> {
    pub fn new(
        pipeline: &'a Pipeline,
        data: &'a dyn DataPort,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            pipeline,
            data,
            sinks: Vec::new(),
            start,
            end,
            parallel: true,
        }
    }

    /// Add an output; every sink receives each successful ticker run.
    pub fn with_sink(mut self, sink: &'a dyn SinkPort) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run one ticker end to end: fetch, pipeline, then each sink in order.
    pub fn run_ticker(&self, ticker: &str) -> Result<RunSummary, SignalforgeError> {
        let bars = self.data.fetch_bars(ticker, self.start, self.end)?;
        debug!(ticker, bars = bars.len(), "fetched bars");
        let run = self.pipeline.run_bars(ticker, bars)?;
        for sink in &self.sinks {
            sink.write(&run)?;
        }
        Ok(run.summary())
    }

    /// Outcomes are returned in input order whether or not the run is parallel.
    pub fn run(&self, tickers: &[String]) -> UniverseReport {
        info!(
            tickers = tickers.len(),
            strategy = %self.pipeline.strategy(),
            parallel = self.parallel,
            "running universe"
        );

        let run_one = |ticker: &String| {
            let result = self.run_ticker(ticker);
            if let Err(e) = &result {
                warn!(ticker = ticker.as_str(), error = %e, "ticker failed");
            }
            TickerOutcome {
                ticker: ticker.clone(),
                result,
            }
        };

        let outcomes: Vec<TickerOutcome> = if self.parallel {
            tickers.par_iter().map(run_one).collect()
        } else {
            tickers.iter().map(run_one).collect()
        };

        let report = UniverseReport { outcomes };
        info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            "universe complete"
        );
        report
    }
}
