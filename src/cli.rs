//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_sink::{CsvSink, write_frame};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{check_strategy_columns, load_pipeline_config};
use crate::domain::error::SignalforgeError;
use crate::domain::pipeline::{Pipeline, PipelineConfig, UniverseReport, UniverseRunner};
use crate::domain::strategy::StrategyKind;
use crate::domain::universe::{parse_tickers, resolve_universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::sink_port::SinkPort;

#[derive(Parser, Debug)]
#[command(
    name = "signalforge",
    about = "Technical indicators and long/flat strategy positions from daily OHLCV data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline over the configured universe
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured tickers (comma separated)
        #[arg(long)]
        ticker: Option<String>,
        /// Override the configured strategy
        #[arg(short, long)]
        strategy: Option<String>,
        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate and print the plan without fetching data
        #[arg(long)]
        dry_run: bool,
    },
    /// Compute indicator columns for one ticker
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        /// Write CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the built-in strategies and their rules
    Strategies,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            ticker,
            strategy,
            output,
            dry_run,
        } => run_pipeline(
            &config,
            ticker.as_deref(),
            strategy.as_deref(),
            output,
            dry_run,
        ),
        Command::Indicators {
            config,
            ticker,
            output,
        } => run_indicators(&config, &ticker, output.as_deref()),
        Command::Strategies => {
            print_strategies();
            Ok(())
        }
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn open_config(path: &Path) -> Result<FileConfigAdapter, SignalforgeError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn load_config(path: &Path) -> Result<PipelineConfig, SignalforgeError> {
    load_pipeline_config(&open_config(path)?)
}

fn sqlite_path(config: &dyn ConfigPort) -> Option<String> {
    config
        .get_string("sqlite", "path")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

/// The `market_data` sink when `[sqlite] path` is configured.
#[cfg(feature = "sqlite")]
fn database_sink(config: &dyn ConfigPort) -> Result<Option<Box<dyn SinkPort>>, SignalforgeError> {
    use crate::adapters::sqlite_sink::SqliteSink;

    if sqlite_path(config).is_none() {
        return Ok(None);
    }
    let sink = SqliteSink::from_config(config)?;
    sink.initialize_schema()?;
    Ok(Some(Box::new(sink)))
}

#[cfg(not(feature = "sqlite"))]
fn database_sink(config: &dyn ConfigPort) -> Result<Option<Box<dyn SinkPort>>, SignalforgeError> {
    match sqlite_path(config) {
        None => Ok(None),
        Some(_) => Err(SignalforgeError::ConfigInvalid {
            section: "sqlite".into(),
            key: "path".into(),
            reason: "built without the sqlite feature".into(),
        }),
    }
}

fn apply_overrides(
    config: &mut PipelineConfig,
    ticker: Option<&str>,
    strategy: Option<&str>,
    output: Option<PathBuf>,
) -> Result<(), SignalforgeError> {
    if let Some(t) = ticker {
        config.tickers = parse_tickers(t).map_err(|e| SignalforgeError::ConfigInvalid {
            section: "cli".into(),
            key: "ticker".into(),
            reason: e.to_string(),
        })?;
    }
    if let Some(s) = strategy {
        config.strategy = s.parse()?;
        check_strategy_columns(config.strategy, &config.indicators)?;
    }
    if let Some(o) = output {
        config.output_dir = o;
    }
    Ok(())
}

pub fn run_pipeline(
    config_path: &Path,
    ticker: Option<&str>,
    strategy: Option<&str>,
    output: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), SignalforgeError> {
    let file = open_config(config_path)?;
    let mut config = load_pipeline_config(&file)?;
    apply_overrides(&mut config, ticker, strategy, output)?;

    let data = CsvAdapter::new(config.data_dir.clone());
    let tickers = resolve_universe(&config.tickers, &data)?;

    if dry_run {
        print_plan(&config, &tickers, sqlite_path(&file).as_deref());
        return Ok(());
    }

    let pipeline = Pipeline::from_config(&config);
    let csv = CsvSink::new(config.output_dir.clone());
    let database = database_sink(&file)?;

    let mut runner = UniverseRunner::new(&pipeline, &data, config.start_date, config.end_date)
        .with_sink(&csv)
        .with_parallelism(config.parallel);
    if let Some(db) = &database {
        runner = runner.with_sink(db.as_ref());
    }
    let report = runner.run(&tickers);

    print_report(&report);

    if report.all_failed() {
        if let Some(outcome) = report.outcomes.into_iter().next() {
            return outcome.result.map(|_| ());
        }
    }
    Ok(())
}

pub fn run_indicators(
    config_path: &Path,
    ticker: &str,
    output: Option<&Path>,
) -> Result<(), SignalforgeError> {
    let config = load_config(config_path)?;
    let ticker = ticker.trim().to_uppercase();

    let data = CsvAdapter::new(config.data_dir.clone());
    let bars = data.fetch_bars(&ticker, config.start_date, config.end_date)?;
    let frame = Pipeline::from_config(&config).enrich(&ticker, bars)?;

    let written = match output {
        Some(path) => {
            let file = fs::File::create(path)?;
            info!(path = %path.display(), rows = frame.len(), "writing indicators");
            write_frame(file, &frame, &[])
        }
        None => write_frame(io::stdout().lock(), &frame, &[]),
    };
    written.map_err(|e| SignalforgeError::Data {
        reason: format!("failed to write indicators: {}", e),
    })
}

pub fn run_validate(config_path: &Path) -> Result<(), SignalforgeError> {
    let file = open_config(config_path)?;
    let config = load_pipeline_config(&file)?;
    println!("Config OK");
    println!("  strategy:      {}", config.strategy);
    println!("  position mode: {}", config.position_mode);
    println!(
        "  period:        {} to {}",
        config.start_date, config.end_date
    );
    if let Some(path) = sqlite_path(&file) {
        println!("  sqlite:        {}", path);
    }
    Ok(())
}

fn print_strategies() {
    for kind in StrategyKind::ALL {
        let strategy = kind.strategy();
        println!("{}", kind);
        println!("  {}", strategy.description);
        println!("  buy:  {}", strategy.buy);
        println!("  sell: {}", strategy.sell);
        println!();
    }
}

fn print_plan(config: &PipelineConfig, tickers: &[String], sqlite: Option<&str>) {
    let strategy = config.strategy.strategy();
    println!("Dry run: no data fetched, nothing written");
    println!("  tickers:       {}", tickers.join(","));
    println!(
        "  period:        {} to {}",
        config.start_date, config.end_date
    );
    println!("  strategy:      {}", config.strategy);
    println!("  buy:           {}", strategy.buy);
    println!("  sell:          {}", strategy.sell);
    println!("  position mode: {}", config.position_mode);
    println!("  data dir:      {}", config.data_dir.display());
    println!("  output dir:    {}", config.output_dir.display());
    if let Some(path) = sqlite {
        println!("  sqlite:        {} (table market_data)", path);
    }
}

fn print_report(report: &UniverseReport) {
    println!(
        "{:<10} {:>6} {:>8} {:>6} {:>6} {:>9}",
        "TICKER", "BARS", "ENTRIES", "EXITS", "FINAL", "EXPOSURE"
    );
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(s) => println!(
                "{:<10} {:>6} {:>8} {:>6} {:>6.1} {:>8.1}%",
                s.ticker,
                s.bars,
                s.entries,
                s.exits,
                s.final_position,
                s.exposure * 100.0
            ),
            Err(e) => println!("{:<10} FAILED: {}", outcome.ticker, e),
        }
    }
}
