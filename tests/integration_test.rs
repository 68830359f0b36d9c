//! End-to-end pipeline tests.
//!
//! Tests cover:
//! - Indicator scenarios on small hand-checked series
//! - Every strategy over a realistic price path
//! - Signal-to-position scenarios, including the same-bar tie-break
//! - Universe runs with a mock data port and a recording sink

mod common;

use approx::assert_relative_eq;
use common::*;
use signalforge::domain::error::SignalforgeError;
use signalforge::domain::frame::Column;
use signalforge::domain::indicator::{IndicatorConfig, compute_indicators};
use signalforge::domain::pipeline::{Pipeline, TickerRun, UniverseRunner};
use signalforge::domain::position::{PositionMode, signals_to_positions};
use signalforge::domain::strategy::StrategyKind;
use signalforge::ports::sink_port::SinkPort;
use std::sync::Mutex;

mod indicator_scenarios {
    use super::*;

    #[test]
    fn sma_five_on_one_to_ten() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let frame = frame_from("TEST", &bars_from_closes("TEST", &closes));
        let out = compute_indicators(&frame, &IndicatorConfig::default()).unwrap();

        let sma5 = out.column(Column::Sma(5)).unwrap();
        assert!(sma5[3].is_nan());
        assert_eq!(sma5[4], 3.0);
        assert_eq!(sma5[9], 8.0);
    }

    #[test]
    fn ema_two_on_two_bars() {
        let config = IndicatorConfig {
            windows: vec![2],
            ..IndicatorConfig::default()
        };
        let frame = frame_from("TEST", &bars_from_closes("TEST", &[10.0, 12.0]));
        let out = compute_indicators(&frame, &config).unwrap();

        let ema2 = out.column(Column::Ema(2)).unwrap();
        assert_eq!(ema2[0], 10.0);
        assert_relative_eq!(ema2[1], 12.0 * (2.0 / 3.0) + 10.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_price_averages() {
        let closes = vec![50.0; 250];
        let frame = frame_from("FLAT", &bars_from_closes("FLAT", &closes));
        let config = IndicatorConfig::default();
        let out = compute_indicators(&frame, &config).unwrap();

        for &w in &config.windows {
            let sma = out.column(Column::Sma(w)).unwrap();
            let ema = out.column(Column::Ema(w)).unwrap();
            for t in w..closes.len() {
                assert_relative_eq!(sma[t], 50.0, epsilon = 1e-9);
                assert_relative_eq!(ema[t], 50.0, epsilon = 1e-9);
            }
        }

        // no movement: RSI is 0/0, stochastic range is 2 (high/low +-1)
        let rsi = out.column(Column::Rsi).unwrap();
        assert!(rsi.iter().all(|v| v.is_nan()));
        let atr = out.column(Column::Atr).unwrap();
        assert_relative_eq!(atr[249], 2.0, epsilon = 1e-12);
        let k = out.column(Column::StochK).unwrap();
        assert_relative_eq!(k[249], 50.0, epsilon = 1e-9);
        let obv = out.column(Column::Obv).unwrap();
        assert!(obv.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn every_column_matches_bar_count() {
        let bars = wavy_bars("WAVE", 300);
        let out = compute_indicators(&frame_from("WAVE", &bars), &IndicatorConfig::default())
            .unwrap();
        for (column, values) in out.columns() {
            assert_eq!(values.len(), 300, "column {}", column);
        }
        assert_eq!(out.dates().len(), 300);
    }

    #[test]
    fn warmup_lengths() {
        let bars = wavy_bars("WAVE", 300);
        let out = compute_indicators(&frame_from("WAVE", &bars), &IndicatorConfig::default())
            .unwrap();
        let first_defined = |c: Column| out.column(c).unwrap().iter().position(|v| !v.is_nan());

        assert_eq!(first_defined(Column::Sma(200)), Some(199));
        assert_eq!(first_defined(Column::Ema(200)), Some(0));
        assert_eq!(first_defined(Column::Rsi), Some(13));
        assert_eq!(first_defined(Column::Atr), Some(13));
        assert_eq!(first_defined(Column::Adx), Some(27));
        assert_eq!(first_defined(Column::Cci), Some(38));
        assert_eq!(first_defined(Column::Roc(10)), Some(10));
        assert_eq!(first_defined(Column::StochD), Some(15));
        assert_eq!(first_defined(Column::DonchianHigh), Some(19));
        assert_eq!(first_defined(Column::Obv), Some(0));
    }
}

mod strategies {
    use super::*;

    #[test]
    fn every_strategy_runs_on_enriched_frame() {
        let bars = wavy_bars("WAVE", 400);
        for kind in StrategyKind::ALL {
            let pipeline =
                Pipeline::new(IndicatorConfig::default(), kind, PositionMode::StateMachine);
            let run = pipeline.run_bars("WAVE", bars.clone()).unwrap();
            assert_eq!(run.signals.buy.len(), 400, "{}", kind);
            assert_eq!(run.signals.sell.len(), 400, "{}", kind);
            assert!(run.positions.iter().all(|p| *p == 0.0 || *p == 1.0));
            assert_eq!(run.positions[0], 0.0);
        }
    }

    #[test]
    fn positions_only_change_on_signals() {
        let bars = wavy_bars("WAVE", 400);
        for kind in StrategyKind::ALL {
            let pipeline =
                Pipeline::new(IndicatorConfig::default(), kind, PositionMode::StateMachine);
            let run = pipeline.run_bars("WAVE", bars.clone()).unwrap();
            for t in 1..run.positions.len() {
                if run.positions[t] > run.positions[t - 1] {
                    assert!(run.signals.buy[t], "{} entry at {} without buy", kind, t);
                }
                if run.positions[t] < run.positions[t - 1] {
                    assert!(run.signals.sell[t], "{} exit at {} without sell", kind, t);
                }
            }
        }
    }

    #[test]
    fn macd_cross_fires_on_wavy_path() {
        let bars = wavy_bars("WAVE", 400);
        let pipeline = Pipeline::new(
            IndicatorConfig::default(),
            StrategyKind::MacdCross,
            PositionMode::StateMachine,
        );
        let run = pipeline.run_bars("WAVE", bars).unwrap();
        assert!(run.signals.sell.iter().any(|s| *s));
    }

    #[test]
    fn strategy_on_raw_frame_is_missing_column() {
        let frame = frame_from("RAW", &wavy_bars("RAW", 50));
        let err = StrategyKind::MomentumTrend.generate(&frame).unwrap_err();
        assert!(matches!(err, SignalforgeError::MissingColumn { .. }));
    }

    #[test]
    fn strategy_with_incompatible_windows_is_missing_column() {
        let config = IndicatorConfig {
            windows: vec![5, 10],
            ..IndicatorConfig::default()
        };
        let frame = compute_indicators(&frame_from("W", &wavy_bars("W", 60)), &config).unwrap();
        let err = StrategyKind::AdxCciPullback.generate(&frame).unwrap_err();
        assert!(matches!(err, SignalforgeError::MissingColumn { column } if column == "EMA_20"));
    }
}

mod positions {
    use super::*;

    fn mask(len: usize, on: &[usize]) -> Vec<bool> {
        (0..len).map(|i| on.contains(&i)).collect()
    }

    #[test]
    fn buy_at_three_sell_at_seven() {
        let positions = signals_to_positions(&mask(10, &[3]), &mask(10, &[7])).unwrap();
        assert_eq!(
            positions,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn simultaneous_signals_while_flat_go_long() {
        let positions = signals_to_positions(&mask(6, &[2]), &mask(6, &[2])).unwrap();
        assert_eq!(positions, vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }
}

mod universe {
    use super::*;

    struct RecordingSink {
        written: Mutex<Vec<String>>,
    }

    impl SinkPort for RecordingSink {
        fn write(&self, run: &TickerRun) -> Result<(), SignalforgeError> {
            self.written.lock().unwrap().push(run.ticker().to_string());
            Ok(())
        }
    }

    #[test]
    fn failures_are_isolated_per_ticker() {
        let port = MockDataPort::new()
            .with_bars("AAA", wavy_bars("AAA", 200))
            .with_bars("BBB", wavy_bars("BBB", 200))
            .with_error("BAD", "connection reset");
        let sink = RecordingSink {
            written: Mutex::new(Vec::new()),
        };
        let pipeline = Pipeline::new(
            IndicatorConfig::default(),
            StrategyKind::MomentumTrend,
            PositionMode::StateMachine,
        );
        let tickers: Vec<String> = ["AAA", "BAD", "BBB"].iter().map(|s| s.to_string()).collect();

        let report = UniverseRunner::new(&pipeline, &port, date(2023, 1, 1), date(2023, 12, 31))
            .with_sink(&sink)
            .run(&tickers);

        assert_eq!(report.succeeded().count(), 2);
        let failed: Vec<&str> = report.failed().map(|(t, _)| t).collect();
        assert_eq!(failed, vec!["BAD"]);

        let mut written = sink.written.lock().unwrap().clone();
        written.sort();
        assert_eq!(written, vec!["AAA", "BBB"]);
    }

    #[test]
    fn date_window_limits_bars() {
        let port = MockDataPort::new().with_bars("AAA", wavy_bars("AAA", 365));
        let pipeline = Pipeline::new(
            IndicatorConfig::default(),
            StrategyKind::RsiStochastic,
            PositionMode::ForwardFill,
        );
        let runner = UniverseRunner::new(&pipeline, &port, date(2023, 2, 1), date(2023, 2, 28));
        let summary = runner.run_ticker("AAA").unwrap();
        assert_eq!(summary.bars, 28);
    }

    #[test]
    fn unknown_ticker_is_empty_series() {
        let port = MockDataPort::new();
        let pipeline = Pipeline::new(
            IndicatorConfig::default(),
            StrategyKind::MacdCross,
            PositionMode::StateMachine,
        );
        let runner = UniverseRunner::new(&pipeline, &port, date(2023, 1, 1), date(2023, 12, 31));
        let err = runner.run_ticker("NOPE").unwrap_err();
        assert!(matches!(err, SignalforgeError::EmptySeries { ticker } if ticker == "NOPE"));
    }
}
