//! The seven built-in long-only strategies.
//!
//! Each strategy is a pair of [`Rule`]s evaluated bar by bar over an
//! indicator-enriched frame, producing buy and sell masks.

use crate::domain::error::SignalforgeError;
use crate::domain::frame::{Column, TimeSeriesFrame};
use crate::domain::rule::{Operand, Rule};
use crate::domain::rule_eval;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MomentumTrend,
    MeanReversion,
    MacdCross,
    VolatilityBreakout,
    RsiStochastic,
    OversoldReversal,
    AdxCciPullback,
}

#[derive(Debug, Clone)]
pub struct Strategy {
    pub kind: StrategyKind,
    pub description: &'static str,
    pub buy: Rule,
    pub sell: Rule,
}

/// Buy and sell masks, both aligned to the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalMasks {
    pub buy: Vec<bool>,
    pub sell: Vec<bool>,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::MomentumTrend,
        StrategyKind::MeanReversion,
        StrategyKind::MacdCross,
        StrategyKind::VolatilityBreakout,
        StrategyKind::RsiStochastic,
        StrategyKind::OversoldReversal,
        StrategyKind::AdxCciPullback,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::MomentumTrend => "momentum_trend",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::MacdCross => "macd_cross",
            StrategyKind::VolatilityBreakout => "volatility_breakout",
            StrategyKind::RsiStochastic => "rsi_stochastic",
            StrategyKind::OversoldReversal => "oversold_reversal",
            StrategyKind::AdxCciPullback => "adx_cci_pullback",
        }
    }

    pub fn strategy(&self) -> Strategy {
        Strategy {
            kind: *self,
            description: self.description(),
            buy: self.buy_rule(),
            sell: self.sell_rule(),
        }
    }

    fn description(&self) -> &'static str {
        match self {
            StrategyKind::MomentumTrend => "Trend following confirmed by RSI, ADX and money flow",
            StrategyKind::MeanReversion => "Buy oversold closes below the lower Bollinger band",
            StrategyKind::MacdCross => "MACD line crossing its signal line above EMA 20",
            StrategyKind::VolatilityBreakout => "Donchian breakout on expanding ATR",
            StrategyKind::RsiStochastic => "Stochastic %K/%D cross filtered by RSI and CCI",
            StrategyKind::OversoldReversal => {
                "Deep Williams %R with positive momentum and rising OBV"
            }
            StrategyKind::AdxCciPullback => "CCI pullback inside a strong EMA trend",
        }
    }

    pub fn buy_rule(&self) -> Rule {
        match self {
            StrategyKind::MomentumTrend => Rule::And(vec![
                Rule::above(Column::Ema(20), Column::Ema(50)),
                Rule::above_value(Column::Rsi, 55.0),
                Rule::above_value(Column::Adx, 20.0),
                Rule::above_value(Column::Cmf, 0.0),
            ]),
            StrategyKind::MeanReversion => Rule::And(vec![
                Rule::below(Column::Close, Column::LowerBand),
                Rule::below_value(Column::Rsi, 30.0),
                Rule::below_value(Column::WilliamsR, -80.0),
            ]),
            StrategyKind::MacdCross => Rule::And(vec![
                cross_above(Column::MacdLine, Column::MacdSignal),
                Rule::above(Column::Close, Column::Ema(20)),
                Rule::above_value(Column::Cmf, 0.0),
            ]),
            StrategyKind::VolatilityBreakout => Rule::And(vec![
                Rule::above(Column::Close, Column::DonchianHigh),
                Rule::Above {
                    left: Operand::Column(Column::Atr),
                    right: Operand::RollingMean {
                        column: Column::Atr,
                        period: 20,
                    },
                },
                Rule::above_value(Column::Cmf, 0.0),
                Rule::above_value(Column::Adx, 25.0),
            ]),
            StrategyKind::RsiStochastic => Rule::And(vec![
                cross_above(Column::StochK, Column::StochD),
                Rule::above_value(Column::Rsi, 40.0),
                Rule::above_value(Column::Cci, -100.0),
            ]),
            StrategyKind::OversoldReversal => Rule::And(vec![
                Rule::below_value(Column::WilliamsR, -90.0),
                Rule::above_value(Column::Roc(10), 0.0),
                Rule::Rising(Operand::Column(Column::Obv)),
            ]),
            StrategyKind::AdxCciPullback => Rule::And(vec![
                Rule::above_value(Column::Adx, 25.0),
                Rule::above(Column::Ema(20), Column::Ema(50)),
                Rule::below_value(Column::Cci, -100.0),
            ]),
        }
    }

    pub fn sell_rule(&self) -> Rule {
        match self {
            StrategyKind::MomentumTrend => Rule::Or(vec![
                Rule::below(Column::Ema(20), Column::Ema(50)),
                Rule::below_value(Column::Rsi, 50.0),
            ]),
            StrategyKind::MeanReversion => Rule::Or(vec![
                Rule::above(Column::Close, Column::Sma(20)),
                Rule::above_value(Column::Rsi, 50.0),
            ]),
            StrategyKind::MacdCross => Rule::CrossBelow {
                left: Operand::Column(Column::MacdLine),
                right: Operand::Column(Column::MacdSignal),
            },
            StrategyKind::VolatilityBreakout => Rule::Or(vec![
                Rule::below(Column::Close, Column::DonchianLow),
                Rule::below_value(Column::Adx, 20.0),
            ]),
            StrategyKind::RsiStochastic => Rule::CrossBelow {
                left: Operand::Column(Column::StochK),
                right: Operand::Column(Column::StochD),
            },
            StrategyKind::OversoldReversal => Rule::Or(vec![
                Rule::above_value(Column::WilliamsR, -30.0),
                Rule::below_value(Column::Roc(10), 0.0),
            ]),
            StrategyKind::AdxCciPullback => Rule::Or(vec![
                Rule::below_value(Column::Adx, 20.0),
                Rule::above_value(Column::Cci, 100.0),
            ]),
        }
    }

    /// Every column either rule reads.
    pub fn required_columns(&self) -> BTreeSet<Column> {
        let mut columns = self.buy_rule().columns();
        columns.extend(self.sell_rule().columns());
        columns
    }

    /// Produce buy/sell masks for `frame`.
    ///
    /// Every required column is checked before any mask is built, so a
    /// `MissingColumn` error never leaves a half-evaluated result behind.
    pub fn generate(&self, frame: &TimeSeriesFrame) -> Result<SignalMasks, SignalforgeError> {
        for column in self.required_columns() {
            frame.require(column)?;
        }
        let buy = rule_eval::evaluate(&self.buy_rule(), frame)?;
        let sell = rule_eval::evaluate(&self.sell_rule(), frame)?;
        debug!(
            ticker = frame.ticker(),
            strategy = self.name(),
            buys = buy.iter().filter(|b| **b).count(),
            sells = sell.iter().filter(|s| **s).count(),
            "signals generated"
        );
        Ok(SignalMasks { buy, sell })
    }
}

fn cross_above(left: Column, right: Column) -> Rule {
    Rule::CrossAbove {
        left: Operand::Column(left),
        right: Operand::Column(right),
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = SignalforgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| SignalforgeError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}
