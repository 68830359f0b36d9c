//! Signal-to-position conversion.
//!
//! The canonical conversion is a two-state machine (FLAT/LONG) with
//! hysteresis: a FLAT state only reacts to buy, a LONG state only to sell.
//! Bar 0 is always FLAT. The forward-fill variant is kept for comparison
//! with older runs and differs when buy and sell fire on the same bar.

use crate::domain::error::SignalforgeError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    pub fn weight(&self) -> f64 {
        match self {
            PositionState::Flat => 0.0,
            PositionState::Long => 1.0,
        }
    }
}

/// Incremental state machine. Feed one bar at a time with [`step`](Self::step).
#[derive(Debug, Clone, Default)]
pub struct PositionStateMachine {
    state: PositionState,
    bars_seen: usize,
}

impl PositionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    /// Advance one bar and return that bar's weight.
    pub fn step(&mut self, buy: bool, sell: bool) -> f64 {
        let first = self.bars_seen == 0;
        self.bars_seen += 1;
        if first {
            return self.state.weight();
        }
        self.state = match self.state {
            PositionState::Flat if buy => PositionState::Long,
            PositionState::Long if sell => PositionState::Flat,
            s => s,
        };
        self.state.weight()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionMode {
    #[default]
    StateMachine,
    ForwardFill,
}

impl PositionMode {
    pub fn name(&self) -> &'static str {
        match self {
            PositionMode::StateMachine => "state_machine",
            PositionMode::ForwardFill => "forward_fill",
        }
    }

    pub fn apply(&self, buy: &[bool], sell: &[bool]) -> Result<Vec<f64>, SignalforgeError> {
        match self {
            PositionMode::StateMachine => signals_to_positions(buy, sell),
            PositionMode::ForwardFill => forward_fill_positions(buy, sell),
        }
    }
}

impl fmt::Display for PositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PositionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "state_machine" => Ok(PositionMode::StateMachine),
            "forward_fill" => Ok(PositionMode::ForwardFill),
            other => Err(format!(
                "unknown position mode '{}' (expected state_machine or forward_fill)",
                other
            )),
        }
    }
}

fn check_lengths(buy: &[bool], sell: &[bool]) -> Result<(), SignalforgeError> {
    if buy.len() != sell.len() {
        return Err(SignalforgeError::LengthMismatch {
            expected: buy.len(),
            actual: sell.len(),
        });
    }
    Ok(())
}

/// Convert buy/sell masks to a position series in {0.0, 1.0}.
pub fn signals_to_positions(buy: &[bool], sell: &[bool]) -> Result<Vec<f64>, SignalforgeError> {
    check_lengths(buy, sell)?;
    let mut machine = PositionStateMachine::new();
    Ok(buy
        .iter()
        .zip(sell)
        .map(|(&b, &s)| machine.step(b, s))
        .collect())
}

/// Forward-fill conversion: 1 on buy bars, 0 on sell bars (sell wins a tie),
/// carried forward, 0 before the first signal. Bar 0 is not special-cased.
pub fn forward_fill_positions(buy: &[bool], sell: &[bool]) -> Result<Vec<f64>, SignalforgeError> {
    check_lengths(buy, sell)?;
    let mut current = 0.0;
    Ok(buy
        .iter()
        .zip(sell)
        .map(|(&b, &s)| {
            if s {
                current = 0.0;
            } else if b {
                current = 1.0;
            }
            current
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Entry,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub index: usize,
    pub kind: TransitionKind,
}

/// Bars where the position changes, starting from FLAT.
pub fn transitions(positions: &[f64]) -> Vec<Transition> {
    let mut out = Vec::new();
    let mut prev = 0.0;
    for (index, &p) in positions.iter().enumerate() {
        if p > prev {
            out.push(Transition {
                index,
                kind: TransitionKind::Entry,
            });
        } else if p < prev {
            out.push(Transition {
                index,
                kind: TransitionKind::Exit,
            });
        }
        prev = p;
    }
    out
}
