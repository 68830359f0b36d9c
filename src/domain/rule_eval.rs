//! Rule evaluation over an indicator-enriched frame.
//!
//! # Evaluation Semantics
//!
//! - Comparison rules: evaluated at the given bar index; NaN on either side is `false`
//! - `CROSS_ABOVE`/`CROSS_BELOW`: require `index >= 1`, return `false` at index 0
//! - `RISING`: requires `index >= 1`
//! - `AND`: short-circuits on first `false`
//! - `OR`: short-circuits on first `true`

use crate::domain::error::SignalforgeError;
use crate::domain::frame::{Column, TimeSeriesFrame};
use crate::domain::indicator::rolling::rolling_mean;
use crate::domain::rule::{Operand, Rule};
use std::collections::HashMap;

/// Columns and derived series a rule needs, resolved once per frame.
pub struct EvalContext<'a> {
    frame: &'a TimeSeriesFrame,
    rolling: HashMap<(Column, usize), Vec<f64>>,
}

impl<'a> EvalContext<'a> {
    /// Fails with `MissingColumn` when the rule reads a column the frame lacks.
    pub fn new(rule: &Rule, frame: &'a TimeSeriesFrame) -> Result<Self, SignalforgeError> {
        for column in rule.columns() {
            frame.require(column)?;
        }
        let mut rolling = HashMap::new();
        collect_rolling(rule, frame, &mut rolling)?;
        Ok(Self { frame, rolling })
    }

    fn value(&self, operand: &Operand, bar_index: usize) -> f64 {
        match operand {
            Operand::Constant(v) => *v,
            Operand::Column(c) => self
                .frame
                .column(*c)
                .and_then(|s| s.get(bar_index).copied())
                .unwrap_or(f64::NAN),
            Operand::RollingMean { column, period } => self
                .rolling
                .get(&(*column, *period))
                .and_then(|s| s.get(bar_index).copied())
                .unwrap_or(f64::NAN),
        }
    }
}

fn collect_rolling(
    rule: &Rule,
    frame: &TimeSeriesFrame,
    out: &mut HashMap<(Column, usize), Vec<f64>>,
) -> Result<(), SignalforgeError> {
    let mut visit = |operand: &Operand| -> Result<(), SignalforgeError> {
        if let Operand::RollingMean { column, period } = operand {
            if !out.contains_key(&(*column, *period)) {
                let series = rolling_mean(frame.require(*column)?, *period);
                out.insert((*column, *period), series);
            }
        }
        Ok(())
    };
    match rule {
        Rule::Above { left, right }
        | Rule::Below { left, right }
        | Rule::CrossAbove { left, right }
        | Rule::CrossBelow { left, right } => {
            visit(left)?;
            visit(right)
        }
        Rule::Rising(operand) => visit(operand),
        Rule::And(rules) | Rule::Or(rules) => {
            for r in rules {
                collect_rolling(r, frame, out)?;
            }
            Ok(())
        }
    }
}

pub fn evaluate_at(rule: &Rule, ctx: &EvalContext<'_>, bar_index: usize) -> bool {
    match rule {
        Rule::Above { left, right } => ctx.value(left, bar_index) > ctx.value(right, bar_index),
        Rule::Below { left, right } => ctx.value(left, bar_index) < ctx.value(right, bar_index),
        Rule::CrossAbove { left, right } => {
            if bar_index == 0 {
                return false;
            }
            let left_curr = ctx.value(left, bar_index);
            let right_curr = ctx.value(right, bar_index);
            let left_prev = ctx.value(left, bar_index - 1);
            let right_prev = ctx.value(right, bar_index - 1);

            left_curr > right_curr && left_prev < right_prev
        }
        Rule::CrossBelow { left, right } => {
            if bar_index == 0 {
                return false;
            }
            let left_curr = ctx.value(left, bar_index);
            let right_curr = ctx.value(right, bar_index);
            let left_prev = ctx.value(left, bar_index - 1);
            let right_prev = ctx.value(right, bar_index - 1);

            left_curr < right_curr && left_prev > right_prev
        }
        Rule::Rising(operand) => {
            bar_index > 0 && ctx.value(operand, bar_index) > ctx.value(operand, bar_index - 1)
        }
        Rule::And(rules) => rules.iter().all(|r| evaluate_at(r, ctx, bar_index)),
        Rule::Or(rules) => rules.iter().any(|r| evaluate_at(r, ctx, bar_index)),
    }
}

/// Evaluate `rule` at every bar of `frame`.
pub fn evaluate(rule: &Rule, frame: &TimeSeriesFrame) -> Result<Vec<bool>, SignalforgeError> {
    let ctx = EvalContext::new(rule, frame)?;
    Ok((0..frame.len()).map(|i| evaluate_at(rule, &ctx, i)).collect())
}
