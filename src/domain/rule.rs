//! Rule AST for strategy conditions.
//!
//! - `Operand`: a frame column, a constant, or a rolling mean of a column
//! - `Rule`: comparisons, strict crossovers, a rising test, and AND/OR
//!
//! There is deliberately no negation: a comparison touching an undefined
//! value is false, and negating it would turn "undefined" into true.

use crate::domain::frame::Column;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(Column),
    Constant(f64),
    RollingMean { column: Column, period: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Above { left: Operand, right: Operand },
    Below { left: Operand, right: Operand },
    /// left > right now and left < right on the previous bar.
    CrossAbove { left: Operand, right: Operand },
    /// left < right now and left > right on the previous bar.
    CrossBelow { left: Operand, right: Operand },
    /// operand[t] > operand[t-1].
    Rising(Operand),
    And(Vec<Rule>),
    Or(Vec<Rule>),
}

impl Operand {
    pub fn column(&self) -> Option<Column> {
        match self {
            Operand::Column(c) => Some(*c),
            Operand::RollingMean { column, .. } => Some(*column),
            Operand::Constant(_) => None,
        }
    }
}

impl Rule {
    pub fn above(left: Column, right: Column) -> Self {
        Rule::Above {
            left: Operand::Column(left),
            right: Operand::Column(right),
        }
    }

    pub fn below(left: Column, right: Column) -> Self {
        Rule::Below {
            left: Operand::Column(left),
            right: Operand::Column(right),
        }
    }

    pub fn above_value(left: Column, value: f64) -> Self {
        Rule::Above {
            left: Operand::Column(left),
            right: Operand::Constant(value),
        }
    }

    pub fn below_value(left: Column, value: f64) -> Self {
        Rule::Below {
            left: Operand::Column(left),
            right: Operand::Constant(value),
        }
    }

    /// Every frame column the rule reads.
    pub fn columns(&self) -> BTreeSet<Column> {
        let mut out = BTreeSet::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut BTreeSet<Column>) {
        match self {
            Rule::Above { left, right }
            | Rule::Below { left, right }
            | Rule::CrossAbove { left, right }
            | Rule::CrossBelow { left, right } => {
                out.extend(left.column());
                out.extend(right.column());
            }
            Rule::Rising(operand) => out.extend(operand.column()),
            Rule::And(rules) | Rule::Or(rules) => {
                for r in rules {
                    r.collect_columns(out);
                }
            }
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(c) => write!(f, "{}", c),
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::RollingMean { column, period } => write!(f, "MEAN({}, {})", column, period),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Above { left, right } => write!(f, "{} > {}", left, right),
            Rule::Below { left, right } => write!(f, "{} < {}", left, right),
            Rule::CrossAbove { left, right } => write!(f, "CROSS_ABOVE({}, {})", left, right),
            Rule::CrossBelow { left, right } => write!(f, "CROSS_BELOW({}, {})", left, right),
            Rule::Rising(operand) => write!(f, "RISING({})", operand),
            Rule::And(rules) => write_joined(f, rules, " AND "),
            Rule::Or(rules) => write_joined(f, rules, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, rules: &[Rule], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, r) in rules.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", r)?;
    }
    write!(f, ")")
}
