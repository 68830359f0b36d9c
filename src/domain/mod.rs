//! Core domain types and logic.

pub mod cleaning;
pub mod config_validation;
pub mod error;
pub mod frame;
pub mod indicator;
pub mod ohlcv;
pub mod pipeline;
pub mod position;
pub mod rule;
pub mod rule_eval;
pub mod strategy;
pub mod universe;
