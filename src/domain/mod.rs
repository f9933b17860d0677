//! Core domain types and logic.

pub mod price;
pub mod indicator;
pub mod series;
pub mod signal;
pub mod performance;
pub mod metrics;
pub mod backtest;
pub mod config_validation;
pub mod error;
