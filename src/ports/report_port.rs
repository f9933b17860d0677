//! Report generation port trait.

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::MacrossError;
use std::path::{Path, PathBuf};

/// Port for writing backtest artifacts.
pub trait ReportPort {
    /// Write every artifact for `result` into `output_dir`, replacing any
    /// previous run's files. Returns the paths written, in order.
    fn write(
        &self,
        result: &BacktestResult,
        config: &BacktestConfig,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, MacrossError>;
}
