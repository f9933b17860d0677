//! Flat-file report output.
//!
//! Writes the full series, the equity curve and the metrics summary as CSV,
//! plus a two-panel SVG chart, into one output directory. Files are
//! truncated on open, so a rerun replaces the previous run's output.

pub mod chart_svg;
pub mod tables;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::MacrossError;
use crate::ports::report_port::ReportPort;

pub const SERIES_FILE: &str = "full_backtest_data.csv";
pub const EQUITY_FILE: &str = "equity_curve.csv";
pub const METRICS_FILE: &str = "metrics.csv";
pub const CHART_FILE: &str = "chart.svg";

pub struct FileReportAdapter;

impl FileReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Create `dir` if needed, logging whether it already existed.
pub fn ensure_output_dir(dir: &Path) -> Result<(), MacrossError> {
    if dir.is_dir() {
        info!("Folder already exists: {}", dir.display());
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| MacrossError::Output {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;
    info!("Created folder: {}", dir.display());
    Ok(())
}

fn write_csv<F>(path: &Path, write: F) -> Result<(), MacrossError>
where
    F: FnOnce(BufWriter<File>) -> csv::Result<()>,
{
    let output_err = |reason: String| MacrossError::Output {
        path: path.display().to_string(),
        reason,
    };
    let file = File::create(path).map_err(|e| output_err(e.to_string()))?;
    write(BufWriter::new(file)).map_err(|e| output_err(e.to_string()))?;
    info!("Saved: {}", path.display());
    Ok(())
}

impl ReportPort for FileReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        config: &BacktestConfig,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, MacrossError> {
        ensure_output_dir(output_dir)?;

        let series_path = output_dir.join(SERIES_FILE);
        write_csv(&series_path, |w| tables::write_series(&result.rows, w))?;

        let equity_path = output_dir.join(EQUITY_FILE);
        write_csv(&equity_path, |w| tables::write_equity_curve(&result.rows, w))?;

        let metrics_path = output_dir.join(METRICS_FILE);
        let summary = result.metrics.summary();
        write_csv(&metrics_path, |w| tables::write_metrics(&summary, w))?;

        let chart_path = output_dir.join(CHART_FILE);
        let svg = chart_svg::render_chart(
            &result.rows,
            &config.ticker,
            config.fast_window,
            config.slow_window,
        );
        fs::write(&chart_path, svg).map_err(|e| MacrossError::Output {
            path: chart_path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!("Saved: {}", chart_path.display());

        Ok(vec![series_path, equity_path, metrics_path, chart_path])
    }
}
