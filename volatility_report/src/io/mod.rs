//! Output boundary for a report run.
//!
//! The pipeline only talks to [`ReportSink`]; [`FileReportSink`] is the
//! implementation that writes a CSV table and PNG charts into one directory.
//! Both writers overwrite existing files without asking.

pub mod chart;
pub mod csv_table;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use price_history::table::PriceTable;
use snafu::{Backtrace, ResultExt, Snafu};
use tracing::{info, warn};

use crate::analysis::SymbolAnalysis;

pub const DEFAULT_TABLE_FILE_NAME: &str = "Historical_ITPM_Prices.csv";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    #[snafu(display("Failed to create output directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("CSV error on {}: {source}", path.display()))]
    Csv {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// A table file that does not have the layout `write_table` produces.
    #[snafu(display("Malformed table file {} (record {record}): {message}", path.display()))]
    Malformed {
        path: PathBuf,
        record: usize,
        message: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Failed to render chart {}: {message}", path.display()))]
    Chart {
        path: PathBuf,
        message: String,
        backtrace: Backtrace,
    },
}

/// Everything needed to draw one symbol's price and volatility chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceVolatilityChart {
    pub symbol: String,
    pub title: String,
    pub prices: Vec<(NaiveDateTime, f64)>,
    pub volatility: Vec<(NaiveDateTime, f64)>,
}

impl From<&SymbolAnalysis> for PriceVolatilityChart {
    fn from(analysis: &SymbolAnalysis) -> Self {
        let mut title = format!("{} Price and Volatility", analysis.symbol);
        if analysis.basis.is_fallback() {
            title.push_str(" (unadjusted close)");
        }
        Self {
            symbol: analysis.symbol.clone(),
            title,
            prices: analysis.prices.clone(),
            volatility: analysis.volatility.defined(),
        }
    }
}

/// Where a report run puts its artifacts.
pub trait ReportSink {
    /// Persists the selected table and returns where it went.
    fn write_table(&mut self, table: &PriceTable) -> Result<PathBuf, SinkError>;

    /// Persists one chart. `Ok(None)` means the chart was skipped because
    /// there is not enough data to draw a line.
    fn write_chart(&mut self, chart: &PriceVolatilityChart) -> Result<Option<PathBuf>, SinkError>;
}

/// Writes into a single output directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    output_dir: PathBuf,
    table_file_name: String,
    chart_size: (u32, u32),
}

impl FileReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            table_file_name: DEFAULT_TABLE_FILE_NAME.to_string(),
            chart_size: (1000, 600),
        }
    }

    pub fn with_table_file_name(mut self, name: impl Into<String>) -> Self {
        self.table_file_name = name.into();
        self
    }

    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = (width, height);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn table_path(&self) -> PathBuf {
        self.output_dir.join(&self.table_file_name)
    }

    /// `{symbol}_price_volatility.png`, with path separators in the symbol replaced.
    pub fn chart_path(&self, symbol: &str) -> PathBuf {
        let safe: String = symbol
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.output_dir.join(format!("{safe}_price_volatility.png"))
    }

    fn ensure_dir(&self) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.output_dir).context(CreateDirSnafu {
            path: self.output_dir.clone(),
        })
    }
}

impl ReportSink for FileReportSink {
    fn write_table(&mut self, table: &PriceTable) -> Result<PathBuf, SinkError> {
        self.ensure_dir()?;
        let path = self.table_path();
        csv_table::write_table(&path, table)?;
        info!(path = %path.display(), rows = table.len(), columns = table.column_count(), "table written");
        Ok(path)
    }

    fn write_chart(&mut self, chart: &PriceVolatilityChart) -> Result<Option<PathBuf>, SinkError> {
        if chart.prices.len() < 2 {
            warn!(symbol = %chart.symbol, points = chart.prices.len(), "not enough price points to chart; skipping");
            return Ok(None);
        }
        self.ensure_dir()?;
        let path = self.chart_path(&chart.symbol);
        let (width, height) = self.chart_size;
        chart::render_chart(&path, chart, width, height)?;
        info!(symbol = %chart.symbol, path = %path.display(), "chart written");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{PriceBasis, ReturnSeries, VolatilitySeries};

    fn analysis(basis: PriceBasis) -> SymbolAnalysis {
        SymbolAnalysis {
            symbol: "AAA".to_string(),
            basis,
            prices: vec![],
            returns: ReturnSeries {
                symbol: "AAA".to_string(),
                points: vec![],
            },
            volatility: VolatilitySeries {
                symbol: "AAA".to_string(),
                window: 20,
                points: vec![],
            },
        }
    }

    #[test]
    fn chart_title_marks_unadjusted_basis() {
        let adjusted = PriceVolatilityChart::from(&analysis(PriceBasis::AdjustedClose));
        assert_eq!(adjusted.title, "AAA Price and Volatility");
        let fallback = PriceVolatilityChart::from(&analysis(PriceBasis::Close));
        assert_eq!(fallback.title, "AAA Price and Volatility (unadjusted close)");
    }

    #[test]
    fn output_paths() {
        let sink = FileReportSink::new("out");
        assert_eq!(sink.table_path(), Path::new("out/Historical_ITPM_Prices.csv"));
        assert_eq!(sink.chart_path("AAPL"), Path::new("out/AAPL_price_volatility.png"));
        assert_eq!(sink.chart_path("A/B"), Path::new("out/A_B_price_volatility.png"));
        let renamed = sink.with_table_file_name("prices.csv");
        assert_eq!(renamed.table_path(), Path::new("out/prices.csv"));
    }

    #[test]
    fn short_chart_is_skipped_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never-created");
        let mut sink = FileReportSink::new(&out);
        let chart = PriceVolatilityChart::from(&analysis(PriceBasis::Close));
        assert!(sink.write_chart(&chart).unwrap().is_none());
        assert!(!out.exists());
    }
}
