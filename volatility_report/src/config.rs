//! Run configuration loaded from TOML.
//!
//! Every key is optional:
//!
//! ```toml
//! output_dir = "reports"
//! table_file_name = "Historical_ITPM_Prices.csv"
//!
//! [chart]
//! width = 1200
//! height = 700
//!
//! [provider]
//! base_url = "https://query1.finance.yahoo.com"
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use price_history::providers::yahoo_chart::YahooChartConfig;
use serde::{Deserialize, Serialize};

use crate::io::{DEFAULT_TABLE_FILE_NAME, FileReportSink};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub table_file_name: String,
    pub chart: ChartConfig,
    pub provider: YahooChartConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            table_file_name: DEFAULT_TABLE_FILE_NAME.to_string(),
            chart: ChartConfig::default(),
            provider: YahooChartConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse report config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&s).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// The file sink described by this configuration.
    pub fn sink(&self) -> FileReportSink {
        FileReportSink::new(&self.output_dir)
            .with_table_file_name(&self.table_file_name)
            .with_chart_size(self.chart.width, self.chart.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = ReportConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ReportConfig::default());
        assert_eq!(cfg.sink().table_path(), Path::new("output/Historical_ITPM_Prices.csv"));
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let cfg = ReportConfig::from_toml_str(
            r#"
            output_dir = "reports"

            [chart]
            width = 1200

            [provider]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("reports"));
        assert_eq!(cfg.chart.width, 1200);
        assert_eq!(cfg.chart.height, 600);
        assert_eq!(cfg.provider.timeout_secs, 5);
        assert_eq!(cfg.provider.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ReportConfig::from_toml_str("outptu_dir = \"x\"").is_err());
    }
}
