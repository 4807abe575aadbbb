//! `stock-summary` configuration, loaded from TOML.
//!
//! Credentials are never part of this file; the binary reads them from the
//! environment.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_URL: &str = "https://finviz.com/quote.ashx?t={ticker}&ty=c&ta=1&p=d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalBackendConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "deepseek-r1:7b".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostedBackendConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for HostedBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregatorBackendConfig {
    pub base_url: String,
    pub model: String,
    /// Sent as `HTTP-Referer`.
    pub referer: String,
    /// Sent as `X-Title`.
    pub title: String,
}

impl Default for AggregatorBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "anthropic/claude-sonnet-4".to_string(),
            referer: "http://localhost".to_string(),
            title: "stock-summary".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommentaryConfig {
    pub tickers: Vec<String>,
    pub output_dir: PathBuf,
    pub overview_file: String,
    pub portfolio_file: String,
    /// Quote page URL with a `{ticker}` placeholder.
    pub page_url: String,
    pub user_agent: String,
    /// Language the model is asked to answer in.
    pub language: String,
    pub timeout_secs: u64,
    pub weights_file: Option<PathBuf>,
    pub local: LocalBackendConfig,
    pub hosted: HostedBackendConfig,
    pub aggregator: AggregatorBackendConfig,
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            output_dir: PathBuf::from("."),
            overview_file: "overview.html".to_string(),
            portfolio_file: "portfolio_risk.html".to_string(),
            page_url: DEFAULT_PAGE_URL.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            language: "German".to_string(),
            timeout_secs: 120,
            weights_file: None,
            local: LocalBackendConfig::default(),
            hosted: HostedBackendConfig::default(),
            aggregator: AggregatorBackendConfig::default(),
        }
    }
}

impl CommentaryConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse commentary config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&s).with_context(|| format!("Invalid config file {}", path.display()))
    }
}
