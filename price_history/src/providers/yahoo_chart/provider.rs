use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{bar::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidBaseUrlSnafu, ProviderError,
        ProviderInitError, ReqwestSnafu,
        yahoo_chart::{
            params::{construct_params, validate_range},
            response::{ChartResponse, parse_chart_response},
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Connection settings for [`YahooChartProvider`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooChartConfig {
    pub base_url: String,
    /// The endpoint rejects requests without a browser-like user agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for YahooChartConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct YahooChartProvider {
    client: Client,
    base_url: Url,
}

impl YahooChartProvider {
    /// Creates a new provider from its connection settings.
    ///
    /// The chart endpoint is public, so no credentials are involved.
    pub fn new(config: &YahooChartConfig) -> Result<Self, ProviderInitError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            InvalidBaseUrlSnafu {
                url: config.base_url.clone(),
                message: e.to_string(),
            }
            .build()
        })?;
        if base_url.cannot_be_a_base() {
            return InvalidBaseUrlSnafu {
                url: config.base_url.clone(),
                message: "URL cannot carry a path",
            }
            .fail();
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self { client, base_url })
    }

    /// `{base}/v8/finance/chart/{symbol}` with the symbol percent-encoded as
    /// one path segment.
    pub fn chart_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        url
    }
}

#[async_trait]
impl DataProvider for YahooChartProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        validate_range(&params)?;

        let url = self.chart_url(&params.symbol);
        let query = construct_params(&params);
        debug!(symbol = %params.symbol, %url, "requesting chart");

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            // Unknown symbols come back as 404 with a regular chart error body.
            let message = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|r| r.chart.error)
                .map(|e| format!("{}: {}", e.code, e.description))
                .unwrap_or_else(|| format!("HTTP {status}: {body}"));
            return ApiSnafu { message }.fail();
        }

        let body = response.json::<ChartResponse>().await.context(ReqwestSnafu)?;
        parse_chart_response(&params, body)
    }
}
