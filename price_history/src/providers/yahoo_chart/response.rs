use serde::Deserialize;

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{ApiSnafu, ProviderError},
    tz::{exchange_wall_clock, start_of_day},
};

#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub exchange_timezone_name: Option<String>,
    pub gmtoffset: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten().filter(|v| v.is_finite())
}

/// Converts a decoded chart response into a [`BarSeries`].
///
/// Bar times are moved onto the exchange wall clock and truncated to
/// midnight, since every supported cadence is daily or coarser. Bars without
/// any price are dropped. The adjusted close column stays empty when the
/// response carries no `adjclose` indicator.
pub fn parse_chart_response(
    params: &BarsRequestParams,
    response: ChartResponse,
) -> Result<BarSeries, ProviderError> {
    if let Some(error) = response.chart.error {
        return ApiSnafu {
            message: format!("{}: {}", error.code, error.description),
        }
        .fail();
    }

    let result = match response.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => {
            return ApiSnafu {
                message: format!("no chart result for {}", params.symbol),
            }
            .fail();
        }
    };

    let tz_name = result.meta.exchange_timezone_name.as_deref();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut bars: Vec<Bar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &epoch)| {
            let local = exchange_wall_clock(epoch, tz_name, result.meta.gmtoffset)?;
            let bar = Bar {
                timestamp: start_of_day(local),
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i),
                adj_close: at(&adjclose, i),
                volume: at(&quote.volume, i),
            };
            (!bar.is_blank()).then_some(bar)
        })
        .collect();

    bars.sort_by_key(|b| b.timestamp);

    Ok(BarSeries {
        symbol: params.symbol.clone(),
        interval: params.interval,
        bars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{interval::Interval, price_field::PriceField};
    use chrono::NaiveDate;

    fn params() -> BarsRequestParams {
        BarsRequestParams {
            symbol: "AAA".to_string(),
            interval: Interval::Daily,
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        }
    }

    fn decode(body: &str) -> ChartResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn decodes_bars_on_exchange_calendar_days() {
        // 13:30Z on 2024-03-11 and 2024-03-12 are New York opens.
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAA", "exchangeTimezoneName": "America/New_York", "gmtoffset": -14400},
                    "timestamp": [1710163800, 1710250200],
                    "indicators": {
                        "quote": [{
                            "open": [100.0, 101.0],
                            "high": [103.0, 104.0],
                            "low": [99.0, 100.5],
                            "close": [102.0, null],
                            "volume": [1000, 1200]
                        }],
                        "adjclose": [{"adjclose": [101.5, 103.0]}]
                    }
                }],
                "error": null
            }
        }"#;

        let series = parse_chart_response(&params(), decode(body)).unwrap();
        assert_eq!(series.symbol, "AAA");
        assert_eq!(series.bars.len(), 2);
        assert_eq!(
            series.bars[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 3, 11)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(series.bars[0].close, Some(102.0));
        assert_eq!(series.bars[1].close, None);
        assert_eq!(series.bars[1].adj_close, Some(103.0));
        assert_eq!(series.bars[1].volume, Some(1200.0));
    }

    #[test]
    fn missing_adjclose_indicator_leaves_column_empty() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"exchangeTimezoneName": "Europe/Berlin"},
                    "timestamp": [1710144000],
                    "indicators": {"quote": [{"close": [50.0]}]}
                }],
                "error": null
            }
        }"#;

        let series = parse_chart_response(&params(), decode(body)).unwrap();
        assert!(series.has_field(PriceField::Close));
        assert!(!series.has_field(PriceField::AdjustedClose));
    }

    #[test]
    fn blank_bars_are_dropped() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1710144000, 1710230400],
                    "indicators": {"quote": [{"close": [null, 51.0]}]}
                }],
                "error": null
            }
        }"#;

        let series = parse_chart_response(&params(), decode(body)).unwrap();
        assert_eq!(series.bars.len(), 1);
        assert_eq!(series.bars[0].close, Some(51.0));
    }

    #[test]
    fn api_error_is_reported() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;

        let err = parse_chart_response(&params(), decode(body)).unwrap_err();
        match err {
            ProviderError::Api { message, .. } => {
                assert!(message.contains("Not Found"));
                assert!(message.contains("delisted"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn missing_result_is_an_api_error() {
        let body = r#"{"chart": {"result": [], "error": null}}"#;
        let err = parse_chart_response(&params(), decode(body)).unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }));
    }
}
