use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use price_history::{
    fetch::fetch,
    models::{
        bar::{Bar, BarSeries},
        interval::Interval,
        price_field::PriceField,
        request::TimeSeriesRequest,
        request_params::BarsRequestParams,
    },
    providers::{ApiSnafu, DataProvider, ProviderError},
};

/// Serves canned closes per symbol; anything else fails like an unknown ticker.
struct CannedProvider {
    closes: HashMap<&'static str, Vec<f64>>,
}

fn day(n: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, n)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[async_trait]
impl DataProvider for CannedProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let Some(closes) = self.closes.get(params.symbol.as_str()) else {
            return ApiSnafu {
                message: format!("Not Found: {}", params.symbol),
            }
            .fail();
        };
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar {
                timestamp: day(i as u32 + 2),
                open: None,
                high: None,
                low: None,
                close: Some(*c),
                adj_close: Some(*c),
                volume: None,
            })
            .collect();
        Ok(BarSeries {
            symbol: params.symbol,
            interval: params.interval,
            bars,
        })
    }
}

fn request(symbols: &[&str]) -> TimeSeriesRequest {
    TimeSeriesRequest::new(
        symbols.iter().copied(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        Interval::Daily,
        &[PriceField::Close],
    )
    .unwrap()
}

#[tokio::test]
async fn failing_symbol_is_excluded_and_recorded() {
    let provider = CannedProvider {
        closes: HashMap::from([("AAA", vec![100.0, 102.0, 101.0, 105.0])]),
    };

    let report = fetch(&provider, &request(&["AAA", "BBB"])).await;

    assert_eq!(report.table.symbols(), ["AAA"]);
    assert_eq!(
        report.table.column("AAA", PriceField::Close).unwrap(),
        [Some(100.0), Some(102.0), Some(101.0), Some(105.0)]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].symbol, "BBB");
    assert!(report.failures[0].reason.contains("Not Found"));
}

#[tokio::test]
async fn all_symbols_failing_gives_empty_report() {
    let provider = CannedProvider {
        closes: HashMap::new(),
    };
    let report = fetch(&provider, &request(&["XXX", "YYY"])).await;
    assert!(report.is_empty());
    assert_eq!(report.failures.len(), 2);
}

#[tokio::test]
async fn empty_symbol_list_gives_empty_report() {
    let provider = CannedProvider {
        closes: HashMap::from([("AAA", vec![1.0])]),
    };
    let report = fetch(&provider, &request(&[])).await;
    assert!(report.is_empty());
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn symbol_without_bars_counts_as_failure() {
    let provider = CannedProvider {
        closes: HashMap::from([("AAA", vec![]), ("BBB", vec![5.0])]),
    };
    let report = fetch(&provider, &request(&["AAA", "BBB"])).await;
    assert_eq!(report.table.symbols(), ["BBB"]);
    assert_eq!(report.failures[0].symbol, "AAA");
    assert_eq!(report.failures[0].reason, "no data returned");
}

#[tokio::test]
async fn duplicate_symbols_are_fetched_once_in_order() {
    let provider = CannedProvider {
        closes: HashMap::from([("AAA", vec![1.0]), ("BBB", vec![2.0])]),
    };
    let report = fetch(&provider, &request(&["BBB", "AAA", "BBB"])).await;
    assert_eq!(report.table.symbols(), ["BBB", "AAA"]);
}
