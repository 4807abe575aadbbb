use chrono::{Duration, NaiveDate};
use volatility_report::io::{FileReportSink, PriceVolatilityChart, ReportSink};

#[test]
#[ignore]
fn renders_png_next_to_the_table() {
    // Text rendering needs system fonts; run with `--ignored` where they exist.
    let dir = tempfile::tempdir().unwrap();
    let origin = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let prices: Vec<_> = (0..40)
        .map(|i| (origin + Duration::days(i), 100.0 + (i as f64).sin() * 5.0))
        .collect();
    let volatility: Vec<_> = prices[20..].iter().map(|(ts, _)| (*ts, 0.05)).collect();
    let chart = PriceVolatilityChart {
        symbol: "AAA".to_string(),
        title: "AAA Price and Volatility".to_string(),
        prices,
        volatility,
    };

    let mut sink = FileReportSink::new(dir.path()).with_chart_size(640, 400);
    let path = sink.write_chart(&chart).unwrap().unwrap();
    assert!(path.ends_with("AAA_price_volatility.png"));
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
}
