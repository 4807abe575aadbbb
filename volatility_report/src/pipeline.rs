//! One report run: fetch, select, write the table, chart every symbol.

use std::path::PathBuf;

use price_history::{
    fetch::{SymbolFailure, fetch},
    models::request::TimeSeriesRequest,
    providers::DataProvider,
};
use tracing::{info, warn};

use crate::{
    analysis::{PriceBasis, analyze},
    io::{PriceVolatilityChart, ReportSink, SinkError},
};

pub const NO_DATA_MESSAGE: &str = "No data was retrieved. Please check your inputs and try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartedSymbol {
    pub symbol: String,
    pub basis: PriceBasis,
    /// `None` when the chart was skipped for lack of points.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub table_path: PathBuf,
    pub charts: Vec<ChartedSymbol>,
    /// Symbols that had neither adjusted close nor close.
    pub skipped: Vec<String>,
    pub failures: Vec<SymbolFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing came back from the provider; nothing was written.
    NoData { failures: Vec<SymbolFailure> },
    Completed(RunSummary),
}

/// Runs the whole report for `request`.
///
/// Only sink errors are fatal. Provider failures are collected per symbol and
/// an empty fetch returns [`RunOutcome::NoData`] without touching the sink.
pub async fn run<P, S>(
    provider: &P,
    sink: &mut S,
    request: &TimeSeriesRequest,
) -> Result<RunOutcome, SinkError>
where
    P: DataProvider + ?Sized,
    S: ReportSink + ?Sized,
{
    let report = fetch(provider, request).await;
    if report.is_empty() {
        info!("{NO_DATA_MESSAGE}");
        return Ok(RunOutcome::NoData {
            failures: report.failures,
        });
    }

    let selected = report.table.select_fields(request.fields());
    if selected.is_empty() {
        warn!(fields = ?request.fields(), "none of the requested fields were returned; writing an index-only table");
    }
    let table_path = sink.write_table(&selected)?;

    let mut charts = Vec::new();
    let mut skipped = Vec::new();
    let present = report.table.symbols();
    for symbol in request.symbols() {
        if !present.contains(&symbol.as_str()) {
            continue;
        }
        let Some(analysis) = analyze(&report.table, symbol, request.interval()) else {
            warn!(%symbol, "price data not found; skipping volatility");
            skipped.push(symbol.clone());
            continue;
        };
        let path = sink.write_chart(&PriceVolatilityChart::from(&analysis))?;
        charts.push(ChartedSymbol {
            symbol: symbol.clone(),
            basis: analysis.basis,
            path,
        });
    }

    Ok(RunOutcome::Completed(RunSummary {
        table_path,
        charts,
        skipped,
        failures: report.failures,
    }))
}
