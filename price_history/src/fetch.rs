//! Per-symbol retrieval with failure isolation.
//!
//! [`fetch`] calls the provider once per requested symbol, one after the
//! other, in request order. A failing symbol never aborts the run: it is
//! logged, recorded in [`FetchReport::failures`] and left out of the table.

use tracing::{info, warn};

use crate::{
    models::request::TimeSeriesRequest,
    providers::DataProvider,
    table::PriceTable,
};

/// Why one symbol is missing from the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFailure {
    pub symbol: String,
    pub reason: String,
}

/// The aligned table plus the symbols that could not be retrieved.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub table: PriceTable,
    pub failures: Vec<SymbolFailure>,
}

impl FetchReport {
    /// `true` when no symbol produced data. Callers treat this as "no data",
    /// not as an error.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Retrieves every symbol of `request` and aligns the survivors.
pub async fn fetch<P>(provider: &P, request: &TimeSeriesRequest) -> FetchReport
where
    P: DataProvider + ?Sized,
{
    let mut retrieved = Vec::with_capacity(request.symbols().len());
    let mut failures = Vec::new();

    for symbol in request.symbols() {
        info!(%symbol, interval = %request.interval(), "fetching price history");

        match provider.fetch_bars(request.bars_params(symbol)).await {
            Ok(series) if series.is_empty() => {
                warn!(%symbol, "provider returned no bars; excluding symbol");
                failures.push(SymbolFailure {
                    symbol: symbol.clone(),
                    reason: "no data returned".to_string(),
                });
            }
            Ok(series) => {
                let fields: Vec<&str> = series.available_fields().iter().map(|f| f.name()).collect();
                info!(%symbol, bars = series.bars.len(), ?fields, "available fields");
                retrieved.push(series);
            }
            Err(e) => {
                warn!(%symbol, error = %e, "fetch failed; excluding symbol");
                failures.push(SymbolFailure {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    FetchReport {
        table: PriceTable::align(retrieved),
        failures,
    }
}
