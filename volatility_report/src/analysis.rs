//! Simple returns, rolling volatility and the choice of price basis.
//!
//! Every series here is computed on one symbol's own non-null observations,
//! never on the shared table axis, so calendar gaps introduced by other
//! symbols do not turn into missing returns.

use chrono::NaiveDateTime;
use price_history::{
    models::{interval::Interval, price_field::PriceField},
    table::PriceTable,
};
use tracing::warn;

/// Window used for any cadence without a dedicated mapping.
pub const DEFAULT_WINDOW: usize = 20;

/// Rolling window length for a cadence: 20 trading days, 4 weeks or 12 months.
pub fn window_for_interval(interval: Interval) -> usize {
    window_for_code(interval.provider_code())
}

/// Same mapping keyed by provider code; unknown codes get [`DEFAULT_WINDOW`].
pub fn window_for_code(code: &str) -> usize {
    match code {
        "1d" => 20,
        "1wk" => 4,
        "1mo" => 12,
        _ => DEFAULT_WINDOW,
    }
}

/// One value per observation; `None` where the value is undefined.
pub type Points = Vec<(NaiveDateTime, Option<f64>)>;

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub symbol: String,
    pub points: Points,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolatilitySeries {
    pub symbol: String,
    pub window: usize,
    pub points: Points,
}

impl VolatilitySeries {
    /// The defined values only, in time order.
    pub fn defined(&self) -> Vec<(NaiveDateTime, f64)> {
        self.points
            .iter()
            .filter_map(|(ts, v)| v.map(|v| (*ts, v)))
            .collect()
    }
}

/// `r[t] = p[t] / p[t-1] - 1`; the first point and non-finite ratios are undefined.
pub fn compute_returns(symbol: &str, prices: &[(NaiveDateTime, f64)]) -> ReturnSeries {
    let mut points = Vec::with_capacity(prices.len());
    for (i, (ts, price)) in prices.iter().enumerate() {
        let value = match i.checked_sub(1).map(|j| prices[j].1) {
            Some(prev) => Some(price / prev - 1.0).filter(|r| r.is_finite()),
            None => None,
        };
        points.push((*ts, value));
    }
    ReturnSeries {
        symbol: symbol.to_string(),
        points,
    }
}

/// Sample standard deviation (n - 1 denominator). Needs at least two values.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((ss / (n - 1.0)).sqrt())
}

/// Rolling sample standard deviation of `returns` scaled by `sqrt(window)`.
///
/// A point is defined only when the `window` returns ending at it are all
/// defined. Windows shorter than two never produce a value.
pub fn compute_volatility(returns: &ReturnSeries, window: usize) -> VolatilitySeries {
    let scale = (window as f64).sqrt();
    let points = returns
        .points
        .iter()
        .enumerate()
        .map(|(t, (ts, _))| {
            let value = if window < 2 || t + 1 < window {
                None
            } else {
                returns.points[t + 1 - window..=t]
                    .iter()
                    .map(|(_, r)| *r)
                    .collect::<Option<Vec<f64>>>()
                    .and_then(|w| sample_std(&w))
                    .map(|sd| sd * scale)
            };
            (*ts, value)
        })
        .collect();

    VolatilitySeries {
        symbol: returns.symbol.clone(),
        window,
        points,
    }
}

/// Which column the analysis ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBasis {
    AdjustedClose,
    /// Fallback when the provider delivered no adjusted close.
    Close,
}

impl PriceBasis {
    pub fn field(self) -> PriceField {
        match self {
            PriceBasis::AdjustedClose => PriceField::AdjustedClose,
            PriceBasis::Close => PriceField::Close,
        }
    }

    pub fn is_fallback(self) -> bool {
        self == PriceBasis::Close
    }
}

/// Adjusted close if the symbol has it, else close, else nothing.
pub fn price_basis(table: &PriceTable, symbol: &str) -> Option<PriceBasis> {
    [PriceBasis::AdjustedClose, PriceBasis::Close]
        .into_iter()
        .find(|b| table.has_column(symbol, b.field()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub basis: PriceBasis,
    pub prices: Vec<(NaiveDateTime, f64)>,
    pub returns: ReturnSeries,
    pub volatility: VolatilitySeries,
}

/// Runs the returns and volatility pass for one symbol of the full table.
///
/// Returns `None` when the symbol has neither adjusted close nor close.
pub fn analyze(table: &PriceTable, symbol: &str, interval: Interval) -> Option<SymbolAnalysis> {
    let basis = price_basis(table, symbol)?;
    if basis.is_fallback() {
        warn!(%symbol, "no adjusted close available; using close");
    }
    let prices = table.observations(symbol, basis.field())?;
    let returns = compute_returns(symbol, &prices);
    let volatility = compute_volatility(&returns, window_for_interval(interval));

    Some(SymbolAnalysis {
        symbol: symbol.to_string(),
        basis,
        prices,
        returns,
        volatility,
    })
}
