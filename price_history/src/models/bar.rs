//! Canonical in-memory representation of one observation (OHLC + adjusted close).
//!
//! This struct is the standard output of every [`DataProvider`](crate::providers::DataProvider)
//! implementation. Timestamps are naive: providers convert to the exchange's
//! wall clock and drop the zone before handing bars out, so bars of different
//! symbols can be compared directly.

use chrono::NaiveDateTime;

use crate::models::{interval::Interval, price_field::PriceField};

/// A single bar for a given timestamp.
///
/// Every price is optional because providers emit `null` for sessions where a
/// value is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Zone-less timestamp of the bar.
    pub timestamp: NaiveDateTime,

    /// Opening price.
    pub open: Option<f64>,

    /// Highest price during the bar interval.
    pub high: Option<f64>,

    /// Lowest price during the bar interval.
    pub low: Option<f64>,

    /// Closing price.
    pub close: Option<f64>,

    /// Close adjusted for dividends and splits. Not all providers supply this.
    pub adj_close: Option<f64>,

    /// Volume traded during the bar interval.
    pub volume: Option<f64>,
}

impl Bar {
    /// Value of one price column.
    pub fn value(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::AdjustedClose => self.adj_close,
        }
    }

    /// `true` if none of the price columns carry a value.
    pub fn is_blank(&self) -> bool {
        PriceField::ALL.iter().all(|f| self.value(*f).is_none())
    }
}

/// Represents a complete set of bars for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`Interval`], making the data set self-describing.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL", "BRK-B").
    pub symbol: String,
    /// The sampling cadence of the bars.
    pub interval: Interval,
    /// The bars in ascending timestamp order.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// A field is available when at least one bar carries a value for it.
    pub fn has_field(&self, field: PriceField) -> bool {
        self.bars.iter().any(|b| b.value(field).is_some())
    }

    /// Fields available for this symbol, in [`PriceField::ALL`] order.
    pub fn available_fields(&self) -> Vec<PriceField> {
        PriceField::ALL
            .into_iter()
            .filter(|f| self.has_field(*f))
            .collect()
    }
}
