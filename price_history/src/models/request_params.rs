use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::interval::Interval;

/// Parameters for one provider call: a single symbol over a date range.
///
/// This struct is vendor-agnostic and is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations. The
/// fetcher builds one of these per requested symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Symbol to request (e.g., `"AAPL"`, `"PBR.A"`).
    pub symbol: String,

    /// Sampling cadence of the bars.
    pub interval: Interval,

    /// First day of the requested range (inclusive).
    pub start: NaiveDate,

    /// End of the requested range (exclusive).
    ///
    /// Providers should return bars strictly before this day.
    pub end: NaiveDate,
}
