//! The validated request a price history run is driven by.

use chrono::NaiveDate;
use indexmap::IndexSet;
use thiserror::Error;

use crate::models::{interval::Interval, price_field::PriceField, request_params::BarsRequestParams};

/// Date format accepted on the command line (`DD.MM.YYYY`).
pub const INPUT_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid date {input:?}: expected DD.MM.YYYY")]
    InvalidDate { input: String },

    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("At least one price field must be requested")]
    NoFields,
}

/// Parses a `DD.MM.YYYY` date.
pub fn parse_input_date(input: &str) -> Result<NaiveDate, RequestError> {
    NaiveDate::parse_from_str(input.trim(), INPUT_DATE_FORMAT).map_err(|_| {
        RequestError::InvalidDate {
            input: input.to_string(),
        }
    })
}

/// Symbols, date range, cadence and price fields of one run.
///
/// Construction enforces `start <= end`, removes duplicate symbols and fields
/// while keeping the first occurrence, and drops blank symbols. The symbol
/// order is the iteration order for fetching and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesRequest {
    symbols: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
    interval: Interval,
    fields: Vec<PriceField>,
}

impl TimeSeriesRequest {
    pub fn new<I, S>(
        symbols: I,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
        fields: &[PriceField],
    ) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if start > end {
            return Err(RequestError::InvertedRange { start, end });
        }

        let fields: IndexSet<PriceField> = fields.iter().copied().collect();
        if fields.is_empty() {
            return Err(RequestError::NoFields);
        }

        let symbols: IndexSet<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            symbols: symbols.into_iter().collect(),
            start,
            end,
            interval,
            fields: fields.into_iter().collect(),
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn fields(&self) -> &[PriceField] {
        &self.fields
    }

    /// Provider parameters for one symbol of this request.
    pub fn bars_params(&self, symbol: &str) -> BarsRequestParams {
        BarsRequestParams {
            symbol: symbol.to_string(),
            interval: self.interval,
            start: self.start,
            end: self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_day_month_year() {
        assert_eq!(parse_input_date("01.02.2024").unwrap(), date(2024, 2, 1));
        assert_eq!(parse_input_date(" 31.12.2023 ").unwrap(), date(2023, 12, 31));
    }

    #[test]
    fn rejects_iso_dates() {
        assert_eq!(
            parse_input_date("2024-02-01"),
            Err(RequestError::InvalidDate {
                input: "2024-02-01".to_string()
            })
        );
    }

    #[test]
    fn symbols_are_deduplicated_in_order() {
        let request = TimeSeriesRequest::new(
            ["MSFT", "AAPL", "MSFT", " ", "GOOG", "AAPL"],
            date(2024, 1, 1),
            date(2024, 2, 1),
            Interval::Daily,
            &[PriceField::Close, PriceField::Close, PriceField::Open],
        )
        .unwrap();
        assert_eq!(request.symbols(), ["MSFT", "AAPL", "GOOG"]);
        assert_eq!(request.fields(), [PriceField::Close, PriceField::Open]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = TimeSeriesRequest::new(
            ["AAPL"],
            date(2024, 2, 1),
            date(2024, 1, 1),
            Interval::Weekly,
            &[PriceField::Close],
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::InvertedRange { .. }));
    }

    #[test]
    fn same_day_range_is_allowed() {
        let request = TimeSeriesRequest::new(
            ["AAPL"],
            date(2024, 1, 5),
            date(2024, 1, 5),
            Interval::Daily,
            &[PriceField::Close],
        );
        assert!(request.is_ok());
    }

    #[test]
    fn empty_symbol_list_is_a_valid_request() {
        let request = TimeSeriesRequest::new(
            Vec::<String>::new(),
            date(2024, 1, 1),
            date(2024, 2, 1),
            Interval::Daily,
            &[PriceField::Close],
        )
        .unwrap();
        assert!(request.symbols().is_empty());
    }

    #[test]
    fn bars_params_carry_range_and_interval() {
        let request = TimeSeriesRequest::new(
            ["AAPL"],
            date(2024, 1, 1),
            date(2024, 2, 1),
            Interval::Monthly,
            &[PriceField::Close],
        )
        .unwrap();
        let params = request.bars_params("AAPL");
        assert_eq!(params.symbol, "AAPL");
        assert_eq!(params.interval, Interval::Monthly);
        assert_eq!(params.start, date(2024, 1, 1));
        assert_eq!(params.end, date(2024, 2, 1));
    }
}
