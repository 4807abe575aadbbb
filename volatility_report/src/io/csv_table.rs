//! CSV layout of a [`PriceTable`].
//!
//! ```text
//! Date,AAA Close,AAA Adj Close,BBB Close
//! 2024-01-02 00:00:00,100,99.5,
//! ```
//!
//! A table holding a single symbol drops the symbol from its headers. Null
//! cells are empty and values use the shortest representation that parses
//! back to the same `f64`.

use std::path::Path;

use chrono::NaiveDateTime;
use csv::{Reader, Writer};
use indexmap::IndexMap;
use price_history::{
    models::price_field::PriceField,
    table::{ColumnKey, PriceTable},
};
use snafu::ResultExt;

use crate::io::{CsvSnafu, MalformedSnafu, SinkError};

pub const INDEX_HEADER: &str = "Date";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn header(key: &ColumnKey, single_symbol: bool) -> String {
    if single_symbol {
        key.field.to_string()
    } else {
        key.to_string()
    }
}

pub fn write_table(path: &Path, table: &PriceTable) -> Result<(), SinkError> {
    let mut writer = Writer::from_path(path).context(CsvSnafu { path })?;
    let single_symbol = table.symbols().len() == 1;

    let mut headers = vec![INDEX_HEADER.to_string()];
    headers.extend(table.columns().map(|(key, _)| header(key, single_symbol)));
    writer.write_record(&headers).context(CsvSnafu { path })?;

    let columns: Vec<&[Option<f64>]> = table.columns().map(|(_, cells)| cells).collect();
    for (row, ts) in table.index().iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(ts.format(TIMESTAMP_FORMAT).to_string());
        record.extend(
            columns
                .iter()
                .map(|cells| cells[row].map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record).context(CsvSnafu { path })?;
    }

    writer
        .flush()
        .map_err(csv::Error::from)
        .context(CsvSnafu { path })
}

/// Splits a `"{symbol} {field}"` header back into its key.
///
/// The symbol is everything before the first space after which a field name
/// follows.
fn parse_header(header: &str) -> Option<ColumnKey> {
    header.match_indices(' ').find_map(|(i, _)| {
        let (symbol, rest) = (&header[..i], &header[i + 1..]);
        rest.parse::<PriceField>()
            .ok()
            .filter(|_| !symbol.is_empty())
            .map(|field| ColumnKey::new(symbol, field))
    })
}

/// Keys of a single-symbol file, whose headers are all bare, distinct fields.
///
/// Returns `None` when any header is not a bare field or a field repeats, in
/// which case every header carries its symbol.
fn bare_field_keys<'a>(
    headers: impl Iterator<Item = &'a str>,
    default_symbol: &str,
) -> Option<Vec<ColumnKey>> {
    let mut keys: Vec<ColumnKey> = Vec::new();
    for h in headers {
        let field = h.parse::<PriceField>().ok()?;
        if keys.iter().any(|k| k.field == field) {
            return None;
        }
        keys.push(ColumnKey::new(default_symbol, field));
    }
    Some(keys)
}

/// Reads a file produced by [`write_table`].
///
/// `default_symbol` names the symbol of single-symbol files, whose headers
/// carry only the field.
pub fn read_table(path: &Path, default_symbol: &str) -> Result<PriceTable, SinkError> {
    let mut reader = Reader::from_path(path).context(CsvSnafu { path })?;

    let headers = reader.headers().context(CsvSnafu { path })?.clone();
    if headers.get(0) != Some(INDEX_HEADER) {
        return MalformedSnafu {
            path,
            record: 0usize,
            message: format!("first column must be {INDEX_HEADER:?}"),
        }
        .fail();
    }

    let keys = match bare_field_keys(headers.iter().skip(1), default_symbol) {
        Some(keys) => keys,
        None => {
            let mut keys = Vec::with_capacity(headers.len().saturating_sub(1));
            for h in headers.iter().skip(1) {
                match parse_header(h) {
                    Some(key) => keys.push(key),
                    None => {
                        return MalformedSnafu {
                            path,
                            record: 0usize,
                            message: format!("unrecognised column header {h:?}"),
                        }
                        .fail();
                    }
                }
            }
            keys
        }
    };

    let mut index = Vec::new();
    let mut cells: Vec<Vec<Option<f64>>> = vec![Vec::new(); keys.len()];
    for (n, result) in reader.records().enumerate() {
        let record = result.context(CsvSnafu { path })?;
        let malformed = |message: String| {
            MalformedSnafu {
                path,
                record: n + 1,
                message,
            }
            .build()
        };

        let raw_ts = record.get(0).unwrap_or_default();
        let ts = NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT)
            .map_err(|e| malformed(format!("bad timestamp {raw_ts:?}: {e}")))?;
        index.push(ts);

        for (col, column) in cells.iter_mut().enumerate() {
            let raw = record.get(col + 1).unwrap_or_default().trim();
            let value = if raw.is_empty() {
                None
            } else {
                Some(
                    raw.parse::<f64>()
                        .map_err(|e| malformed(format!("bad number {raw:?}: {e}")))?,
                )
            };
            column.push(value);
        }
    }

    let columns: IndexMap<ColumnKey, Vec<Option<f64>>> = keys.into_iter().zip(cells).collect();
    PriceTable::from_columns(index, columns).map_err(|e| {
        MalformedSnafu {
            path,
            record: 0usize,
            message: e.to_string(),
        }
        .build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_round_trip() {
        assert_eq!(
            parse_header("AAA Adj Close"),
            Some(ColumnKey::new("AAA", PriceField::AdjustedClose))
        );
        assert_eq!(parse_header("BRK.B Close"), Some(ColumnKey::new("BRK.B", PriceField::Close)));
        assert_eq!(parse_header("ADJ Close"), Some(ColumnKey::new("ADJ", PriceField::Close)));
        assert_eq!(parse_header("AAA Volume"), None);
        assert_eq!(parse_header("Close"), None);
    }

    #[test]
    fn bare_headers_only_when_every_column_is_a_distinct_field() {
        assert_eq!(
            bare_field_keys(["Close", "Adj Close"].into_iter(), "X"),
            Some(vec![
                ColumnKey::new("X", PriceField::Close),
                ColumnKey::new("X", PriceField::AdjustedClose),
            ])
        );
        assert_eq!(bare_field_keys(["ADJ Close", "BBB Close"].into_iter(), "X"), None);
        assert_eq!(bare_field_keys(["ADJ Close", "adj Close"].into_iter(), "X"), None);
    }
}
