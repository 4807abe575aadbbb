//! Portfolio weights from a delimited text export.
//!
//! Exports from brokers and spreadsheets differ in delimiter (`;`, `,`, tab,
//! `|`) and decimal separator (`12,5` vs `12.5`), and often give weights in
//! percent. [`Weights::parse`] accepts all of those and always yields
//! fractions.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

const DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];
const WEIGHT_KEYWORDS: [&str; 4] = ["weight", "gewicht", "gewichtung", "anteil"];
const SYMBOL_KEYWORDS: [&str; 3] = ["ticker", "symbol", "kürzel"];
/// Line count looked at when guessing the delimiter.
const SNIFF_LINES: usize = 10;

#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("Failed to read weights file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Weights file is empty")]
    Empty,

    #[error("Could not detect a column delimiter")]
    NoDelimiter,

    #[error("No weight column found in header {0:?}")]
    NoWeightColumn(Vec<String>),

    #[error("Invalid weight {value:?} on line {line}")]
    BadValue { line: usize, value: String },

    #[error("{0}")]
    Csv(#[from] csv::Error),
}

/// Symbol to weight fraction, in file order. Symbols are upper-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Weights {
    entries: IndexMap<String, f64>,
}

/// Picks the delimiter that splits the first lines into the same number of
/// columns (at least two), preferring more columns.
pub fn detect_delimiter(text: &str) -> Option<u8> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(SNIFF_LINES)
        .collect();
    let first = lines.first()?;

    let consistent = DELIMITERS
        .iter()
        .copied()
        .filter_map(|d| {
            let columns = first.bytes().filter(|b| *b == d).count() + 1;
            let same = lines
                .iter()
                .all(|l| l.bytes().filter(|b| *b == d).count() + 1 == columns);
            (columns >= 2 && same).then_some((d, columns))
        })
        .max_by_key(|(_, columns)| *columns)
        .map(|(d, _)| d);

    // Ragged exports still beat a single column.
    consistent.or_else(|| {
        DELIMITERS
            .iter()
            .copied()
            .map(|d| (d, first.bytes().filter(|b| *b == d).count()))
            .filter(|(_, n)| *n > 0)
            .max_by_key(|(_, n)| *n)
            .map(|(d, _)| d)
    })
}

/// Parses `12,5`, `12.5`, `1.234,5`, `1,234.5` and `12,5 %`.
///
/// Returns the number and whether it carried a percent sign.
pub fn parse_weight_value(raw: &str) -> Option<(f64, bool)> {
    let trimmed = raw.trim();
    let percent = trimmed.ends_with('%');
    let digits: String = trimmed
        .trim_end_matches('%')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();
    if digits.is_empty() {
        return None;
    }

    let normalized = match (digits.rfind(','), digits.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => digits.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => digits.replace(',', ""),
        (Some(_), None) => digits.replace(',', "."),
        _ => digits,
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| (v, percent))
}

fn header_matches(header: &str, keywords: &[&str]) -> bool {
    let lower = header.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

impl Weights {
    pub fn parse(text: &str) -> Result<Self, WeightsError> {
        let text = text.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Err(WeightsError::Empty);
        }
        let delimiter = detect_delimiter(text).ok_or(WeightsError::NoDelimiter)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let weight_col = headers
            .iter()
            .position(|h| header_matches(h, &WEIGHT_KEYWORDS))
            .ok_or_else(|| WeightsError::NoWeightColumn(headers.clone()))?;
        let symbol_col = headers
            .iter()
            .position(|h| header_matches(h, &SYMBOL_KEYWORDS))
            .or_else(|| (0..headers.len()).find(|i| *i != weight_col))
            .ok_or_else(|| WeightsError::NoWeightColumn(headers.clone()))?;

        let mut entries: IndexMap<String, f64> = IndexMap::new();
        let mut any_percent = false;
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            let symbol = record.get(symbol_col).unwrap_or_default();
            let raw = record.get(weight_col).unwrap_or_default();
            if symbol.is_empty() && raw.is_empty() {
                continue;
            }
            if symbol.is_empty() {
                debug!(line, "weight row without symbol ignored");
                continue;
            }
            let (value, percent) = parse_weight_value(raw).ok_or_else(|| WeightsError::BadValue {
                line,
                value: raw.to_string(),
            })?;
            any_percent |= percent;
            // A symbol held in several accounts adds up.
            *entries.entry(symbol.to_uppercase()).or_insert(0.0) += value;
        }

        let total: f64 = entries.values().sum();
        if any_percent || total > 1.5 {
            entries.values_mut().for_each(|v| *v /= 100.0);
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, WeightsError> {
        let bytes = std::fs::read(path)?;
        Self::parse(&String::from_utf8_lossy(&bytes))
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries.get(&symbol.trim().to_uppercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
