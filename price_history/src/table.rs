//! The aligned multi-symbol price table.
//!
//! A [`PriceTable`] is keyed explicitly by [`ColumnKey`] (symbol, field) and
//! shares one ascending, duplicate-free, zone-less timestamp index between all
//! columns. Cells are `None` where a symbol has no observation on a shared
//! timestamp; nothing is interpolated.
//!
//! Tables are immutable once built. Projections such as
//! [`PriceTable::select_fields`] return new tables.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use thiserror::Error;

use crate::models::{bar::BarSeries, price_field::PriceField};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Timestamp index must be strictly ascending (offending position {position})")]
    UnsortedIndex { position: usize },

    #[error("Column {key} has {actual} cells but the index has {expected} rows")]
    LengthMismatch {
        key: ColumnKey,
        expected: usize,
        actual: usize,
    },
}

/// Two-level column key: which symbol, which price field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub symbol: String,
    pub field: PriceField,
}

impl ColumnKey {
    pub fn new(symbol: impl Into<String>, field: PriceField) -> Self {
        Self {
            symbol: symbol.into(),
            field,
        }
    }
}

impl std::fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.symbol, self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    index: Vec<NaiveDateTime>,
    columns: IndexMap<ColumnKey, Vec<Option<f64>>>,
}

impl PriceTable {
    /// A table with no rows and no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Outer-joins per-symbol series onto one shared timestamp axis.
    ///
    /// The axis is the union of all bar timestamps. Columns are ordered by
    /// series order, then by [`PriceField::ALL`]; a field only gets a column if
    /// the symbol has at least one value for it. When a series repeats a
    /// timestamp the later bar wins.
    pub fn align<I>(series: I) -> Self
    where
        I: IntoIterator<Item = BarSeries>,
    {
        let series: Vec<BarSeries> = series.into_iter().collect();

        let index: Vec<NaiveDateTime> = series
            .iter()
            .flat_map(|s| s.bars.iter().map(|b| b.timestamp))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut columns: IndexMap<ColumnKey, Vec<Option<f64>>> = IndexMap::new();
        for s in &series {
            for field in s.available_fields() {
                let cells = columns
                    .entry(ColumnKey::new(s.symbol.clone(), field))
                    .or_insert_with(|| vec![None; index.len()]);
                for bar in &s.bars {
                    // The index is built from these very timestamps.
                    if let Ok(row) = index.binary_search(&bar.timestamp) {
                        if let Some(value) = bar.value(field) {
                            cells[row] = Some(value);
                        }
                    }
                }
            }
        }

        Self { index, columns }
    }

    /// Builds a table from raw parts, checking the index and column lengths.
    pub fn from_columns(
        index: Vec<NaiveDateTime>,
        columns: IndexMap<ColumnKey, Vec<Option<f64>>>,
    ) -> Result<Self, TableError> {
        if let Some(position) = index.windows(2).position(|w| w[0] >= w[1]) {
            return Err(TableError::UnsortedIndex {
                position: position + 1,
            });
        }
        for (key, cells) in &columns {
            if cells.len() != index.len() {
                return Err(TableError::LengthMismatch {
                    key: key.clone(),
                    expected: index.len(),
                    actual: cells.len(),
                });
            }
        }
        Ok(Self { index, columns })
    }

    /// Projects every symbol onto `fields`, in the given order.
    ///
    /// A requested field a symbol does not have is simply left out; nothing is
    /// substituted for it. The index is kept as is.
    pub fn select_fields(&self, fields: &[PriceField]) -> Self {
        let mut columns = IndexMap::new();
        for symbol in self.symbols() {
            for field in fields {
                let key = ColumnKey::new(symbol, *field);
                if let Some(cells) = self.columns.get(&key) {
                    columns.insert(key, cells.clone());
                }
            }
        }
        Self {
            index: self.index.clone(),
            columns,
        }
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn columns(&self) -> impl Iterator<Item = (&ColumnKey, &[Option<f64>])> {
        self.columns.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn column(&self, symbol: &str, field: PriceField) -> Option<&[Option<f64>]> {
        self.columns
            .get(&ColumnKey::new(symbol, field))
            .map(Vec::as_slice)
    }

    pub fn has_column(&self, symbol: &str, field: PriceField) -> bool {
        self.column(symbol, field).is_some()
    }

    /// Symbols in column order, each listed once.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = Vec::new();
        for key in self.columns.keys() {
            if !symbols.contains(&key.symbol.as_str()) {
                symbols.push(&key.symbol);
            }
        }
        symbols
    }

    /// The non-null observations of one column, in index order.
    pub fn observations(&self, symbol: &str, field: PriceField) -> Option<Vec<(NaiveDateTime, f64)>> {
        let cells = self.column(symbol, field)?;
        Some(
            self.index
                .iter()
                .zip(cells)
                .filter_map(|(ts, cell)| cell.map(|v| (*ts, v)))
                .collect(),
        )
    }

    /// Number of rows on the shared axis.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// No column means no data, whatever the index holds.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
