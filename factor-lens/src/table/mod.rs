//! Canonical in-memory representation of a date-indexed factor table.
//!
//! A [`Table`] is an immutable snapshot: every transformation produces a new
//! `Table`, so multiple consumers can hold independent views safely. The
//! acquisition collaborator is responsible for normalizing whatever the
//! upstream service speaks into this one schema before handing it over; the
//! core never guesses among alternate column spellings.

pub mod filter;

use crate::error::LensError;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::ops::Range;

/// Immutable snapshot of numeric factor columns over a shared date axis.
///
/// Invariants enforced at construction: the date axis is strictly ascending
/// (no duplicates) and every column has exactly one value slot per date.
/// Missing cells are `None`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Table {
    dates: Vec<NaiveDate>,
    columns: IndexMap<SmolStr, Vec<Option<f64>>>,
}

impl Table {
    /// Construct a table, validating the date axis and column shapes.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: IndexMap<SmolStr, Vec<Option<f64>>>,
    ) -> Result<Self, LensError> {
        if let Some(window) = dates.windows(2).find(|window| window[0] >= window[1]) {
            return Err(LensError::invalid_input(format!(
                "table date axis is not strictly ascending: {} followed by {}",
                window[0], window[1]
            )));
        }

        for (name, values) in &columns {
            if values.len() != dates.len() {
                return Err(LensError::invalid_input(format!(
                    "column {} has {} values for {} dates",
                    name,
                    values.len(),
                    dates.len()
                )));
            }
        }

        Ok(Self { dates, columns })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The date axis, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// First date in the table, if any.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last date in the table, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Column names in ingestion order.
    pub fn column_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.columns.keys()
    }

    /// Values of a column, one slot per date.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// The reference-asset price column, identified by its `_price` suffix
    /// (e.g. `btc_price`).
    pub fn reference_column(&self) -> Option<&SmolStr> {
        self.columns
            .keys()
            .find(|name| name.to_lowercase().ends_with("_price"))
    }

    /// Factor columns: every column except the reference price series.
    pub fn factor_columns(&self) -> Vec<SmolStr> {
        self.columns
            .keys()
            .filter(|name| !name.to_lowercase().ends_with("_price"))
            .cloned()
            .collect()
    }

    pub(crate) fn is_date_sorted(&self) -> bool {
        self.dates.windows(2).all(|window| window[0] < window[1])
    }

    /// New table holding the rows of `range`, preserving column order.
    pub(crate) fn slice_rows(&self, range: Range<usize>) -> Table {
        let dates = self.dates[range.clone()].to_vec();
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| (name.clone(), values[range.clone()].to_vec()))
            .collect();
        Table { dates, columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample_table() -> Table {
        let mut columns = IndexMap::new();
        columns.insert(
            SmolStr::new("btc_price"),
            vec![Some(42_000.0), Some(43_100.0), Some(41_800.0)],
        );
        columns.insert(
            SmolStr::new("funding"),
            vec![Some(0.01), None, Some(-0.002)],
        );
        Table::new(
            vec![date("2023-02-01"), date("2023-02-02"), date("2023-02-03")],
            columns,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_unsorted_dates() {
        let result = Table::new(
            vec![date("2023-02-02"), date("2023-02-01")],
            IndexMap::new(),
        );
        assert!(matches!(result, Err(LensError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_dates() {
        let result = Table::new(
            vec![date("2023-02-01"), date("2023-02-01")],
            IndexMap::new(),
        );
        assert!(matches!(result, Err(LensError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let mut columns = IndexMap::new();
        columns.insert(SmolStr::new("funding"), vec![Some(0.01)]);
        let result = Table::new(vec![date("2023-02-01"), date("2023-02-02")], columns);
        assert!(matches!(result, Err(LensError::InvalidInput(_))));
    }

    #[test]
    fn test_reference_and_factor_columns() {
        let table = sample_table();
        assert_eq!(table.reference_column().map(SmolStr::as_str), Some("btc_price"));
        assert_eq!(table.factor_columns(), vec![SmolStr::new("funding")]);
    }

    #[test]
    fn test_empty_table_accessors() {
        let table = Table::default();
        assert!(table.is_empty());
        assert_eq!(table.first_date(), None);
        assert_eq!(table.last_date(), None);
        assert_eq!(table.reference_column(), None);
        assert!(table.factor_columns().is_empty());
    }

    #[test]
    fn test_slice_rows_preserves_column_order() {
        let table = sample_table();
        let sliced = table.slice_rows(1..3);
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.first_date(), Some(date("2023-02-02")));
        let names: Vec<&SmolStr> = sliced.column_names().collect();
        assert_eq!(names, vec!["btc_price", "funding"]);
        assert_eq!(sliced.column("funding").unwrap(), &[None, Some(-0.002)]);
    }
}
