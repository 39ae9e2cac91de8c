//! A small columnar table keyed by a date column.
//!
//! This is the only tabular currency between the feature builder, the
//! trainer, and the reporting paths. Rows are identified by `NaiveDate`;
//! every other column is a named `f64` series of the same length.

use crate::error::{Error, Result};
use chrono::NaiveDate;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataTable {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<f64>)>,
}

impl DataTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Append a column. Replaces an existing column of the same name so a
    /// `predicted` series can be attached to a table that already has one.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.dates.len() {
            return Err(Error::data(format!(
                "column length {} does not match table length {}",
                values.len(),
                self.dates.len()
            )));
        }
        let name = name.into();
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = values;
        } else {
            self.columns.push((name, values));
        }
        Ok(())
    }

    /// Rows with dates inside the inclusive `[start, end]` window.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let keep: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| **d >= start && **d <= end)
            .map(|(i, _)| i)
            .collect();
        let dates = keep.iter().map(|&i| self.dates[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                (name.clone(), keep.iter().map(|&i| values[i]).collect())
            })
            .collect();
        Self { dates, columns }
    }

    /// Row-major design matrix for the named feature columns.
    pub fn matrix(&self, features: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut series = Vec::with_capacity(features.len());
        for name in features {
            let values = self
                .column(name)
                .ok_or_else(|| Error::data(format!("missing feature column `{name}`")))?;
            series.push(values);
        }
        Ok((0..self.len())
            .map(|row| series.iter().map(|col| col[row]).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 8, d).unwrap()
    }

    #[test]
    fn push_and_read_columns() {
        let mut table = DataTable::new(vec![day(1), day(2), day(3)]);
        table.push_column("sales", vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(table.column("sales"), Some(&[1.0, 2.0, 3.0][..]));
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn push_column_rejects_length_mismatch() {
        let mut table = DataTable::new(vec![day(1), day(2)]);
        assert!(table.push_column("sales", vec![1.0]).is_err());
    }

    #[test]
    fn push_column_replaces_same_name() {
        let mut table = DataTable::new(vec![day(1)]);
        table.push_column("predicted", vec![1.0]).unwrap();
        table.push_column("predicted", vec![9.0]).unwrap();
        assert_eq!(table.column("predicted"), Some(&[9.0][..]));
        assert_eq!(table.column_names().count(), 1);
    }

    #[test]
    fn between_is_inclusive() {
        let mut table = DataTable::new(vec![day(1), day(2), day(3), day(4)]);
        table.push_column("x", vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let window = table.between(day(2), day(3));
        assert_eq!(window.dates(), &[day(2), day(3)]);
        assert_eq!(window.column("x"), Some(&[2.0, 3.0][..]));
    }

    #[test]
    fn matrix_is_row_major() {
        let mut table = DataTable::new(vec![day(1), day(2)]);
        table.push_column("a", vec![1.0, 2.0]).unwrap();
        table.push_column("b", vec![10.0, 20.0]).unwrap();
        let m = table
            .matrix(&["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(m, vec![vec![1.0, 10.0], vec![2.0, 20.0]]);
    }
}
