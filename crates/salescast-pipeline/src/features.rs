//! Feature derivation over the merged daily records.
//!
//! Produces the fixed rectangular schema the models train on: the macro
//! covariate, four holiday indicators, three calendar columns, the
//! promotion count, and (for modeling tables) the sales target.

use crate::dataset::{DailyRecord, FeatureStore};
use chrono::{Datelike, NaiveDate};
use salescast_core::{DataTable, Error, ModelParams, Result};

pub const COL_OIL: &str = "dcoilwtico";
pub const COL_NATIONAL_EVENT: &str = "is_national_event";
pub const COL_NATIONAL_HOLIDAY: &str = "is_national_holiday";
pub const COL_LOCAL_HOLIDAY: &str = "is_local_holiday";
pub const COL_REGIONAL_HOLIDAY: &str = "is_regional_holiday";
pub const COL_DAY_OF_MONTH: &str = "day_of_month";
pub const COL_DAY_OF_WEEK: &str = "day_of_week";
pub const COL_MONTH_OF_YEAR: &str = "month_of_year";
pub const COL_ONPROMOTION: &str = "onpromotion";
pub const COL_SALES: &str = "sales";

/// An immutable snapshot of the merged daily series, ready to be sliced
/// into modeling or inference tables. Construct one per use; there is no
/// shared state between builders.
pub struct FeatureBuilder {
    records: Vec<DailyRecord>,
    oil_mean: f64,
}

impl FeatureBuilder {
    pub fn from_store(store: &FeatureStore) -> Result<Self> {
        Ok(Self::from_records(store.daily_records()?))
    }

    pub fn from_records(records: Vec<DailyRecord>) -> Self {
        // Mean over every present reading, computed once over the full
        // series so train/valid splits see the same fill value.
        let present: Vec<f64> = records.iter().filter_map(|r| r.oil).collect();
        let oil_mean = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };
        Self { records, oil_mean }
    }

    /// Training and validation tables for the experiment's date windows.
    ///
    /// The windows are caller-supplied and intentionally not checked for
    /// overlap; overlapping ranges leak validation rows into training.
    pub fn model_tables(&self, params: &ModelParams) -> Result<(DataTable, DataTable)> {
        let full = self.table(true)?;
        let train = full.between(params.train_start_dt, params.train_end_dt);
        let valid = full.between(params.validation_start_dt, params.validation_end_dt);
        if train.is_empty() {
            return Err(Error::data("no rows in the training date range"));
        }
        if valid.is_empty() {
            return Err(Error::data("no rows in the validation date range"));
        }
        Ok((train, valid))
    }

    /// Feature table without the target column, for serving-side prediction.
    pub fn inference_table(&self, start: NaiveDate, end: NaiveDate) -> Result<DataTable> {
        let table = self.table(false)?.between(start, end);
        if table.is_empty() {
            return Err(Error::not_found(format!(
                "no feature rows between {start} and {end}"
            )));
        }
        Ok(table)
    }

    fn table(&self, include_target: bool) -> Result<DataTable> {
        let n = self.records.len();
        let mut oil = Vec::with_capacity(n);
        let mut national_event = Vec::with_capacity(n);
        let mut national_holiday = Vec::with_capacity(n);
        let mut local_holiday = Vec::with_capacity(n);
        let mut regional_holiday = Vec::with_capacity(n);
        let mut day_of_month = Vec::with_capacity(n);
        let mut day_of_week = Vec::with_capacity(n);
        let mut month_of_year = Vec::with_capacity(n);
        let mut onpromotion = Vec::with_capacity(n);
        let mut sales = Vec::with_capacity(n);

        for record in &self.records {
            oil.push(record.oil.unwrap_or(self.oil_mean));
            national_event.push(record.holidays.national_event);
            national_holiday.push(record.holidays.national_holiday);
            local_holiday.push(record.holidays.local_holiday);
            regional_holiday.push(record.holidays.regional_holiday);
            day_of_month.push(f64::from(record.date.day()));
            // Monday = 0.
            day_of_week.push(f64::from(record.date.weekday().num_days_from_monday()));
            month_of_year.push(f64::from(record.date.month()));
            onpromotion.push(record.onpromotion);
            sales.push(record.sales);
        }

        let mut table = DataTable::new(self.records.iter().map(|r| r.date).collect());
        table.push_column(COL_OIL, oil)?;
        table.push_column(COL_NATIONAL_EVENT, national_event)?;
        table.push_column(COL_NATIONAL_HOLIDAY, national_holiday)?;
        table.push_column(COL_LOCAL_HOLIDAY, local_holiday)?;
        table.push_column(COL_REGIONAL_HOLIDAY, regional_holiday)?;
        table.push_column(COL_DAY_OF_MONTH, day_of_month)?;
        table.push_column(COL_DAY_OF_WEEK, day_of_week)?;
        table.push_column(COL_MONTH_OF_YEAR, month_of_year)?;
        table.push_column(COL_ONPROMOTION, onpromotion)?;
        if include_target {
            table.push_column(COL_SALES, sales)?;
        }
        Ok(table)
    }
}
