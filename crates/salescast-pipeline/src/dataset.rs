//! Source data access for the feature builder.
//!
//! Reads the four relational sources (transactions, stores, oil prices,
//! holiday events) from SQLite and merges them into one daily record per
//! date. Each call builds fresh values; nothing is cached between uses.

use chrono::NaiveDate;
use rusqlite::Connection;
use salescast_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Store-wide daily transactions joined to the store dimension and summed
/// per date.
const DAILY_TRANSACTIONS_SQL: &str = "\
    SELECT t.date, SUM(t.onpromotion) AS onpromotion, SUM(t.sales) AS sales
    FROM transactions t
    INNER JOIN stores s ON s.store_nbr = t.store_nbr
    GROUP BY t.date
    ORDER BY t.date";

const OIL_SQL: &str = "SELECT date, dcoilwtico FROM oil ORDER BY date";

/// Holiday pivot: one row per date with a count per holiday type.
const HOLIDAYS_SQL: &str = "\
    SELECT date,
           SUM(CASE WHEN type = 'Event'   AND locale = 'National' THEN 1 ELSE 0 END) AS is_national_event,
           SUM(CASE WHEN type = 'Holiday' AND locale = 'National' THEN 1 ELSE 0 END) AS is_national_holiday,
           SUM(CASE WHEN type = 'Holiday' AND locale = 'Local'    THEN 1 ELSE 0 END) AS is_local_holiday,
           SUM(CASE WHEN type = 'Holiday' AND locale = 'Regional' THEN 1 ELSE 0 END) AS is_regional_holiday
    FROM holidays_events
    GROUP BY date
    ORDER BY date";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HolidayFlags {
    pub national_event: f64,
    pub national_holiday: f64,
    pub local_holiday: f64,
    pub regional_holiday: f64,
}

/// One merged record per calendar date.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub onpromotion: f64,
    pub sales: f64,
    /// WTI oil price; absent readings are filled downstream with the mean.
    pub oil: Option<f64>,
    pub holidays: HolidayFlags,
}

pub struct FeatureStore {
    conn: Connection,
}

impl FeatureStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| Error::data(format!("cannot open dataset db: {e}")))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::data(format!("cannot open in-memory db: {e}")))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The merged daily series: transactions left-joined with oil prices and
    /// holiday flags. Dates without holiday rows get zero flags.
    pub fn daily_records(&self) -> Result<Vec<DailyRecord>> {
        let oil = self.oil_prices()?;
        let holidays = self.holiday_flags()?;

        let mut stmt = self
            .conn
            .prepare(DAILY_TRANSACTIONS_SQL)
            .map_err(sql_err)?;
        let rows = stmt
            .query_map([], |row| {
                let date: String = row.get(0)?;
                let onpromotion: f64 = row.get(1)?;
                let sales: f64 = row.get(2)?;
                Ok((date, onpromotion, sales))
            })
            .map_err(sql_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (date, onpromotion, sales) = row.map_err(sql_err)?;
            let date = parse_date(&date)?;
            records.push(DailyRecord {
                date,
                onpromotion,
                sales,
                oil: oil.get(&date).copied().flatten(),
                holidays: holidays.get(&date).copied().unwrap_or_default(),
            });
        }
        Ok(records)
    }

    fn oil_prices(&self) -> Result<BTreeMap<NaiveDate, Option<f64>>> {
        let mut stmt = self.conn.prepare(OIL_SQL).map_err(sql_err)?;
        let rows = stmt
            .query_map([], |row| {
                let date: String = row.get(0)?;
                let price: rusqlite::types::Value = row.get(1)?;
                Ok((date, price))
            })
            .map_err(sql_err)?;

        let mut prices = BTreeMap::new();
        for row in rows {
            let (date, price) = row.map_err(sql_err)?;
            prices.insert(parse_date(&date)?, coerce_price(price));
        }
        Ok(prices)
    }

    fn holiday_flags(&self) -> Result<BTreeMap<NaiveDate, HolidayFlags>> {
        let mut stmt = self.conn.prepare(HOLIDAYS_SQL).map_err(sql_err)?;
        let rows = stmt
            .query_map([], |row| {
                let date: String = row.get(0)?;
                Ok((
                    date,
                    HolidayFlags {
                        national_event: row.get(1)?,
                        national_holiday: row.get(2)?,
                        local_holiday: row.get(3)?,
                        regional_holiday: row.get(4)?,
                    },
                ))
            })
            .map_err(sql_err)?;

        let mut flags = BTreeMap::new();
        for row in rows {
            let (date, f) = row.map_err(sql_err)?;
            flags.insert(parse_date(&date)?, f);
        }
        Ok(flags)
    }
}

fn sql_err(e: rusqlite::Error) -> Error {
    Error::data(format!("sqlite query failed: {e}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| Error::data(format!("bad date `{raw}` in source data: {e}")))
}

/// Oil readings arrive as REAL, INTEGER, empty TEXT, or NULL depending on
/// how the source CSVs were loaded. Anything unparseable counts as absent.
fn coerce_price(value: rusqlite::types::Value) -> Option<f64> {
    use rusqlite::types::Value;
    match value {
        Value::Real(v) => Some(v),
        Value::Integer(v) => Some(v as f64),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> FeatureStore {
        let store = FeatureStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch(
                "CREATE TABLE transactions (date TEXT, store_nbr INTEGER, onpromotion REAL, sales REAL);
                 CREATE TABLE stores (store_nbr INTEGER, city TEXT);
                 CREATE TABLE oil (date TEXT, dcoilwtico REAL);
                 CREATE TABLE holidays_events (date TEXT, type TEXT, locale TEXT);
                 INSERT INTO stores VALUES (1, 'Quito'), (2, 'Guayaquil');
                 INSERT INTO transactions VALUES
                     ('2017-08-01', 1, 2, 100.0),
                     ('2017-08-01', 2, 1, 50.0),
                     ('2017-08-02', 1, 0, 80.0),
                     ('2017-08-02', 99, 0, 999.0);
                 INSERT INTO oil VALUES ('2017-08-01', 47.5), ('2017-08-02', '');
                 INSERT INTO holidays_events VALUES
                     ('2017-08-01', 'Holiday', 'National'),
                     ('2017-08-01', 'Event', 'National');",
            )
            .unwrap();
        store
    }

    #[test]
    fn daily_records_aggregate_and_merge() {
        let records = seeded_store().daily_records().unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2017, 8, 1).unwrap());
        assert_eq!(first.onpromotion, 3.0);
        assert_eq!(first.sales, 150.0);
        assert_eq!(first.oil, Some(47.5));
        assert_eq!(first.holidays.national_holiday, 1.0);
        assert_eq!(first.holidays.national_event, 1.0);
        assert_eq!(first.holidays.local_holiday, 0.0);

        // Store 99 has no stores row, so the inner join drops it; the empty
        // oil reading comes through as absent.
        let second = &records[1];
        assert_eq!(second.sales, 80.0);
        assert_eq!(second.oil, None);
        assert_eq!(second.holidays, HolidayFlags::default());
    }
}
