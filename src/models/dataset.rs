use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::record::{parse_source_date, ExtraValue, Record};
use crate::models::source_table::{ColumnData, SourceColumn, SourceTable};
use crate::utils::constants::{
    DATE_COLUMN, MAX_YEAR, MEASUREMENT_COLUMN, MIN_YEAR, RECORD_COLUMNS, STATE_COLUMN,
    WIND_DIR_COLUMNS, WIND_SPEED_COLUMN,
};

/// The canonical, immutable dataset shared by every request.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    wind_dir_column: Option<String>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>, wind_dir_column: Option<&str>) -> Self {
        Self {
            records,
            wind_dir_column: wind_dir_column.map(str::to_string),
        }
    }

    /// Derive canonical records from a raw source table: parse dates, keep
    /// years in range and populate season, region and state-code columns.
    pub fn from_table(table: &SourceTable) -> Result<Self> {
        let dates = table
            .column(DATE_COLUMN)
            .ok_or_else(|| ProcessingError::MissingColumn(DATE_COLUMN.to_string()))?;
        let states = table
            .column(STATE_COLUMN)
            .ok_or_else(|| ProcessingError::MissingColumn(STATE_COLUMN.to_string()))?;
        let measurements = table.column(MEASUREMENT_COLUMN);
        let wind_speeds = table.column(WIND_SPEED_COLUMN);

        let wind_dir_column = WIND_DIR_COLUMNS
            .iter()
            .find(|name| table.has_column(name))
            .map(|name| name.to_string());
        match &wind_dir_column {
            Some(name) => debug!("Using '{}' as wind direction column", name),
            None => warn!("No wind direction column found; wind rose views will be empty"),
        }
        let wind_dirs = wind_dir_column.as_deref().and_then(|name| table.column(name));

        let extra_columns: Vec<(Arc<str>, &SourceColumn)> = table
            .columns()
            .iter()
            .filter(|c| {
                !RECORD_COLUMNS.contains(&c.name.as_str())
                    && Some(c.name.as_str()) != wind_dir_column.as_deref()
            })
            .map(|c| (Arc::from(c.name.as_str()), c))
            .collect();

        let unparsed_dates = AtomicUsize::new(0);

        let records: Vec<Record> = (0..table.num_rows())
            .into_par_iter()
            .filter_map(|row| {
                let date = match dates.data.text(row).as_deref().and_then(parse_source_date) {
                    Some(date) => date,
                    None => {
                        unparsed_dates.fetch_add(1, Ordering::Relaxed);
                        return None;
                    }
                };
                let record = Record::new(
                    date,
                    states.data.text(row),
                    measurements.and_then(|c| c.data.numeric(row)),
                    wind_speeds.and_then(|c| c.data.numeric(row)),
                    wind_dirs.and_then(|c| c.data.numeric(row)),
                );
                if !(MIN_YEAR..=MAX_YEAR).contains(&record.year) {
                    return None;
                }

                let extra: Vec<(Arc<str>, ExtraValue)> = extra_columns
                    .iter()
                    .map(|(name, c)| {
                        let value = match &c.data {
                            ColumnData::Numeric(_) => ExtraValue::Number(c.data.numeric(row)),
                            ColumnData::Text(_) => ExtraValue::Text(c.data.text(row)),
                        };
                        (Arc::clone(name), value)
                    })
                    .collect();

                Some(record.with_extra(extra))
            })
            .collect();

        let unparsed_dates = unparsed_dates.into_inner();
        if unparsed_dates > 0 {
            warn!("Dropped {} rows with unparseable dates", unparsed_dates);
        }
        info!(
            "Kept {} of {} rows within {}-{}",
            records.len(),
            table.num_rows(),
            MIN_YEAR,
            MAX_YEAR
        );

        Ok(Self {
            records,
            wind_dir_column,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Source column the wind direction values were taken from, if any.
    pub fn wind_dir_column(&self) -> Option<&str> {
        self.wind_dir_column.as_deref()
    }

    pub fn state_records(&self, state: &str) -> Vec<&Record> {
        self.records.iter().filter(|r| r.is_state(state)).collect()
    }

    /// Distinct non-null state names in ascending order.
    pub fn unique_states(&self) -> Vec<String> {
        let mut states: Vec<String> = self
            .records
            .iter()
            .filter_map(|r| r.state.clone())
            .collect();
        states.sort();
        states.dedup();
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> ColumnData {
        ColumnData::Text(values.iter().map(|v| Some(v.to_string())).collect())
    }

    #[test]
    fn test_year_filter_and_bad_dates() {
        let table = SourceTable::new(vec![
            SourceColumn::new(
                "date_local",
                text(&["2013-12-31", "2014-01-01", "2024-12-31", "2025-01-01", "garbage"]),
            ),
            SourceColumn::new("state", text(&["Ohio"; 5])),
            SourceColumn::new(
                "avg_measurement",
                ColumnData::Numeric(vec![Some(0.1), Some(0.2), Some(0.3), Some(0.4), Some(0.5)]),
            ),
        ])
        .unwrap();

        let dataset = Dataset::from_table(&table).unwrap();
        let kept: Vec<Option<f64>> = dataset.records().iter().map(|r| r.avg_measurement).collect();
        assert_eq!(kept, vec![Some(0.2), Some(0.3)]);
        assert_eq!(dataset.wind_dir_column(), None);
        assert!(dataset.records()[0].avg_wind_speed.is_none());
    }

    #[test]
    fn test_wind_dir_alias_resolution() {
        let table = SourceTable::new(vec![
            SourceColumn::new("date_local", text(&["2015-05-05"])),
            SourceColumn::new("state", text(&["Texas"])),
            SourceColumn::new("WDF5", ColumnData::Numeric(vec![Some(270.0)])),
            SourceColumn::new("WDF2", ColumnData::Numeric(vec![Some(90.0)])),
            SourceColumn::new("county", text(&["Harris"])),
        ])
        .unwrap();

        let dataset = Dataset::from_table(&table).unwrap();
        assert_eq!(dataset.wind_dir_column(), Some("WDF2"));
        let record = &dataset.records()[0];
        assert_eq!(record.avg_wind_dir, Some(90.0));
        assert_eq!(
            record.extra_value("county"),
            Some(&ExtraValue::Text(Some("Harris".to_string())))
        );
        assert_eq!(record.extra_value("WDF5"), Some(&ExtraValue::Number(Some(270.0))));
        assert_eq!(record.extra_value("WDF2"), None);
    }

    #[test]
    fn test_source_columns_never_shadow_record_keys() {
        let table = SourceTable::new(vec![
            SourceColumn::new("date_local", text(&["2015-05-05"])),
            SourceColumn::new("state", text(&["Texas"])),
            SourceColumn::new("year", ColumnData::Numeric(vec![Some(1999.0)])),
            SourceColumn::new("region", text(&["Gulf"])),
            SourceColumn::new("WDF2", ColumnData::Numeric(vec![Some(90.0)])),
            SourceColumn::new("site", text(&["Harris"])),
        ])
        .unwrap();

        let dataset = Dataset::from_table(&table).unwrap();
        let record = &dataset.records()[0];
        let names: Vec<&str> = record.extra.iter().map(|(name, _)| name.as_ref()).collect();
        assert_eq!(names, vec!["site"]);

        let json = serde_json::to_string(record).unwrap();
        assert_eq!(json.matches("\"year\":").count(), 1);
        assert_eq!(json.matches("\"region\":").count(), 1);
        assert!(json.contains("\"year\":2015"));
        assert!(json.contains("\"region\":\"Southern\""));
        assert!(!json.contains("WDF2"));
    }

    #[test]
    fn test_extra_column_names_are_shared() {
        let table = SourceTable::new(vec![
            SourceColumn::new("date_local", text(&["2015-05-05", "2015-05-06"])),
            SourceColumn::new("state", text(&["Texas", "Ohio"])),
            SourceColumn::new("site", text(&["Harris", "Franklin"])),
        ])
        .unwrap();

        let dataset = Dataset::from_table(&table).unwrap();
        let first = &dataset.records()[0].extra[0].0;
        let second = &dataset.records()[1].extra[0].0;
        assert!(Arc::ptr_eq(first, second));
    }

    #[test]
    fn test_missing_required_column() {
        let table =
            SourceTable::new(vec![SourceColumn::new("date_local", text(&["2015-05-05"]))]).unwrap();
        assert!(matches!(
            Dataset::from_table(&table),
            Err(ProcessingError::MissingColumn(name)) if name == "state"
        ));
    }

    #[test]
    fn test_unique_states_sorted() {
        let date = chrono::NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let records = ["Utah", "Ohio", "Utah"]
            .iter()
            .map(|s| Record::new(date, Some(s.to_string()), None, None, None))
            .chain(std::iter::once(Record::new(date, None, None, None, None)))
            .collect();
        let dataset = Dataset::from_records(records, None);
        assert_eq!(dataset.unique_states(), vec!["Ohio", "Utah"]);
    }
}
