use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::models::calendar::{Region, Season};
use crate::utils::constants::RECORD_COLUMNS;
use crate::utils::states::{state_code, state_fips};

/// A pass-through source value carried alongside the canonical columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Number(Option<f64>),
    Text(Option<String>),
}

/// One row of the canonical dataset: a daily measurement for a state with
/// every derived column populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub state: Option<String>,
    pub state_code: Option<&'static str>,
    pub state_fips: Option<&'static str>,
    pub year: i32,
    pub month: u32,
    pub year_month: String,
    pub season: Season,
    pub region: Region,
    pub avg_measurement: Option<f64>,
    pub avg_wind_speed: Option<f64>,
    pub avg_wind_dir: Option<f64>,
    /// Column names are shared with the dataset header, not owned per row.
    pub extra: Vec<(Arc<str>, ExtraValue)>,
}

impl Record {
    /// Build a record and derive its calendar, region and state-code columns.
    pub fn new(
        date: NaiveDate,
        state: Option<String>,
        avg_measurement: Option<f64>,
        avg_wind_speed: Option<f64>,
        avg_wind_dir: Option<f64>,
    ) -> Self {
        let code = state.as_deref().and_then(state_code);
        let region = Region::from_state(state.as_deref());

        Self {
            date,
            state_code: code,
            state_fips: code.and_then(state_fips),
            year: date.year(),
            month: date.month(),
            year_month: format_year_month(date),
            season: Season::from_month(date.month()),
            region,
            state,
            avg_measurement,
            avg_wind_speed,
            avg_wind_dir,
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, extra: Vec<(Arc<str>, ExtraValue)>) -> Self {
        self.extra = extra;
        self
    }

    pub fn is_state(&self, state: &str) -> bool {
        self.state.as_deref() == Some(state)
    }

    /// Pass-through value of a source column that has no canonical slot.
    pub fn extra_value(&self, column: &str) -> Option<&ExtraValue> {
        self.extra
            .iter()
            .find(|(name, _)| name.as_ref() == column)
            .map(|(_, value)| value)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(RECORD_COLUMNS.len() + self.extra.len()))?;
        map.serialize_entry("date_local", &iso_timestamp(self.date))?;
        map.serialize_entry("date", &self.date.format("%Y-%m-%d").to_string())?;
        map.serialize_entry("state", &self.state)?;
        map.serialize_entry("state_code", &self.state_code)?;
        map.serialize_entry("state_fips", &self.state_fips)?;
        map.serialize_entry("year", &self.year)?;
        map.serialize_entry("month", &self.month)?;
        map.serialize_entry("year_month", &self.year_month)?;
        map.serialize_entry("season", &self.season)?;
        map.serialize_entry("region", &self.region)?;
        map.serialize_entry("avg_measurement", &self.avg_measurement)?;
        map.serialize_entry("avg_wind_speed", &self.avg_wind_speed)?;
        map.serialize_entry("avg_wind_dir", &self.avg_wind_dir)?;
        for (name, value) in &self.extra {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

/// Parse a source date cell. Accepts plain dates, ISO date-times and
/// US-style `MM/DD/YYYY`.
pub fn parse_source_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    if let Some(prefix) = value.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(value, "%m/%d/%Y").ok()
}

pub fn format_year_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// First day of the month named by a `YYYY-MM` string.
pub fn parse_year_month(year_month: &str) -> Option<NaiveDate> {
    let (year, month) = year_month.split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

pub fn iso_timestamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00").to_string()
}

pub fn date_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_columns() {
        let date = NaiveDate::from_ymd_opt(2019, 12, 3).unwrap();
        let record = Record::new(date, Some("Texas".to_string()), Some(0.3), Some(10.0), None);

        assert_eq!(record.year, 2019);
        assert_eq!(record.month, 12);
        assert_eq!(record.year_month, "2019-12");
        assert_eq!(record.season, Season::Winter);
        assert_eq!(record.region, Region::Southern);
        assert_eq!(record.state_code, Some("TX"));
        assert_eq!(record.state_fips, Some("48"));
    }

    #[test]
    fn test_unmapped_state_propagates_null() {
        let date = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        let record = Record::new(
            date,
            Some("District Of Columbia".to_string()),
            None,
            None,
            None,
        );
        assert_eq!(record.state_code, None);
        assert_eq!(record.state_fips, None);
        assert_eq!(record.region, Region::Other);
    }

    #[test]
    fn test_parse_source_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2016, 3, 9);
        assert_eq!(parse_source_date("2016-03-09"), expected);
        assert_eq!(parse_source_date("2016-03-09T00:00:00"), expected);
        assert_eq!(parse_source_date("2016-03-09 12:30:00"), expected);
        assert_eq!(parse_source_date("03/09/2016"), expected);
        assert_eq!(parse_source_date("not a date"), None);
    }

    #[test]
    fn test_year_month_round_trip() {
        let date = parse_year_month("2021-07").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2021, 7, 1).unwrap());
        assert_eq!(format_year_month(date), "2021-07");
        assert_eq!(parse_year_month("2021"), None);
    }

    #[test]
    fn test_serialize_nulls_and_timestamp() {
        let date = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
        let record = Record::new(date, Some("Ohio".to_string()), None, Some(4.0), None);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["date_local"], "2015-01-02T00:00:00");
        assert_eq!(json["date"], "2015-01-02");
        assert!(json["avg_measurement"].is_null());
        assert_eq!(json["region"], "Northern");
    }

    #[test]
    fn test_timestamp_is_epoch_seconds() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(date_timestamp(date), 86_400);
    }
}
