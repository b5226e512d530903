use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::error::ProcessingError;
use crate::models::{Dataset, Record};
use crate::processors::aggregation::{Aggregation, GroupKey, GroupRow, KeyValue};
use crate::processors::columns::{REGION, YEAR};
use crate::utils::constants::{DIRECTION_BINS, DIRECTION_BIN_WIDTH};

/// Compass sector of a direction in degrees, 0 to 15. Any angle is
/// wrapped into [0, 360) first.
pub fn bin_wind_direction(degrees: f64) -> u32 {
    let sector = (degrees.rem_euclid(360.0) / DIRECTION_BIN_WIDTH).floor() as u32;
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    sector.min(DIRECTION_BINS - 1)
}

pub fn categorize_wind_speed(speed: f64) -> &'static str {
    if speed < 10.0 {
        "Light (<10)"
    } else if speed < 20.0 {
        "Moderate (10-20)"
    } else if speed < 30.0 {
        "Strong (20-30)"
    } else if speed < 40.0 {
        "Very Strong (30-40)"
    } else {
        "Extreme (>40)"
    }
}

pub fn categorize_co(level: f64) -> &'static str {
    if level < 0.1 {
        "Very Low (<0.1)"
    } else if level < 0.2 {
        "Low (0.1-0.2)"
    } else if level < 0.3 {
        "Moderate (0.2-0.3)"
    } else if level < 0.4 {
        "High (0.3-0.4)"
    } else {
        "Very High (>0.4)"
    }
}

/// Which value the animated wind rose categorises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindRoseKind {
    #[default]
    Wind,
    Co,
}

impl FromStr for WindRoseKind {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wind" => Ok(WindRoseKind::Wind),
            "co" => Ok(WindRoseKind::Co),
            other => Err(ProcessingError::InvalidFormat(format!(
                "Invalid data type: {}",
                other
            ))),
        }
    }
}

fn select_direction_bin(r: &Record) -> Option<KeyValue> {
    r.avg_wind_dir
        .filter(|d| d.is_finite())
        .map(|d| KeyValue::from(bin_wind_direction(d)))
}

fn select_speed_category(r: &Record) -> Option<KeyValue> {
    r.avg_wind_speed
        .filter(|s| s.is_finite())
        .map(|s| KeyValue::from(categorize_wind_speed(s)))
}

fn select_co_category(r: &Record) -> Option<KeyValue> {
    r.avg_measurement
        .filter(|m| m.is_finite())
        .map(|m| KeyValue::from(categorize_co(m)))
}

const DIRECTION_BIN: GroupKey<Record> = GroupKey::new("direction_bin", select_direction_bin);
const SPEED_CATEGORY: GroupKey<Record> = GroupKey::new("category", select_speed_category);
const CO_CATEGORY: GroupKey<Record> = GroupKey::new("category", select_co_category);

/// Counts for one direction sector. Every category seen in the table is
/// present, zero when this sector has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindRoseRow {
    pub direction_bin: u32,
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
}

impl WindRoseRow {
    pub fn count(&self, category: &str) -> u64 {
        self.counts.get(category).copied().unwrap_or(0)
    }
}

fn categories_of(groups: &[GroupRow], category: &str) -> BTreeSet<String> {
    groups
        .iter()
        .filter_map(|g| g.key_str(category).map(str::to_string))
        .collect()
}

/// Turn (direction_bin, category) counts into one zero-filled row per
/// sector present, in sector order.
fn count_matrix<'a, I>(groups: I, categories: &BTreeSet<String>) -> Vec<WindRoseRow>
where
    I: IntoIterator<Item = &'a GroupRow>,
{
    let mut sectors: BTreeMap<u32, BTreeMap<String, u64>> = BTreeMap::new();
    for group in groups {
        let (Some(bin), Some(category)) = (
            group.key_int(DIRECTION_BIN.name()),
            group.key_str(SPEED_CATEGORY.name()),
        ) else {
            continue;
        };
        let counts = sectors.entry(bin as u32).or_insert_with(|| {
            categories.iter().map(|c| (c.clone(), 0)).collect()
        });
        *counts.entry(category.to_string()).or_insert(0) += group.rows() as u64;
    }

    sectors
        .into_iter()
        .map(|(direction_bin, counts)| WindRoseRow {
            direction_bin,
            counts,
        })
        .collect()
}

/// Direction by speed-category counts, optionally for one state. Records
/// missing direction or speed are dropped. Empty when the dataset has no
/// wind-direction column.
pub fn wind_rose_data(dataset: &Dataset, state: Option<&str>) -> Vec<WindRoseRow> {
    if dataset.wind_dir_column().is_none() {
        return Vec::new();
    }
    let state = state.filter(|s| !s.is_empty());
    let groups = Aggregation::group_by(&[DIRECTION_BIN, SPEED_CATEGORY]).run(
        dataset
            .records()
            .iter()
            .filter(|r| state.map_or(true, |s| r.is_state(s))),
    );
    let categories = categories_of(&groups, SPEED_CATEGORY.name());
    count_matrix(&groups, &categories)
}

/// Region → year → wind-rose rows, for animation over time.
pub type AnimatedWindRose = BTreeMap<String, BTreeMap<String, Vec<WindRoseRow>>>;

/// Wind-rose counts partitioned by region and year. Records missing
/// direction, speed or measurement are dropped regardless of `kind`; the
/// category columns are those seen anywhere in the dataset.
pub fn animated_wind_rose(dataset: &Dataset, kind: WindRoseKind) -> AnimatedWindRose {
    if dataset.wind_dir_column().is_none() {
        return BTreeMap::new();
    }
    let category = match kind {
        WindRoseKind::Wind => SPEED_CATEGORY,
        WindRoseKind::Co => CO_CATEGORY,
    };
    let complete = dataset
        .records()
        .iter()
        .filter(|r| r.avg_wind_speed.is_some() && r.avg_measurement.is_some());
    let groups = Aggregation::group_by(&[REGION, YEAR, DIRECTION_BIN, category]).run(complete);
    let categories = categories_of(&groups, category.name());

    let mut partitions: BTreeMap<(String, i64), Vec<&GroupRow>> = BTreeMap::new();
    for group in &groups {
        if let (Some(region), Some(year)) = (group.key_str(REGION.name()), group.key_int(YEAR.name())) {
            partitions
                .entry((region.to_string(), year))
                .or_default()
                .push(group);
        }
    }

    let mut animated = AnimatedWindRose::new();
    for ((region, year), members) in partitions {
        animated
            .entry(region)
            .or_default()
            .insert(year.to_string(), count_matrix(members, &categories));
    }
    animated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(state: &str, year: i32, dir: Option<f64>, speed: Option<f64>, co: Option<f64>) -> Record {
        let date = NaiveDate::from_ymd_opt(year, 3, 1).unwrap();
        Record::new(date, Some(state.to_string()), co, speed, dir)
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        Dataset::from_records(records, Some("avg_wind_dir"))
    }

    #[test]
    fn test_direction_bins() {
        assert_eq!(bin_wind_direction(0.0), 0);
        assert_eq!(bin_wind_direction(22.4), 0);
        assert_eq!(bin_wind_direction(22.5), 1);
        assert_eq!(bin_wind_direction(359.9), 15);
        assert_eq!(bin_wind_direction(380.0), bin_wind_direction(20.0));
        assert_eq!(bin_wind_direction(-10.0), 15);
        assert_eq!(bin_wind_direction(-1e-20), 15);
    }

    #[test]
    fn test_category_bounds() {
        assert_eq!(categorize_wind_speed(9.99), "Light (<10)");
        assert_eq!(categorize_wind_speed(10.0), "Moderate (10-20)");
        assert_eq!(categorize_wind_speed(40.0), "Extreme (>40)");
        assert_eq!(categorize_co(0.1), "Low (0.1-0.2)");
        assert_eq!(categorize_co(0.39), "High (0.3-0.4)");
        assert_eq!(categorize_co(0.4), "Very High (>0.4)");
    }

    #[test]
    fn test_wrapped_directions_share_light_category() {
        let data = dataset(vec![
            record("Texas", 2018, Some(10.0), Some(5.0), None),
            record("Texas", 2018, Some(400.0), Some(5.0), None),
        ]);
        let rows = wind_rose_data(&data, None);

        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"direction_bin": 0, "Light (<10)": 1},
                {"direction_bin": 1, "Light (<10)": 1}
            ])
        );
    }

    #[test]
    fn test_rows_zero_filled_and_incomplete_dropped() {
        let data = dataset(vec![
            record("Ohio", 2018, Some(5.0), Some(5.0), None),
            record("Ohio", 2018, Some(5.0), Some(25.0), None),
            record("Ohio", 2018, Some(100.0), Some(25.0), None),
            record("Ohio", 2018, None, Some(25.0), None),
            record("Ohio", 2018, Some(100.0), None, None),
            record("Utah", 2018, Some(300.0), Some(45.0), None),
        ]);
        let rows = wind_rose_data(&data, Some("Ohio"));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].direction_bin, 0);
        assert_eq!(rows[0].count("Light (<10)"), 1);
        assert_eq!(rows[0].count("Strong (20-30)"), 1);
        assert_eq!(rows[1].direction_bin, 4);
        assert_eq!(rows[1].counts.get("Light (<10)"), Some(&0));
        assert!(!rows[1].counts.contains_key("Extreme (>40)"));
    }

    #[test]
    fn test_missing_direction_column_gives_empty() {
        let records = vec![record("Ohio", 2018, Some(5.0), Some(5.0), Some(0.1))];
        let data = Dataset::from_records(records, None);

        assert!(wind_rose_data(&data, None).is_empty());
        assert!(animated_wind_rose(&data, WindRoseKind::Co).is_empty());
    }

    #[test]
    fn test_animated_nesting_by_region_and_year() {
        let data = dataset(vec![
            record("Ohio", 2018, Some(5.0), Some(5.0), Some(0.05)),
            record("Ohio", 2019, Some(95.0), Some(5.0), Some(0.45)),
            record("Texas", 2019, Some(95.0), Some(15.0), Some(0.25)),
            record("Texas", 2019, Some(95.0), Some(15.0), None),
        ]);

        let wind = animated_wind_rose(&data, WindRoseKind::Wind);
        assert_eq!(wind.keys().collect::<Vec<_>>(), vec!["Northern", "Southern"]);
        assert_eq!(wind["Northern"].keys().collect::<Vec<_>>(), vec!["2018", "2019"]);
        let texas = &wind["Southern"]["2019"];
        assert_eq!(texas.len(), 1);
        // the record without a measurement is not counted
        assert_eq!(texas[0].count("Moderate (10-20)"), 1);
        // categories come from the whole dataset
        assert_eq!(texas[0].counts.get("Light (<10)"), Some(&0));

        let co = animated_wind_rose(&data, WindRoseKind::Co);
        let ohio_2019 = &co["Northern"]["2019"];
        assert_eq!(ohio_2019[0].direction_bin, 4);
        assert_eq!(ohio_2019[0].count("Very High (>0.4)"), 1);
        assert_eq!(ohio_2019[0].counts.len(), 3);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("wind".parse::<WindRoseKind>().unwrap(), WindRoseKind::Wind);
        assert_eq!("co".parse::<WindRoseKind>().unwrap(), WindRoseKind::Co);
        assert!("pm25".parse::<WindRoseKind>().is_err());
    }
}
