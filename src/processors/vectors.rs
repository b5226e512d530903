use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Record;
use crate::processors::aggregation::{Aggregation, GroupKey, GroupRow};
use crate::processors::columns::{
    SEASON, STATE, STATE_CODE, STATE_FIPS, WIND_DIRECTION, WIND_SPEED, YEAR,
};

/// Mean direction and speed for one state. Direction is an arithmetic mean
/// of degrees, so 350 and 10 average to 180.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorRecord {
    pub state: String,
    pub state_code: String,
    pub state_fips: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl VectorRecord {
    fn from_group(row: &GroupRow) -> Option<Self> {
        Some(Self {
            state: row.key_str(STATE.name())?.to_string(),
            state_code: row.key_str(STATE_CODE.name())?.to_string(),
            state_fips: row.key_str(STATE_FIPS.name())?.to_string(),
            year: None,
            season: None,
            wind_direction: row.value(WIND_DIRECTION.name()),
            wind_speed: row.value(WIND_SPEED.name()),
        })
    }
}

fn mean_vectors(records: &[Record], keys: &[GroupKey<Record>]) -> Vec<GroupRow> {
    Aggregation::group_by(keys)
        .mean(WIND_DIRECTION)
        .mean(WIND_SPEED)
        .run(records)
}

/// One vector per state over the whole period.
pub fn vectors_static(records: &[Record]) -> Vec<VectorRecord> {
    mean_vectors(records, &[STATE_CODE, STATE, STATE_FIPS])
        .iter()
        .filter_map(VectorRecord::from_group)
        .collect()
}

/// Year (as string) → one vector per state.
pub fn vectors_by_year(records: &[Record]) -> BTreeMap<String, Vec<VectorRecord>> {
    let mut by_year: BTreeMap<String, Vec<VectorRecord>> = BTreeMap::new();
    for row in mean_vectors(records, &[YEAR, STATE_CODE, STATE, STATE_FIPS]) {
        let (Some(year), Some(vector)) = (row.key_int(YEAR.name()), VectorRecord::from_group(&row))
        else {
            continue;
        };
        by_year.entry(year.to_string()).or_default().push(vector);
    }
    by_year
}

pub type SeasonalVectors = BTreeMap<String, BTreeMap<String, BTreeMap<String, VectorRecord>>>;

/// Year → season → state code → vector, each vector tagged with its year and
/// season.
pub fn vectors_by_season(records: &[Record]) -> SeasonalVectors {
    let mut nested = SeasonalVectors::new();
    for row in mean_vectors(records, &[STATE_CODE, STATE, STATE_FIPS, YEAR, SEASON]) {
        let (Some(year), Some(season), Some(mut vector)) = (
            row.key_int(YEAR.name()),
            row.key_str(SEASON.name()),
            VectorRecord::from_group(&row),
        ) else {
            continue;
        };
        vector.year = Some(year);
        vector.season = Some(season.to_string());
        nested
            .entry(year.to_string())
            .or_default()
            .entry(season.to_string())
            .or_default()
            .insert(vector.state_code.clone(), vector);
    }
    nested
}
