use crate::models::Record;
use crate::processors::aggregation::{GroupKey, KeyValue, ValueColumn};

fn select_state(r: &Record) -> Option<KeyValue> {
    r.state.as_deref().map(KeyValue::from)
}

fn select_state_code(r: &Record) -> Option<KeyValue> {
    r.state_code.map(KeyValue::from)
}

fn select_state_fips(r: &Record) -> Option<KeyValue> {
    r.state_fips.map(KeyValue::from)
}

fn select_region(r: &Record) -> Option<KeyValue> {
    Some(KeyValue::from(r.region.as_str()))
}

fn select_season(r: &Record) -> Option<KeyValue> {
    Some(KeyValue::from(r.season.as_str()))
}

fn select_year(r: &Record) -> Option<KeyValue> {
    Some(KeyValue::from(r.year))
}

fn select_year_month(r: &Record) -> Option<KeyValue> {
    Some(KeyValue::from(r.year_month.as_str()))
}

fn select_year_season(r: &Record) -> Option<KeyValue> {
    Some(KeyValue::from(format!("{}-{}", r.year, r.season)))
}

fn select_measurement(r: &Record) -> Option<f64> {
    r.avg_measurement
}

fn select_wind_speed(r: &Record) -> Option<f64> {
    r.avg_wind_speed
}

fn select_wind_dir(r: &Record) -> Option<f64> {
    r.avg_wind_dir
}

pub const STATE: GroupKey<Record> = GroupKey::new("state", select_state);
pub const STATE_CODE: GroupKey<Record> = GroupKey::new("state_code", select_state_code);
pub const STATE_FIPS: GroupKey<Record> = GroupKey::new("state_fips", select_state_fips);
pub const REGION: GroupKey<Record> = GroupKey::new("region", select_region);
pub const SEASON: GroupKey<Record> = GroupKey::new("season", select_season);
pub const YEAR: GroupKey<Record> = GroupKey::new("year", select_year);
pub const YEAR_MONTH: GroupKey<Record> = GroupKey::new("year_month", select_year_month);
/// `"2014-Winter"` style label.
pub const YEAR_SEASON: GroupKey<Record> = GroupKey::new("year_season", select_year_season);

pub const MEASUREMENT: ValueColumn<Record> = ValueColumn::new("avg_measurement", select_measurement);
pub const WIND_SPEED: ValueColumn<Record> = ValueColumn::new("avg_wind_speed", select_wind_speed);
pub const WIND_DIRECTION: ValueColumn<Record> = ValueColumn::new("avg_wind_dir", select_wind_dir);
