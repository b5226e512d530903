use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::analyzers::correlation::correlate_by;
use crate::analyzers::trend::{calculate_trend_line, linear_regression, TrendResult};
use crate::models::record::{iso_timestamp, parse_year_month};
use crate::models::{Record, Region};
use crate::processors::aggregation::{Aggregation, GroupKey, GroupRow, ValueColumn};
use crate::processors::columns::{
    MEASUREMENT, REGION, SEASON, STATE, STATE_CODE, STATE_FIPS, WIND_SPEED, YEAR, YEAR_MONTH,
    YEAR_SEASON,
};
use crate::processors::rolling::{centered_rolling_mean, grouped_centered_rolling_mean};
use crate::utils::constants::ROLLING_WINDOW;
use crate::utils::numeric::round_to;

fn serialize_iso_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&iso_timestamp(*date))
}

/// Ascending order with nulls last.
fn nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn is_selected(record: &Record, state: Option<&str>) -> bool {
    match state.filter(|s| !s.is_empty()) {
        Some(state) => record.is_state(state),
        None => true,
    }
}

/// One month of a smoothed national or per-state series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub year_month: String,
    pub avg_measurement: Option<f64>,
    pub avg_wind_speed: Option<f64>,
    #[serde(serialize_with = "serialize_iso_date")]
    pub date: NaiveDate,
    pub rolling_avg_co: Option<f64>,
    pub rolling_avg_wind: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<&'static str>,
}

pub fn monthly_date(m: &MonthlyAggregate) -> Option<NaiveDate> {
    Some(m.date)
}

fn monthly_measurement(m: &MonthlyAggregate) -> Option<f64> {
    m.avg_measurement
}

fn monthly_wind_speed(m: &MonthlyAggregate) -> Option<f64> {
    m.avg_wind_speed
}

fn monthly_rolling_co(m: &MonthlyAggregate) -> Option<f64> {
    m.rolling_avg_co
}

fn monthly_rolling_wind(m: &MonthlyAggregate) -> Option<f64> {
    m.rolling_avg_wind
}

pub const MONTHLY_MEASUREMENT: ValueColumn<MonthlyAggregate> =
    ValueColumn::new("avg_measurement", monthly_measurement);
pub const MONTHLY_WIND_SPEED: ValueColumn<MonthlyAggregate> =
    ValueColumn::new("avg_wind_speed", monthly_wind_speed);
pub const ROLLING_CO: ValueColumn<MonthlyAggregate> =
    ValueColumn::new("rolling_avg_co", monthly_rolling_co);
pub const ROLLING_WIND: ValueColumn<MonthlyAggregate> =
    ValueColumn::new("rolling_avg_wind", monthly_rolling_wind);

/// Monthly means with 12-month centered rolling averages, ordered by date.
/// With `state` set, only that state's records are used.
pub fn monthly_averages(records: &[Record], state: Option<&str>) -> Vec<MonthlyAggregate> {
    let rows = Aggregation::group_by(&[YEAR_MONTH])
        .mean(MEASUREMENT)
        .mean(WIND_SPEED)
        .run(records.iter().filter(|r| is_selected(r, state)));

    let mut monthly: Vec<MonthlyAggregate> = rows
        .iter()
        .filter_map(|row| {
            let year_month = row.key_str(YEAR_MONTH.name())?;
            Some(MonthlyAggregate {
                date: parse_year_month(year_month)?,
                year_month: year_month.to_string(),
                avg_measurement: row.value(MEASUREMENT.name()),
                avg_wind_speed: row.value(WIND_SPEED.name()),
                rolling_avg_co: None,
                rolling_avg_wind: None,
                region: None,
            })
        })
        .collect();
    monthly.sort_by_key(|m| m.date);

    let co: Vec<Option<f64>> = monthly.iter().map(|m| m.avg_measurement).collect();
    let wind: Vec<Option<f64>> = monthly.iter().map(|m| m.avg_wind_speed).collect();
    let rolled = centered_rolling_mean(&co, ROLLING_WINDOW)
        .into_iter()
        .zip(centered_rolling_mean(&wind, ROLLING_WINDOW));
    for (month, (co, wind)) in monthly.iter_mut().zip(rolled) {
        month.rolling_avg_co = co;
        month.rolling_avg_wind = wind;
    }
    monthly
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMonthlyAggregate {
    pub state: String,
    pub year_month: String,
    pub avg_measurement: Option<f64>,
    pub avg_wind_speed: Option<f64>,
    #[serde(serialize_with = "serialize_iso_date")]
    pub date: NaiveDate,
}

/// Monthly means per state, ordered by state then month. With
/// `use_rolling` the means are replaced by their 12-month centered rolling
/// average, computed separately for each state.
pub fn state_monthly_averages(records: &[Record], use_rolling: bool) -> Vec<StateMonthlyAggregate> {
    let mut monthly: Vec<StateMonthlyAggregate> = Aggregation::group_by(&[STATE, YEAR_MONTH])
        .mean(MEASUREMENT)
        .mean(WIND_SPEED)
        .run(records)
        .iter()
        .filter_map(|row| {
            let year_month = row.key_str(YEAR_MONTH.name())?;
            Some(StateMonthlyAggregate {
                state: row.key_str(STATE.name())?.to_string(),
                date: parse_year_month(year_month)?,
                year_month: year_month.to_string(),
                avg_measurement: row.value(MEASUREMENT.name()),
                avg_wind_speed: row.value(WIND_SPEED.name()),
            })
        })
        .collect();

    if use_rolling {
        let states: Vec<&str> = monthly.iter().map(|m| m.state.as_str()).collect();
        let co: Vec<Option<f64>> = monthly.iter().map(|m| m.avg_measurement).collect();
        let wind: Vec<Option<f64>> = monthly.iter().map(|m| m.avg_wind_speed).collect();
        let co = grouped_centered_rolling_mean(&states, &co, ROLLING_WINDOW);
        let wind = grouped_centered_rolling_mean(&states, &wind, ROLLING_WINDOW);

        for (month, (co, wind)) in monthly.iter_mut().zip(co.into_iter().zip(wind)) {
            month.avg_measurement = co;
            month.avg_wind_speed = wind;
        }
    }
    monthly
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionMonthlyAggregate {
    pub year_month: String,
    pub region: String,
    pub avg_measurement: Option<f64>,
    pub avg_wind_speed: Option<f64>,
    #[serde(serialize_with = "serialize_iso_date")]
    pub date: NaiveDate,
}

/// Monthly means per region, ordered by region then date.
pub fn monthly_avg_by_region(records: &[Record]) -> Vec<RegionMonthlyAggregate> {
    let mut monthly: Vec<RegionMonthlyAggregate> = Aggregation::group_by(&[YEAR_MONTH, REGION])
        .mean(MEASUREMENT)
        .mean(WIND_SPEED)
        .run(records)
        .iter()
        .filter_map(|row| {
            let year_month = row.key_str(YEAR_MONTH.name())?;
            Some(RegionMonthlyAggregate {
                region: row.key_str(REGION.name())?.to_string(),
                date: parse_year_month(year_month)?,
                year_month: year_month.to_string(),
                avg_measurement: row.value(MEASUREMENT.name()),
                avg_wind_speed: row.value(WIND_SPEED.name()),
            })
        })
        .collect();
    monthly.sort_by(|a, b| a.region.cmp(&b.region).then(a.date.cmp(&b.date)));
    monthly
}

fn mean_by(records: &[Record], keys: &[GroupKey<Record>]) -> Vec<GroupRow> {
    Aggregation::group_by(keys)
        .mean(MEASUREMENT)
        .mean(WIND_SPEED)
        .run(records)
}

/// Means per (season, region).
pub fn seasonal_avg_by_region(records: &[Record]) -> Vec<GroupRow> {
    mean_by(records, &[SEASON, REGION])
}

/// Means per (year, region).
pub fn yearly_trends(records: &[Record]) -> Vec<GroupRow> {
    mean_by(records, &[YEAR, REGION])
}

/// Seasonal means for the two named regions. `Other` is left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalSplit {
    pub north: Vec<GroupRow>,
    pub south: Vec<GroupRow>,
}

pub fn seasonal_averages(records: &[Record]) -> SeasonalSplit {
    let (north, rest): (Vec<GroupRow>, Vec<GroupRow>) = seasonal_avg_by_region(records)
        .into_iter()
        .partition(|row| row.key_str(REGION.name()) == Some(Region::Northern.as_str()));
    let south = rest
        .into_iter()
        .filter(|row| row.key_str(REGION.name()) == Some(Region::Southern.as_str()))
        .collect();
    SeasonalSplit { north, south }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAverage {
    pub state: String,
    pub avg_measurement: Option<f64>,
    pub avg_wind_speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAveragesWithTrend {
    pub averages: Vec<StateAverage>,
    pub trend: TrendResult,
    pub correlation: Option<f64>,
}

/// Per-state means (CO to 3 decimals, wind to 1) ordered by wind speed,
/// with a regression of CO on wind speed across the states.
pub fn state_averages_with_trend(records: &[Record]) -> StateAveragesWithTrend {
    let mut averages: Vec<StateAverage> = mean_by(records, &[STATE])
        .iter()
        .filter_map(|row| {
            Some(StateAverage {
                state: row.key_str(STATE.name())?.to_string(),
                avg_measurement: row.value(MEASUREMENT.name()).map(|v| round_to(v, 3)),
                avg_wind_speed: row.value(WIND_SPEED.name()).map(|v| round_to(v, 1)),
            })
        })
        .collect();
    averages.sort_by(|a, b| nulls_last(a.avg_wind_speed, b.avg_wind_speed));

    let (x, y): (Vec<f64>, Vec<f64>) = averages
        .iter()
        .filter_map(|a| Some((a.avg_wind_speed?, a.avg_measurement?)))
        .unzip();
    let trend = linear_regression(&x, &y);

    StateAveragesWithTrend {
        averages,
        correlation: trend.r_value,
        trend,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    pub id: String,
    #[serde(rename = "parentId")]
    pub parent_id: String,
    pub value: Option<f64>,
    pub region: Option<String>,
}

/// A `US` root node followed by one node per state, largest mean CO first.
pub fn treemap(records: &[Record]) -> Vec<TreemapNode> {
    let mut rows = Aggregation::group_by(&[STATE, REGION])
        .mean(MEASUREMENT)
        .run(records);
    rows.sort_by(|a, b| match (a.value(MEASUREMENT.name()), b.value(MEASUREMENT.name())) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (a, b) => nulls_last(a, b),
    });

    let root = TreemapNode {
        id: "US".to_string(),
        parent_id: String::new(),
        value: None,
        region: None,
    };
    std::iter::once(root)
        .chain(rows.iter().filter_map(|row| {
            Some(TreemapNode {
                id: row.key_str(STATE.name())?.to_string(),
                parent_id: "US".to_string(),
                value: row.value(MEASUREMENT.name()).map(|v| round_to(v, 3)),
                region: row.key_str(REGION.name()).map(str::to_string),
            })
        }))
        .collect()
}

fn select_avg_co(r: &Record) -> Option<f64> {
    r.avg_measurement
}

const AVG_CO: ValueColumn<Record> = ValueColumn::new("avg_co", select_avg_co);

/// Mean CO per state as `avg_co`, keyed for map rendering.
pub fn choropleth(records: &[Record]) -> Vec<GroupRow> {
    Aggregation::group_by(&[STATE_CODE, STATE_FIPS, STATE])
        .mean(AVG_CO)
        .run(records)
}

/// Mean CO of one state at yearly, monthly and seasonal granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimatedCoState {
    pub state_code: String,
    pub state: String,
    pub state_fips: String,
    pub year: BTreeMap<String, Option<f64>>,
    pub month: BTreeMap<String, Option<f64>>,
    pub season: BTreeMap<String, Option<f64>>,
}

/// Per state code: mean CO rounded to 3 decimals keyed by `"2014"`,
/// `"2014-01"` and `"2014-Winter"`.
pub fn animated_co(records: &[Record]) -> BTreeMap<String, AnimatedCoState> {
    let mut output: BTreeMap<String, AnimatedCoState> = BTreeMap::new();

    for period in [YEAR, YEAR_MONTH, YEAR_SEASON] {
        let rows = Aggregation::group_by(&[STATE_CODE, STATE, STATE_FIPS, period])
            .mean(MEASUREMENT)
            .run(records);

        for row in rows {
            let (Some(code), Some(state), Some(fips), Some(key)) = (
                row.key_str(STATE_CODE.name()),
                row.key_str(STATE.name()),
                row.key_str(STATE_FIPS.name()),
                row.key(period.name()),
            ) else {
                continue;
            };
            let entry = output
                .entry(code.to_string())
                .or_insert_with(|| AnimatedCoState {
                    state_code: code.to_string(),
                    state: state.to_string(),
                    state_fips: fips.to_string(),
                    year: BTreeMap::new(),
                    month: BTreeMap::new(),
                    season: BTreeMap::new(),
                });
            let slot = match period.name() {
                "year" => &mut entry.year,
                "year_month" => &mut entry.month,
                _ => &mut entry.season,
            };
            slot.insert(key.to_string(), row.value(MEASUREMENT.name()).map(|v| round_to(v, 3)));
        }
    }
    output
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPair {
    pub co: TrendResult,
    pub wind: TrendResult,
}

impl TrendPair {
    /// Trends of the rolling CO and rolling wind columns over time.
    pub fn of(monthly: &[MonthlyAggregate]) -> Self {
        Self {
            co: calculate_trend_line(monthly, monthly_date, ROLLING_CO),
            wind: calculate_trend_line(monthly, monthly_date, ROLLING_WIND),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsCombo {
    pub us_monthly: Vec<MonthlyAggregate>,
    pub us_trend: TrendPair,
    pub correlation: Option<f64>,
}

/// National monthly series with rolling trends and the CO/wind correlation
/// of the monthly means.
pub fn us_combo(records: &[Record]) -> UsCombo {
    let mut us_monthly = monthly_averages(records, None);
    for month in &mut us_monthly {
        month.region = Some("US");
    }
    let correlation = correlate_by(&us_monthly, &[], MONTHLY_MEASUREMENT, MONTHLY_WIND_SPEED)
        .first()
        .and_then(|row| row.correlation);

    UsCombo {
        us_trend: TrendPair::of(&us_monthly),
        us_monthly,
        correlation,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateComparison {
    pub state: Option<String>,
    pub state_monthly: Vec<MonthlyAggregate>,
    pub state_trend: TrendPair,
    pub us_monthly: Vec<MonthlyAggregate>,
    pub us_trend: TrendPair,
}

/// One state's smoothed monthly series and trends next to the national ones.
/// Without a state both series are national.
pub fn state_comparison(records: &[Record], state: Option<&str>) -> StateComparison {
    let state_monthly = monthly_averages(records, state);
    let us_monthly = monthly_averages(records, None);

    StateComparison {
        state: state.map(str::to_string),
        state_trend: TrendPair::of(&state_monthly),
        state_monthly,
        us_trend: TrendPair::of(&us_monthly),
        us_monthly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(state: &str, year: i32, month: u32, co: Option<f64>, wind: Option<f64>) -> Record {
        let date = NaiveDate::from_ymd_opt(year, month, 15).unwrap();
        Record::new(date, Some(state.to_string()), co, wind, None)
    }

    /// `months` consecutive months starting January 2016.
    fn constant_series(state: &str, months: u32, co: f64, wind: f64) -> Vec<Record> {
        (0..months)
            .map(|i| record(state, 2016 + (i / 12) as i32, i % 12 + 1, Some(co), Some(wind)))
            .collect()
    }

    #[test]
    fn test_monthly_rolling_window_on_constant_series() {
        let records = constant_series("Texas", 24, 0.3, 10.0);
        let monthly = monthly_averages(&records, None);

        assert_eq!(monthly.len(), 24);
        assert!(monthly.iter().all(|m| m.avg_measurement == Some(0.3)));
        let defined: Vec<usize> = monthly
            .iter()
            .enumerate()
            .filter(|(_, m)| m.rolling_avg_co.is_some())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(defined, (6..=18).collect::<Vec<_>>());
        assert!((monthly[6].rolling_avg_co.unwrap() - 0.3).abs() < 1e-12);
        assert!((monthly[18].rolling_avg_wind.unwrap() - 10.0).abs() < 1e-12);
        assert_eq!(monthly[0].year_month, "2016-01");
    }

    #[test]
    fn test_monthly_state_filter_and_serialization() {
        let mut records = constant_series("Texas", 2, 0.3, 10.0);
        records.push(record("Ohio", 2016, 1, Some(0.9), Some(2.0)));
        records.push(record("Ohio", 2016, 1, None, Some(4.0)));

        let ohio = monthly_averages(&records, Some("Ohio"));
        assert_eq!(ohio.len(), 1);
        assert_eq!(ohio[0].avg_measurement, Some(0.9));
        assert_eq!(ohio[0].avg_wind_speed, Some(3.0));

        let everyone = monthly_averages(&records, Some(""));
        assert_eq!(everyone.len(), 2);

        let json = serde_json::to_value(&ohio[0]).unwrap();
        assert_eq!(json["date"], "2016-01-01T00:00:00");
        assert!(json["rolling_avg_co"].is_null());
        assert!(json.get("region").is_none());
    }

    #[test]
    fn test_state_rolling_resets_between_states() {
        let mut records = constant_series("Ohio", 12, 0.2, 5.0);
        records.extend(constant_series("Texas", 12, 0.4, 9.0));

        let plain = state_monthly_averages(&records, false);
        assert_eq!(plain.len(), 24);
        assert_eq!(plain[0].state, "Ohio");
        assert_eq!(plain[12].state, "Texas");

        let rolled = state_monthly_averages(&records, true);
        let defined: Vec<(&str, Option<f64>)> = rolled
            .iter()
            .filter(|m| m.avg_measurement.is_some())
            .map(|m| (m.state.as_str(), m.avg_measurement))
            .collect();
        assert_eq!(defined.len(), 2);
        assert_eq!(defined[0].0, "Ohio");
        assert!((defined[0].1.unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(defined[1].0, "Texas");
        assert!((defined[1].1.unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_region_monthly_sorted_by_region_then_date() {
        let records = vec![
            record("Texas", 2017, 2, Some(0.1), Some(1.0)),
            record("Hawaii", 2017, 1, Some(0.2), Some(2.0)),
            record("Ohio", 2017, 3, Some(0.3), Some(3.0)),
            record("Texas", 2017, 1, Some(0.4), Some(4.0)),
        ];
        let keys: Vec<(String, String)> = monthly_avg_by_region(&records)
            .into_iter()
            .map(|m| (m.region, m.year_month))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Northern".to_string(), "2017-03".to_string()),
                ("Other".to_string(), "2017-01".to_string()),
                ("Southern".to_string(), "2017-01".to_string()),
                ("Southern".to_string(), "2017-02".to_string()),
            ]
        );
    }

    #[test]
    fn test_seasonal_split_and_yearly_trends() {
        let records = vec![
            record("Ohio", 2017, 1, Some(0.2), Some(4.0)),
            record("Ohio", 2017, 7, Some(0.4), Some(6.0)),
            record("Texas", 2018, 7, Some(0.1), Some(8.0)),
            record("Hawaii", 2018, 7, Some(0.9), Some(9.0)),
        ];
        let split = seasonal_averages(&records);
        assert_eq!(split.north.len(), 2);
        assert_eq!(split.north[0].key_str("season"), Some("Summer"));
        assert_eq!(split.north[1].key_str("season"), Some("Winter"));
        assert_eq!(split.south.len(), 1);

        let yearly = yearly_trends(&records);
        let keys: Vec<(Option<i64>, Option<&str>)> = yearly
            .iter()
            .map(|r| (r.key_int("year"), r.key_str("region")))
            .collect();
        assert_eq!(
            keys,
            vec![(Some(2017), Some("Northern")), (Some(2018), Some("Other")), (Some(2018), Some("Southern"))]
        );
        assert_eq!(yearly[0].value("avg_measurement"), Some(0.30000000000000004));
    }

    #[test]
    fn test_state_averages_rounded_and_ordered() {
        let records = vec![
            record("Ohio", 2017, 1, Some(0.2004), Some(12.04)),
            record("Texas", 2017, 1, Some(0.1), Some(3.0)),
            record("Utah", 2017, 1, Some(0.4), Some(7.0)),
            record("Maine", 2017, 1, Some(0.5), None),
        ];
        let result = state_averages_with_trend(&records);

        let order: Vec<&str> = result.averages.iter().map(|a| a.state.as_str()).collect();
        assert_eq!(order, vec!["Texas", "Utah", "Ohio", "Maine"]);
        assert_eq!(result.averages[2].avg_measurement, Some(0.2));
        assert_eq!(result.averages[2].avg_wind_speed, Some(12.0));
        assert!(result.trend.slope.is_some());
        assert_eq!(result.correlation, result.trend.r_value);
    }

    #[test]
    fn test_state_average_ties_round_to_even() {
        let records = vec![
            record("Ohio", 2017, 1, Some(0.25), Some(12.0)),
            record("Ohio", 2017, 2, Some(0.25), Some(12.5)),
            record("Texas", 2017, 1, Some(0.0625), Some(1.0)),
            record("Texas", 2017, 2, Some(0.0625), Some(1.5)),
        ];
        let result = state_averages_with_trend(&records);

        assert_eq!(result.averages[0].state, "Texas");
        assert_eq!(result.averages[0].avg_wind_speed, Some(1.2));
        assert_eq!(result.averages[0].avg_measurement, Some(0.062));
        assert_eq!(result.averages[1].avg_wind_speed, Some(12.2));
    }

    #[test]
    fn test_treemap_root_then_descending() {
        let records = vec![
            record("Ohio", 2017, 1, Some(0.12345), Some(1.0)),
            record("Texas", 2017, 1, Some(0.5), Some(1.0)),
            record("Utah", 2017, 1, None, Some(1.0)),
        ];
        let nodes = treemap(&records);

        let json = serde_json::to_value(&nodes[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "US", "parentId": "", "value": null, "region": null})
        );
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["US", "Texas", "Ohio", "Utah"]);
        assert_eq!(nodes[2].value, Some(0.123));
        assert_eq!(nodes[2].region.as_deref(), Some("Northern"));
    }

    #[test]
    fn test_choropleth_rows() {
        let records = vec![
            record("Texas", 2017, 1, Some(0.2), None),
            record("Texas", 2017, 2, Some(0.4), None),
        ];
        let rows = choropleth(&records);
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"state_code": "TX", "state_fips": "48", "state": "Texas", "avg_co": 0.30000000000000004}])
        );
    }

    #[test]
    fn test_animated_co_granularities() {
        let records = vec![
            record("California", 2014, 1, Some(0.2), None),
            record("California", 2014, 2, Some(0.3), None),
            record("California", 2014, 6, Some(0.7), None),
        ];
        let output = animated_co(&records);
        let ca = &output["CA"];

        assert_eq!(ca.state, "California");
        assert_eq!(ca.state_fips, "06");
        assert_eq!(ca.year["2014"], Some(0.4));
        assert_eq!(ca.month["2014-02"], Some(0.3));
        assert_eq!(ca.season["2014-Winter"], Some(0.25));
        assert_eq!(ca.season["2014-Summer"], Some(0.7));
        assert_eq!(ca.month.len(), 3);
    }

    #[test]
    fn test_us_combo_on_constant_series() {
        let records = constant_series("Texas", 24, 0.3, 10.0);
        let combo = us_combo(&records);

        assert_eq!(combo.us_monthly.len(), 24);
        assert!(combo.us_monthly.iter().all(|m| m.region == Some("US")));
        // Zero variance leaves the correlation undefined
        assert_eq!(combo.correlation, None);
        assert!(combo.us_trend.co.slope.unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_state_comparison_includes_both_series() {
        let mut records = constant_series("Texas", 14, 0.3, 10.0);
        records.extend(constant_series("Ohio", 14, 0.5, 4.0));

        let comparison = state_comparison(&records, Some("Ohio"));
        assert_eq!(comparison.state.as_deref(), Some("Ohio"));
        assert_eq!(comparison.state_monthly[0].avg_measurement, Some(0.5));
        assert!((comparison.us_monthly[0].avg_measurement.unwrap() - 0.4).abs() < 1e-12);
        assert!(comparison.state_trend.co.slope.is_some());
        assert!(comparison.us_monthly.iter().all(|m| m.region.is_none()));
    }
}
