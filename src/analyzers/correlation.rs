use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::analyzers::trend::two_tailed_p;
use crate::models::Record;
use crate::processors::aggregation::{partition, GroupKey, KeyValue, ValueColumn};
use crate::processors::columns::{MEASUREMENT, STATE, WIND_SPEED};
use crate::utils::constants::SIGNIFICANCE_THRESHOLD;
use crate::utils::numeric::round_to;
use crate::utils::states::{state_code, state_fips};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Significance {
    #[serde(rename = "significant")]
    Significant,
    #[serde(rename = "not significant")]
    NotSignificant,
}

impl Significance {
    /// Anything that is not a p-value below the threshold, including a
    /// missing one, is not significant.
    pub fn from_p_value(p_value: Option<f64>) -> Self {
        match p_value {
            Some(p) if p < SIGNIFICANCE_THRESHOLD => Significance::Significant,
            _ => Significance::NotSignificant,
        }
    }
}

/// Pearson correlation coefficient. `None` for fewer than two points or
/// when either series is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    if x.iter().all(|v| *v == x[0]) || y.iter().all(|v| *v == y[0]) {
        return None;
    }
    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    r.is_finite().then_some(r)
}

/// Pearson r with its two-tailed p-value for zero correlation.
pub fn pearson_with_p_value(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let r = pearson(x, y)?;
    let n = x.len().min(y.len());
    if n == 2 {
        return Some((r, 1.0));
    }
    let df = (n - 2) as f64;
    let t = if r.abs() == 1.0 {
        f64::INFINITY
    } else {
        r * (df / (1.0 - r * r)).sqrt()
    };
    Some((r, two_tailed_p(t, df)?))
}

/// Correlation between two value columns within one group.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationRow {
    pub group: Vec<(&'static str, KeyValue)>,
    pub correlation: Option<f64>,
    pub p_value: Option<f64>,
    pub significance: Significance,
}

impl Serialize for CorrelationRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.group.len() + 3))?;
        for (name, value) in &self.group {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("Correlation", &self.correlation)?;
        map.serialize_entry("P-value", &self.p_value)?;
        map.serialize_entry("Significance", &self.significance)?;
        map.end()
    }
}

/// Per-group Pearson correlation between `x` and `y` with significance.
///
/// Rows missing either value are dropped first. Groups left with one row or
/// fewer produce no output row. A group whose values have zero variance
/// yields a null coefficient and is not significant.
pub fn correlate_by<R>(
    rows: &[R],
    keys: &[GroupKey<R>],
    x: ValueColumn<R>,
    y: ValueColumn<R>,
) -> Vec<CorrelationRow> {
    let complete = rows
        .iter()
        .filter(|row| x.select(row).is_some() && y.select(row).is_some());

    partition(keys, complete)
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(key, members)| {
            let (xs, ys): (Vec<f64>, Vec<f64>) = members
                .iter()
                .filter_map(|row| Some((x.select(row)?, y.select(row)?)))
                .unzip();
            let (correlation, p_value) = match pearson_with_p_value(&xs, &ys) {
                Some((r, p)) => (Some(r), Some(p)),
                None => (None, None),
            };
            CorrelationRow {
                group: keys.iter().map(|k| k.name()).zip(key).collect(),
                correlation,
                p_value,
                significance: Significance::from_p_value(p_value),
            }
        })
        .collect()
}

/// Correlation between CO and wind speed per group of records.
pub fn calculate_correlation(records: &[Record], keys: &[GroupKey<Record>]) -> Vec<CorrelationRow> {
    correlate_by(records, keys, MEASUREMENT, WIND_SPEED)
}

/// Per-state coefficient without a significance test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawStateCorrelation {
    pub state: String,
    #[serde(rename = "Correlation")]
    pub correlation: Option<f64>,
    pub state_code: Option<&'static str>,
    pub state_fips: Option<&'static str>,
    #[serde(rename = "Significance")]
    pub significance: Significance,
}

/// Per-state CO/wind coefficient rounded to six decimals.
///
/// Every state is labelled significant: no p-value is computed here. Use
/// [`calculate_correlation`] for a real significance test.
pub fn raw_state_correlations(records: &[Record]) -> Vec<RawStateCorrelation> {
    let complete = records
        .iter()
        .filter(|r| r.avg_measurement.is_some() && r.avg_wind_speed.is_some());

    partition(&[STATE], complete)
        .into_iter()
        .filter_map(|(key, members)| {
            let state = key.into_iter().next()?.as_str()?.to_string();
            let (xs, ys): (Vec<f64>, Vec<f64>) = members
                .iter()
                .filter_map(|r| Some((r.avg_measurement?, r.avg_wind_speed?)))
                .unzip();
            let code = state_code(&state);
            Some(RawStateCorrelation {
                correlation: pearson(&xs, &ys).map(|r| round_to(r, 6)),
                state_code: code,
                state_fips: code.and_then(state_fips),
                significance: Significance::Significant,
                state,
            })
        })
        .collect()
}
