use chrono::NaiveDate;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::models::record::date_timestamp;
use crate::processors::aggregation::ValueColumn;

/// Ordinary least-squares fit of a value against a predictor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrendResult {
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
    pub r_value: Option<f64>,
    pub p_value: Option<f64>,
    pub std_err: Option<f64>,
}

impl TrendResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slope.is_none()
    }
}

/// Simple linear regression of `y` on `x`.
///
/// Returns an empty result with fewer than two points or when every `x` is
/// identical. The p-value is two-tailed for a zero slope with `n - 2`
/// degrees of freedom; `std_err` is the standard error of the slope.
pub fn linear_regression(x: &[f64], y: &[f64]) -> TrendResult {
    let n = x.len().min(y.len());
    if n < 2 {
        return TrendResult::empty();
    }
    let (x, y) = (&x[..n], &y[..n]);
    let nf = n as f64;

    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut ssxm = 0.0;
    let mut ssym = 0.0;
    let mut ssxym = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }
    ssxm /= nf;
    ssym /= nf;
    ssxym /= nf;

    if ssxm == 0.0 {
        return TrendResult::empty();
    }

    let r = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };
    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;

    let (p_value, std_err) = if n == 2 {
        let p = if y[0] == y[1] { 1.0 } else { 0.0 };
        (Some(p), Some(0.0))
    } else {
        let df = nf - 2.0;
        const TINY: f64 = 1.0e-20;
        let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
        let p = two_tailed_p(t, df);
        let std_err = ((1.0 - r * r) * ssym / ssxm / df).sqrt();
        (p, Some(std_err))
    };

    TrendResult {
        slope: finite(slope),
        intercept: finite(intercept),
        r_value: finite(r),
        p_value: p_value.and_then(finite),
        std_err: std_err.and_then(finite),
    }
}

/// Two-tailed p-value of a t statistic.
pub fn two_tailed_p(t: f64, df: f64) -> Option<f64> {
    if t.is_infinite() {
        return Some(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    finite(2.0 * dist.sf(t.abs()))
}

/// Trend of `value` over time for a series. Rows missing either the date or
/// the value are dropped first; dates become seconds since the Unix epoch.
pub fn calculate_trend_line<T>(
    series: &[T],
    time: fn(&T) -> Option<NaiveDate>,
    value: ValueColumn<T>,
) -> TrendResult {
    let (x, y): (Vec<f64>, Vec<f64>) = series
        .iter()
        .filter_map(|row| {
            let date = time(row)?;
            let v = value.select(row)?;
            Some((date_timestamp(date) as f64, v))
        })
        .unzip();

    linear_regression(&x, &y)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
