pub mod correlation;
pub mod trend;

pub use correlation::{
    calculate_correlation, correlate_by, pearson, raw_state_correlations, CorrelationRow,
    RawStateCorrelation, Significance,
};
pub use trend::{calculate_trend_line, linear_regression, TrendResult};
