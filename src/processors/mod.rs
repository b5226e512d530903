pub mod aggregation;
pub mod columns;
pub mod rolling;
pub mod vectors;
pub mod views;
pub mod wind_rose;

pub use aggregation::{partition, Aggregation, GroupKey, GroupRow, KeyValue, Reducer, ValueColumn};
pub use rolling::{centered_rolling_mean, grouped_centered_rolling_mean};
pub use vectors::{vectors_by_season, vectors_by_year, vectors_static, VectorRecord};
pub use views::{MonthlyAggregate, StateAveragesWithTrend, TrendPair};
pub use wind_rose::{animated_wind_rose, bin_wind_direction, wind_rose_data, WindRoseKind, WindRoseRow};
