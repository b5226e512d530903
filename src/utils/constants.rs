/// Inclusive year range kept by the loader
pub const MIN_YEAR: i32 = 2014;
pub const MAX_YEAR: i32 = 2024;

/// Source column names
pub const DATE_COLUMN: &str = "date_local";
pub const STATE_COLUMN: &str = "state";
pub const MEASUREMENT_COLUMN: &str = "avg_measurement";
pub const WIND_SPEED_COLUMN: &str = "avg_wind_speed";

/// Keys every serialized record carries. Source columns with these names
/// are not passed through.
pub const RECORD_COLUMNS: [&str; 13] = [
    "date_local",
    "date",
    "state",
    "state_code",
    "state_fips",
    "year",
    "month",
    "year_month",
    "season",
    "region",
    "avg_measurement",
    "avg_wind_speed",
    "avg_wind_dir",
];

/// Wind direction column aliases, in order of preference
pub const WIND_DIR_COLUMNS: [&str; 5] = ["avg_wind_dir", "WDF1", "WDF2", "WDF5", "WDFG"];

/// Default data locations
pub const DEFAULT_CSV_PATH: &str = "static/data/co_wind_v2.csv";
pub const DEFAULT_PARQUET_PATH: &str = "static/data/co_wind_v2.parquet";
pub const DEFAULT_CONFIG_FILE: &str = "co-wind.toml";
pub const ENV_PREFIX: &str = "CO_WIND";

/// Server defaults
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

/// Rolling window (months) for the centered moving average
pub const ROLLING_WINDOW: usize = 12;

/// Wind rose
pub const DIRECTION_BINS: u32 = 16;
pub const DIRECTION_BIN_WIDTH: f64 = 360.0 / DIRECTION_BINS as f64;

/// Two-tailed significance threshold for correlations
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Default Parquet compression
pub const COMPRESSION_SNAPPY: &str = "snappy";
