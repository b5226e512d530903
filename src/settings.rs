use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::{
    DEFAULT_CSV_PATH, DEFAULT_HOST, DEFAULT_PARQUET_PATH, DEFAULT_PORT, ENV_PREFIX,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DataSettings {
    #[validate(custom(function = "non_empty_path"))]
    pub csv_path: PathBuf,

    #[validate(custom(function = "non_empty_path"))]
    pub parquet_path: PathBuf,

    #[validate(length(min = 1))]
    pub compression: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub host: String,

    #[validate(range(min = 1))]
    pub port: u16,

    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub data: DataSettings,

    #[validate(nested)]
    pub server: ServerSettings,

    #[validate(range(min = 1))]
    pub workers: usize,
}

impl Settings {
    /// Layered settings: defaults, then the optional config file, then
    /// `CO_WIND__SECTION__KEY` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("data.csv_path", DEFAULT_CSV_PATH)?
            .set_default("data.parquet_path", DEFAULT_PARQUET_PATH)?
            .set_default("data.compression", "snappy")?
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", DEFAULT_PORT as i64)?
            .set_default("workers", num_cpus::get() as i64)?;

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(
                File::with_name(crate::utils::constants::DEFAULT_CONFIG_FILE).required(false),
            ),
        };

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

fn non_empty_path(path: &PathBuf) -> std::result::Result<(), validator::ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(validator::ValidationError::new("empty_path"));
    }
    Ok(())
}
