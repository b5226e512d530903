use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, SourceTable};
use crate::readers::CsvSourceReader;
use crate::settings::DataSettings;
use crate::writers::ParquetWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Parquet,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("parquet") => Ok(SourceFormat::Parquet),
            Some("csv") => Ok(SourceFormat::Csv),
            _ => Err(ProcessingError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Loads the canonical dataset, preferring a cached Parquet copy and
/// converting the CSV source once when the cache is absent.
pub struct DatasetLoader {
    csv_path: PathBuf,
    parquet_path: PathBuf,
    compression: String,
}

impl DatasetLoader {
    pub fn new(csv_path: impl Into<PathBuf>, parquet_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            parquet_path: parquet_path.into(),
            compression: crate::utils::constants::COMPRESSION_SNAPPY.to_string(),
        }
    }

    pub fn from_settings(settings: &DataSettings) -> Self {
        Self::new(&settings.csv_path, &settings.parquet_path)
            .with_compression(&settings.compression)
    }

    pub fn with_compression(mut self, compression: &str) -> Self {
        self.compression = compression.to_string();
        self
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Convert the CSV source to Parquet, creating the target directory.
    pub fn convert_to_parquet(&self) -> Result<PathBuf> {
        if !self.csv_path.exists() {
            return Err(ProcessingError::MissingSource {
                parquet: self.parquet_path.clone(),
                csv: self.csv_path.clone(),
            });
        }
        let table = CsvSourceReader::new().read_table(&self.csv_path)?;
        self.write_cache(&table)?;
        Ok(self.parquet_path.clone())
    }

    fn write_cache(&self, table: &SourceTable) -> Result<()> {
        let writer = ParquetWriter::new().with_compression(&self.compression)?;
        writer.write_table(table, &self.parquet_path)?;
        info!(
            "Converted {} -> {} ({} rows)",
            self.csv_path.display(),
            self.parquet_path.display(),
            table.num_rows()
        );
        Ok(())
    }

    /// Path to a ready-to-load Parquet file, converting if needed.
    pub fn ensure_parquet(&self) -> Result<PathBuf> {
        if self.parquet_path.exists() {
            info!("Cache hit: {}", self.parquet_path.display());
            return Ok(self.parquet_path.clone());
        }
        warn!(
            "Cache miss: {} not found, converting from {}",
            self.parquet_path.display(),
            self.csv_path.display()
        );
        self.convert_to_parquet()
    }

    /// Load the dataset from the cache, falling back to the CSV source. A
    /// failed cache write is logged and the CSV is used directly.
    pub fn load(&self) -> Result<Dataset> {
        if self.parquet_path.exists() {
            info!("Cache hit: {}", self.parquet_path.display());
            return Self::load_path(&self.parquet_path);
        }
        if !self.csv_path.exists() {
            return Err(ProcessingError::MissingSource {
                parquet: self.parquet_path.clone(),
                csv: self.csv_path.clone(),
            });
        }

        warn!(
            "Cache miss: {} not found, converting from {}",
            self.parquet_path.display(),
            self.csv_path.display()
        );
        let table = CsvSourceReader::new().read_table(&self.csv_path)?;
        if let Err(e) = self.write_cache(&table) {
            warn!("Could not write Parquet cache, using CSV directly: {}", e);
        }
        Dataset::from_table(&table)
    }

    /// Load a dataset from an explicit path, dispatching on its extension.
    pub fn load_path(path: &Path) -> Result<Dataset> {
        let table = Self::read_source(path)?;
        Dataset::from_table(&table)
    }

    pub fn read_source(path: &Path) -> Result<SourceTable> {
        match SourceFormat::from_path(path)? {
            SourceFormat::Parquet => ParquetWriter::new().read_table(path),
            SourceFormat::Csv => CsvSourceReader::new().read_table(path),
        }
    }
}
