use crate::error::{ProcessingError, Result};
use crate::models::{ColumnData, SourceColumn, SourceTable};
use crate::utils::constants::{DEFAULT_BATCH_SIZE, DEFAULT_ROW_GROUP_SIZE};
use arrow::array::*;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub struct ParquetWriter {
    compression: Compression,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    /// Write a source table to Parquet. The file is written to a temporary
    /// sibling and renamed into place, so a reader never sees a partial file.
    pub fn write_table(&self, table: &SourceTable, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let schema = self.create_schema(table);
        let batch = self.table_to_batch(table, schema.clone())?;

        let temp_file = NamedTempFile::new_in(dir)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(DEFAULT_ROW_GROUP_SIZE)
            .build();

        let mut writer = ArrowWriter::try_new(temp_file.reopen()?, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        temp_file
            .persist(path)
            .map_err(|e| ProcessingError::Io(e.error))?;
        debug!("Wrote {} rows to {}", table.num_rows(), path.display());
        Ok(())
    }

    /// Numeric columns become nullable Float64, text columns nullable Utf8.
    fn create_schema(&self, table: &SourceTable) -> Arc<Schema> {
        let fields: Vec<Field> = table
            .columns()
            .iter()
            .map(|column| {
                let data_type = match column.data {
                    ColumnData::Numeric(_) => DataType::Float64,
                    ColumnData::Text(_) => DataType::Utf8,
                };
                Field::new(column.name.as_str(), data_type, true)
            })
            .collect();

        Arc::new(Schema::new(fields))
    }

    fn table_to_batch(&self, table: &SourceTable, schema: Arc<Schema>) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = table
            .columns()
            .iter()
            .map(|column| -> ArrayRef {
                match &column.data {
                    ColumnData::Numeric(values) => Arc::new(Float64Array::from(values.clone())),
                    ColumnData::Text(values) => Arc::new(StringArray::from(values.clone())),
                }
            })
            .collect();

        if arrays.is_empty() {
            return Ok(RecordBatch::new_empty(schema));
        }
        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Read a Parquet file into a source table. Files written by other tools
    /// are accepted: numeric columns are cast to Float64, dates, timestamps
    /// and strings to Utf8.
    pub fn read_table(&self, path: &Path) -> Result<SourceTable> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();
        let reader = builder.with_batch_size(DEFAULT_BATCH_SIZE).build()?;

        let mut columns: Vec<Option<ColumnData>> = schema
            .fields()
            .iter()
            .map(|field| Self::empty_column(field.name(), field.data_type()))
            .collect();

        for batch_result in reader {
            let batch = batch_result?;
            for (index, slot) in columns.iter_mut().enumerate() {
                let Some(column) = slot else {
                    continue;
                };
                let array = batch.column(index);
                match column {
                    ColumnData::Numeric(values) => {
                        let array = cast(array, &DataType::Float64)?;
                        let floats = array
                            .as_any()
                            .downcast_ref::<Float64Array>()
                            .ok_or_else(|| {
                                ProcessingError::InvalidFormat(format!(
                                    "Invalid {} column type",
                                    schema.field(index).name()
                                ))
                            })?;
                        values.extend(floats.iter().map(|v| v.filter(|v| v.is_finite())));
                    }
                    ColumnData::Text(values) => {
                        let array = cast(array, &DataType::Utf8)?;
                        let strings = array
                            .as_any()
                            .downcast_ref::<StringArray>()
                            .ok_or_else(|| {
                                ProcessingError::InvalidFormat(format!(
                                    "Invalid {} column type",
                                    schema.field(index).name()
                                ))
                            })?;
                        values.extend(strings.iter().map(|v| v.map(str::to_string)));
                    }
                }
            }
        }

        let columns = schema
            .fields()
            .iter()
            .zip(columns)
            .filter_map(|(field, data)| data.map(|data| SourceColumn::new(field.name(), data)))
            .collect();

        SourceTable::new(columns)
    }

    fn empty_column(name: &str, data_type: &DataType) -> Option<ColumnData> {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Boolean => Some(ColumnData::Numeric(Vec::new())),
            DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Utf8View
            | DataType::Date32
            | DataType::Date64
            | DataType::Timestamp(_, _)
            | DataType::Dictionary(_, _) => Some(ColumnData::Text(Vec::new())),
            other => {
                warn!("Skipping column '{}' with unsupported type {:?}", name, other);
                None
            }
        }
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();
        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            columns,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub columns: Vec<String>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - Columns: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.columns.join(", "),
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            self.compression,
        )
    }
}
