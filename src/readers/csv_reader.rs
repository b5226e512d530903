use crate::error::Result;
use crate::models::{ColumnData, SourceColumn, SourceTable};
use crate::utils::constants::{
    DATE_COLUMN, MEASUREMENT_COLUMN, STATE_COLUMN, WIND_DIR_COLUMNS, WIND_SPEED_COLUMN,
};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Reads the delimited-text source into a columnar [`SourceTable`].
pub struct CsvSourceReader;

impl CsvSourceReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_table(&self, path: &Path) -> Result<SourceTable> {
        let file = File::open(path)?;
        self.read_from(file)
    }

    pub fn read_from<R: Read>(&self, input: R) -> Result<SourceTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(input);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for result in reader.records() {
            let record = result?;
            for (index, column) in cells.iter_mut().enumerate() {
                let value = record
                    .get(index)
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string);
                column.push(value);
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| {
                let data = Self::infer_column(&name, values);
                SourceColumn::new(name, data)
            })
            .collect();

        let table = SourceTable::new(columns)?;
        debug!(
            "Read {} rows with columns {:?}",
            table.num_rows(),
            table.column_names()
        );
        Ok(table)
    }

    /// Known value columns are always numeric, key columns always text; any
    /// other column is numeric when every non-empty cell parses as a float.
    fn infer_column(name: &str, values: Vec<Option<String>>) -> ColumnData {
        if name == DATE_COLUMN || name == STATE_COLUMN {
            return ColumnData::Text(values);
        }

        let known_numeric = name == MEASUREMENT_COLUMN
            || name == WIND_SPEED_COLUMN
            || WIND_DIR_COLUMNS.contains(&name);

        let parsed: Vec<Option<Option<f64>>> = values
            .iter()
            .map(|v| match v {
                None => Some(None),
                Some(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .map(|v| Some(v).filter(|v| v.is_finite())),
            })
            .collect();
        let unparseable = parsed.iter().filter(|p| p.is_none()).count();

        if known_numeric {
            if unparseable > 0 {
                warn!(
                    "Column '{}' has {} non-numeric values; treating them as missing",
                    name, unparseable
                );
            }
            ColumnData::Numeric(parsed.into_iter().map(Option::flatten).collect())
        } else if unparseable == 0 && values.iter().any(Option::is_some) {
            ColumnData::Numeric(parsed.into_iter().map(Option::flatten).collect())
        } else {
            ColumnData::Text(values)
        }
    }
}

impl Default for CsvSourceReader {
    fn default() -> Self {
        Self::new()
    }
}
