use crate::error::{ProcessingError, Result};

/// Values of a single source column. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view of a cell; text cells are parsed when possible.
    pub fn numeric(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Numeric(values) => values.get(row).copied().flatten(),
            ColumnData::Text(values) => values
                .get(row)
                .and_then(|v| v.as_deref())
                .and_then(|s| s.trim().parse::<f64>().ok()),
        }
        .filter(|v| v.is_finite())
    }

    /// Text view of a cell; numeric cells are formatted.
    pub fn text(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Numeric(values) => values.get(row).copied().flatten().map(|v| v.to_string()),
            ColumnData::Text(values) => values.get(row).cloned().flatten(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceColumn {
    pub name: String,
    pub data: ColumnData,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Raw tabular data as read from CSV or Parquet, before any derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    columns: Vec<SourceColumn>,
    num_rows: usize,
}

impl SourceTable {
    pub fn new(columns: Vec<SourceColumn>) -> Result<Self> {
        let num_rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        if let Some(column) = columns.iter().find(|c| c.data.len() != num_rows) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Column '{}' has {} rows, expected {}",
                column.name,
                column.data.len(),
                num_rows
            )));
        }
        Ok(Self { columns, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn columns(&self) -> &[SourceColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&SourceColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
