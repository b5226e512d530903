pub mod calendar;
pub mod dataset;
pub mod record;
pub mod source_table;

pub use calendar::{Region, Season};
pub use dataset::Dataset;
pub use record::{ExtraValue, Record};
pub use source_table::{ColumnData, SourceColumn, SourceTable};
