pub mod csv_reader;
pub mod dataset_loader;

pub use csv_reader::CsvSourceReader;
pub use dataset_loader::{DatasetLoader, SourceFormat};
