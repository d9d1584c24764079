pub mod csv_reader;
pub mod dataset;

pub use csv_reader::{read_csv, CsvOptions};
pub use dataset::Dataset;
