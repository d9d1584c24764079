use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layout of a voltage recording file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CsvOptions {
    /// Skip the instrument metadata block at the top of the file.
    pub has_metadata: bool,
    pub metadata_rows: usize,
    /// Zero-based column holding the voltage.
    pub column: usize,
    /// Decimal places kept per value; `None` keeps full precision.
    pub decimals: Option<u32>,
    /// Extension of recording files when scanning folders.
    pub extension: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_metadata: true,
            metadata_rows: 22,
            column: 2,
            decimals: Some(8),
            extension: "csv".to_string(),
        }
    }
}

fn round_to(value: f64, decimals: Option<u32>) -> f64 {
    match decimals {
        Some(places) => {
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        }
        None => value,
    }
}

/// Reads the voltage column of a single recording.
pub fn read_csv<P: AsRef<Path>>(file_path: P, options: &CsvOptions) -> Result<Vec<f64>> {
    let file_path = file_path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(file_path)?;

    let skip = if options.has_metadata {
        options.metadata_rows
    } else {
        0
    };

    let mut data = Vec::new();
    let mut rows_seen = 0;
    for result in rdr.records() {
        let record = result?;
        rows_seen += 1;
        if rows_seen <= skip {
            continue;
        }

        let field = record.get(options.column).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "{}: row {} has no column {}",
                file_path.display(),
                rows_seen,
                options.column
            ))
        })?;
        let value: f64 = field.trim().parse().map_err(|_| {
            Error::InvalidFormat(format!(
                "{}: row {} value {:?} is not a number",
                file_path.display(),
                rows_seen,
                field
            ))
        })?;
        data.push(round_to(value, options.decimals));
    }

    if rows_seen < skip {
        return Err(Error::InvalidFormat(format!(
            "{}: expected {} metadata rows, file has {}",
            file_path.display(),
            skip,
            rows_seen
        )));
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("voltage_spikes_csv_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn metadata_block(rows: usize) -> String {
        (0..rows)
            .map(|i| format!("Meta{i},value{i}\n"))
            .collect::<String>()
    }

    #[test]
    fn test_skips_metadata_and_reads_third_column() {
        let contents = format!(
            "{}0,0.000,0.123456789,x\n1,0.001,-1.5,x\n2,0.002, 2.25 ,x\n",
            metadata_block(22)
        );
        let path = write_fixture("with_metadata.csv", &contents);

        let data = read_csv(&path, &CsvOptions::default()).unwrap();
        assert_eq!(data, vec![0.12345679, -1.5, 2.25]);
    }

    #[test]
    fn test_without_metadata() {
        let path = write_fixture("plain.csv", "0,0.0,1.0\n1,0.1,2.0\n");
        let options = CsvOptions {
            has_metadata: false,
            ..CsvOptions::default()
        };

        assert_eq!(read_csv(&path, &options).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_full_precision() {
        let path = write_fixture("precise.csv", "0,0,0.123456789012\n");
        let options = CsvOptions {
            has_metadata: false,
            decimals: None,
            ..CsvOptions::default()
        };

        assert_eq!(read_csv(&path, &options).unwrap(), vec![0.123456789012]);
    }

    #[test]
    fn test_reports_bad_rows() {
        let options = CsvOptions {
            has_metadata: false,
            ..CsvOptions::default()
        };

        let path = write_fixture("short_row.csv", "0,0.0,1.0\n1,0.1\n");
        let err = read_csv(&path, &options).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");

        let path = write_fixture("not_number.csv", "0,0.0,abc\n");
        assert!(matches!(read_csv(&path, &options), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_truncated_metadata() {
        let path = write_fixture("truncated.csv", &metadata_block(5));
        assert!(matches!(
            read_csv(&path, &CsvOptions::default()),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("voltage_spikes_does_not_exist.csv");
        assert!(read_csv(&path, &CsvOptions::default()).is_err());
    }
}
