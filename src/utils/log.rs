use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Logs a message to a file with timestamp
///
/// # Arguments
///
/// * `log_dir` - Directory holding the log file (created if missing)
/// * `filename` - The name of the log file
/// * `message` - The message to log
pub fn log_to_file<P: AsRef<Path>>(log_dir: P, filename: &str, message: &str) -> io::Result<()> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(filename))?;

    let timestamp = Local::now().to_rfc3339();

    writeln!(file, "[{}] {}", timestamp, message)?;
    file.flush()?;

    Ok(())
}

/// Logs a message under a formatted header
pub fn log_with_header<P: AsRef<Path>>(
    log_dir: P,
    filename: &str,
    header: &str,
    message: &str,
) -> io::Result<()> {
    let formatted_message = format!(
        "===== {} =====\n{}\n====================",
        header, message
    );
    log_to_file(log_dir, filename, &formatted_message)
}

/// Appends a row to a CSV file, writing `headers` first if the file is new
pub fn log_csv<P: AsRef<Path>>(
    log_dir: P,
    filename: &str,
    headers: &[&str],
    data: &[&str],
) -> io::Result<()> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)?;

    let path = log_dir.join(filename);
    let file_exists = path.exists();

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let mut writer = csv::Writer::from_writer(file);

    if !file_exists && !headers.is_empty() {
        writer.write_record(headers)?;
    }
    writer.write_record(data)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "voltage_spikes_logs_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_log_to_file_appends() {
        let dir = log_dir("append");
        log_to_file(&dir, "run.log", "first").unwrap();
        log_with_header(&dir, "run.log", "Summary", "second").unwrap();

        let contents = fs::read_to_string(dir.join("run.log")).unwrap();
        assert!(contents.contains("] first"));
        assert!(contents.contains("===== Summary =====\nsecond"));
        assert!(contents.find("first").unwrap() < contents.find("second").unwrap());
    }

    #[test]
    fn test_log_csv_writes_headers_once() {
        let dir = log_dir("csv");
        log_csv(&dir, "peaks.csv", &["label", "peaks"], &["1", "3"]).unwrap();
        log_csv(&dir, "peaks.csv", &["label", "peaks"], &["2", "0"]).unwrap();

        let contents = fs::read_to_string(dir.join("peaks.csv")).unwrap();
        assert_eq!(contents, "label,peaks\n1,3\n2,0\n");
    }
}
