use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::data::{read_csv, Dataset};
use crate::error::Result;
use crate::processing::detectors::adaptive_threshold::PeakDetection;
use crate::processing::signal_processor::{RecordingReport, SignalProcessor};

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    label: &'a str,
    source: String,
    samples: usize,
    peaks: usize,
}

/// Writes one row per index: the detector input and everything derived from it.
pub fn write_detection_csv<P: AsRef<Path>>(
    path: P,
    detection: &PeakDetection,
    samples: &[f64],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in detection.rows(samples) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn label_for(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Runs the configured pipeline over a single recording. The label is the
/// name of the folder holding the file.
pub fn process_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<RecordingReport> {
    let path = path.as_ref();
    let samples = read_csv(path, &config.loader)?;
    let processor = SignalProcessor::new(config)?;
    processor.run_recording(&label_for(path), path, &samples)
}

/// Loads every labelled folder under `root` (or only `labels`), runs the
/// pipeline on each recording and, with `output_dir`, writes one result file
/// per recording plus `summary.csv`.
pub fn process_dataset<P: AsRef<Path>>(
    root: P,
    config: &Config,
    labels: Option<&[String]>,
    output_dir: Option<&Path>,
) -> Result<Vec<RecordingReport>> {
    let dataset = match labels {
        Some(labels) => Dataset::from_labeled_folders(&root, labels, &config.loader)?,
        None => Dataset::from_parent_folder(&root, &config.loader)?,
    };

    let processor = SignalProcessor::new(config)?;
    let reports = processor.run_dataset(&dataset)?;

    if let Some(output_dir) = output_dir {
        write_reports(output_dir, &reports)?;
    }

    Ok(reports)
}

fn output_name(report: &RecordingReport) -> PathBuf {
    let stem = report
        .source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());
    if report.label.is_empty() {
        PathBuf::from(format!("{stem}.csv"))
    } else {
        PathBuf::from(format!("{}_{}.csv", report.label, stem))
    }
}

pub fn write_reports(output_dir: &Path, reports: &[RecordingReport]) -> Result<()> {
    fs::create_dir_all(output_dir)?;

    let mut summary = csv::Writer::from_path(output_dir.join("summary.csv"))?;
    for report in reports {
        write_detection_csv(
            output_dir.join(output_name(report)),
            &report.detection,
            &report.signal,
        )?;
        summary.serialize(SummaryRow {
            label: &report.label,
            source: report.source.display().to_string(),
            samples: report.signal.len(),
            peaks: report.peak_count(),
        })?;
    }
    summary.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::detectors::adaptive_threshold::{
        thresholding_algo, AdaptiveThresholdConfig,
    };

    fn fixture_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "voltage_spikes_process_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    fn write_recording(path: &Path, values: &[f64]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let rows: String = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{i},0,{v}\n"))
            .collect();
        fs::write(path, rows).unwrap();
    }

    fn config() -> Config {
        let mut config = Config {
            detector: AdaptiveThresholdConfig::new(3, 3.0, 0.0),
            ..Config::default()
        };
        config.loader.has_metadata = false;
        config
    }

    #[test]
    fn test_detection_csv_layout() {
        let root = fixture_root("layout");
        let samples = [1.0, 1.0, 1.0, 5.0];
        let detection =
            thresholding_algo(&samples, &AdaptiveThresholdConfig::new(3, 3.0, 0.0)).unwrap();

        let path = root.join("out.csv");
        write_detection_csv(&path, &detection, &samples).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "index,sample,signal,filtered_y,avg_filter,std_filter"
        );
        assert_eq!(lines[4], "3,5.0,1,1.0,1.0,0.0");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_process_file_labels_by_folder() {
        let root = fixture_root("single");
        let path = root.join("3").join("r0.csv");
        write_recording(&path, &[1.0, 1.0, 1.0, 9.0, 1.0]);

        let report = process_file(&path, &config()).unwrap();
        assert_eq!(report.label, "3");
        assert_eq!(report.peak_indices(), vec![3]);
    }

    #[test]
    fn test_process_dataset_writes_outputs() {
        let root = fixture_root("dataset");
        write_recording(&root.join("1").join("a.csv"), &[1.0, 1.0, 1.0, 9.0, 1.0]);
        write_recording(&root.join("2").join("b.csv"), &[1.0, 1.0, 1.0, 1.0, 1.0]);
        let out = root.join("results");

        let reports = process_dataset(&root, &config(), None, Some(out.as_path())).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].peak_count(), 1);
        assert_eq!(reports[1].peak_count(), 0);

        assert!(out.join("1_a.csv").exists());
        assert!(out.join("2_b.csv").exists());
        let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
        assert!(summary.starts_with("label,source,samples,peaks\n"));
        assert!(summary.contains(",5,1\n"));
    }

    #[test]
    fn test_process_dataset_selected_labels() {
        let root = fixture_root("selected");
        write_recording(&root.join("1").join("a.csv"), &[1.0, 1.0, 1.0]);
        write_recording(&root.join("2").join("a.csv"), &[1.0, 1.0, 1.0]);

        let labels = vec!["2".to_string()];
        let reports = process_dataset(&root, &config(), Some(labels.as_slice()), None).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].label, "2");
    }
}
