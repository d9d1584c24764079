use super::detectors::adaptive_threshold::{thresholding_algo, AdaptiveThresholdConfig, PeakDetection};
use super::filters::high_pass::HighPassFilter;
use super::filters::moving_average::MovingAverage;
use super::filters::FilterInstance;
use crate::config::{Config, LoggingConfig};
use crate::data::Dataset;
use crate::error::Result;
use crate::utils::log::log_to_file;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

// -----------------------------------------------------------------------------
// RUST CORE LOGIC
// -----------------------------------------------------------------------------

/// Detector output for one recording together with the signal it ran on.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingReport {
    pub label: String,
    pub source: PathBuf,
    /// Recording after the filter chain; the detector input.
    pub signal: Vec<f64>,
    pub detection: PeakDetection,
}

impl RecordingReport {
    pub fn peak_indices(&self) -> Vec<usize> {
        self.detection.peak_indices()
    }

    pub fn peak_count(&self) -> usize {
        self.peak_indices().len()
    }
}

// SIGNAL PROCESSOR COMPONENT --------------------------------------------------

pub struct SignalProcessor {
    detector: AdaptiveThresholdConfig,
    filters: Vec<Box<dyn FilterInstance>>,
    logging: LoggingConfig,
}

impl SignalProcessor {
    /// Builds the configured filter chain: high-pass first, then the moving
    /// average.
    pub fn new(config: &Config) -> Result<Self> {
        config.detector.validate()?;

        let mut processor = SignalProcessor {
            detector: config.detector,
            filters: Vec::new(),
            logging: config.logging.clone(),
        };
        if let Some(high_pass) = &config.filters.high_pass {
            processor.add_filter(Box::new(HighPassFilter::new(high_pass.clone())?));
        }
        if let Some(moving_average) = &config.filters.moving_average {
            processor.add_filter(Box::new(MovingAverage::new(moving_average.clone())?));
        }
        Ok(processor)
    }

    pub fn add_filter(&mut self, filter: Box<dyn FilterInstance>) {
        self.filters.push(filter);
    }

    pub fn filter_ids(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.id()).collect()
    }

    pub fn detector_config(&self) -> &AdaptiveThresholdConfig {
        &self.detector
    }

    pub fn preprocess(&self, samples: &[f64]) -> Result<Vec<f64>> {
        let mut signal = samples.to_vec();
        for filter in &self.filters {
            signal = filter.apply(&signal)?;
        }
        Ok(signal)
    }

    pub fn run(&self, samples: &[f64]) -> Result<PeakDetection> {
        let signal = self.preprocess(samples)?;
        thresholding_algo(&signal, &self.detector)
    }

    pub fn run_recording(
        &self,
        label: &str,
        source: &Path,
        samples: &[f64],
    ) -> Result<RecordingReport> {
        let start = Instant::now();

        let signal = self.preprocess(samples)?;
        let detection = thresholding_algo(&signal, &self.detector)?;
        let report = RecordingReport {
            label: label.to_string(),
            source: source.to_path_buf(),
            signal,
            detection,
        };

        if self.logging.enable_debug_logging {
            self.log_report(&report, start)?;
        }

        Ok(report)
    }

    /// Runs every recording of `dataset` independently, in parallel. Reports
    /// come back in dataset order.
    pub fn run_dataset(&self, dataset: &Dataset) -> Result<Vec<RecordingReport>> {
        let recordings: Vec<(&str, &Path, &[f64])> = dataset.iter().collect();
        recordings
            .par_iter()
            .map(|&(label, source, samples)| self.run_recording(label, source, samples))
            .collect()
    }

    fn log_report(&self, report: &RecordingReport, start: Instant) -> Result<()> {
        let peaks = report.peak_indices();
        let message = format!(
            "label: {}, source: {}, samples: {}, peaks: {}, elapsed: {:?}",
            report.label,
            report.source.display(),
            report.signal.len(),
            peaks.len(),
            start.elapsed()
        );
        log_to_file(&self.logging.log_dir, &self.logging.log_file, &message)?;

        for index in peaks {
            let message = format!(
                "{} peak detected - index: {}, sample: {}, avg: {}, std: {}",
                report.label,
                index,
                report.signal[index],
                report.detection.avg_filter[index],
                report.detection.std_filter[index]
            );
            log_to_file(&self.logging.log_dir, &self.logging.log_file, &message)?;
        }
        Ok(())
    }
}
