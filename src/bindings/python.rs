use crate::error::Error;
use crate::processing::detectors::adaptive_threshold::{
    thresholding_algo as run_thresholding_algo, AdaptiveThresholdConfig,
    AdaptiveThresholdDetector,
};
use crate::processing::detectors::DetectorInstance;

use std::collections::HashMap;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::Io(e) => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// Batch detector. Returns a dict with `signals`, `filteredY`, `avgFilter`
/// and `stdFilter`, each as long as `y`.
#[pyfunction]
pub fn thresholding_algo(
    y: Vec<f64>,
    lag: usize,
    threshold: f64,
    influence: f64,
) -> PyResult<HashMap<String, Vec<f64>>> {
    let config = AdaptiveThresholdConfig::new(lag, threshold, influence);
    let detection = run_thresholding_algo(&y, &config).map_err(to_py_err)?;

    let mut output = HashMap::new();
    output.insert(
        "signals".to_string(),
        detection.signals.iter().map(|s| f64::from(s.value())).collect(),
    );
    output.insert("filteredY".to_string(), detection.filtered_y);
    output.insert("avgFilter".to_string(), detection.avg_filter);
    output.insert("stdFilter".to_string(), detection.std_filter);
    Ok(output)
}

#[pyclass(name = "PeakDetector")]
pub struct PyPeakDetector {
    detector: AdaptiveThresholdDetector,
}

#[pymethods]
impl PyPeakDetector {
    #[new]
    pub fn new(lag: usize, threshold: f64, influence: f64) -> PyResult<Self> {
        let config = AdaptiveThresholdConfig::new(lag, threshold, influence);
        Ok(PyPeakDetector {
            detector: AdaptiveThresholdDetector::new(config).map_err(to_py_err)?,
        })
    }

    /// Returns `(signal, filtered, avg, std)` for one sample.
    pub fn process_sample(&mut self, sample: f64) -> (i8, f64, f64, f64) {
        let step = self.detector.process_sample(sample);
        (step.signal.value(), step.filtered, step.avg, step.std)
    }

    pub fn run_chunk(&mut self, data: Vec<f64>) -> Vec<i8> {
        data.into_iter()
            .map(|sample| self.detector.process_sample(sample).signal.value())
            .collect()
    }

    pub fn reset(&mut self) {
        self.detector.reset();
    }
}

/// A Python module implemented in Rust.
#[pymodule]
pub fn voltage_spikes(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(thresholding_algo, m)?)?;
    m.add_class::<PyPeakDetector>()?;
    Ok(())
}
