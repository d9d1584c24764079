pub mod bindings;
pub mod config;
pub mod data;
pub mod error;
pub mod local;
pub mod processing;
pub mod utils;

pub use config::Config;
pub use data::Dataset;
pub use error::{Error, Result};
pub use processing::detectors::adaptive_threshold::{
    thresholding_algo, AdaptiveThresholdConfig, AdaptiveThresholdDetector, PeakDetection, Signal,
};
