// src/config/mod.rs
use crate::data::CsvOptions;
use crate::error::Result;
use crate::processing::detectors::adaptive_threshold::AdaptiveThresholdConfig;
use crate::processing::filters::high_pass::{HighPassFilter, HighPassFilterConfig};
use crate::processing::filters::moving_average::{MovingAverage, MovingAverageConfig};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub detector: AdaptiveThresholdConfig,
    pub loader: CsvOptions,
    pub filters: FiltersConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FiltersConfig {
    pub high_pass: Option<HighPassFilterConfig>,
    pub moving_average: Option<MovingAverageConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enable_debug_logging: bool,
    pub log_dir: PathBuf,
    pub log_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_debug_logging: false,
            log_dir: PathBuf::from("logs"),
            log_file: "voltage_spikes.log".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub baseline_amplitude: f64,
    pub noise_amplitude: f64,
    pub spike_probability: f64,
    pub spike_amplitude: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            baseline_amplitude: 70.0,
            noise_amplitude: 5.0,
            spike_probability: 0.02,
            spike_amplitude: 40.0,
        }
    }
}

impl Config {
    /// Checks everything that can be checked without a signal in hand.
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        if let Some(high_pass) = &self.filters.high_pass {
            HighPassFilter::new(high_pass.clone())?;
        }
        if let Some(moving_average) = &self.filters.moving_average {
            MovingAverage::new(moving_average.clone())?;
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config_str = fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(config)?;
    fs::write(path, yaml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("voltage_spikes_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "detector:\n  lag: 5\n  threshold: 3.0\n  influence: 0.25\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.detector, AdaptiveThresholdConfig::new(5, 3.0, 0.25));
        assert_eq!(config.loader, CsvOptions::default());
        assert!(config.filters.high_pass.is_none());
        assert!(!config.logging.enable_debug_logging);
    }

    #[test]
    fn test_filter_order_defaults_to_five() {
        let yaml = "filters:\n  high_pass:\n    cutoff: 1.0\n    fs: 1000.0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.filters.high_pass.unwrap().order, 5);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip.yaml");
        let mut config = Config::default();
        config.detector.lag = 12;
        config.filters.moving_average = Some(MovingAverageConfig { window: 3 });

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_invalid_detector() {
        let path = temp_path("invalid.yaml");
        fs::write(&path, "detector:\n  lag: 5\n  threshold: -1.0\n  influence: 0.0\n").unwrap();

        assert!(matches!(load_config(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let path = temp_path("malformed.yaml");
        fs::write(&path, "detector: [1, 2").unwrap();

        assert!(matches!(load_config(&path), Err(Error::Config(_))));
    }
}
