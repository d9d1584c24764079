use super::FilterInstance;
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MovingAverageConfig {
    pub window: usize,
}

pub struct MovingAverage {
    config: MovingAverageConfig,
}

impl MovingAverage {
    pub fn new(config: MovingAverageConfig) -> Result<Self> {
        if config.window == 0 {
            return Err(Error::InvalidConfig(
                "moving average window must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Trailing mean of every full window, computed from a running cumulative
    /// sum. The output is `window - 1` samples shorter than the input.
    pub fn compute(&self, data: &[f64]) -> Result<Vec<f64>> {
        let window = self.config.window;
        if data.len() < window {
            return Err(Error::SignalTooShort {
                required: window - 1,
                actual: data.len(),
            });
        }

        let mut cumsum = Vec::with_capacity(data.len());
        let mut total = 0.0;
        for &x in data {
            total += x;
            cumsum.push(total);
        }

        let size = window as f64;
        Ok((window - 1..data.len())
            .map(|i| {
                let head = if i >= window { cumsum[i - window] } else { 0.0 };
                (cumsum[i] - head) / size
            })
            .collect())
    }
}

impl FilterInstance for MovingAverage {
    fn id(&self) -> &str {
        "moving_average"
    }

    fn apply(&self, signal: &[f64]) -> Result<Vec<f64>> {
        self.compute(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_values() {
        let ma = MovingAverage::new(MovingAverageConfig { window: 2 }).unwrap();
        let out = ma.compute(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(out, vec![1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let ma = MovingAverage::new(MovingAverageConfig { window: 1 }).unwrap();
        let data = [0.25, -1.0, 8.0];
        assert_eq!(ma.compute(&data).unwrap(), data.to_vec());
    }

    #[test]
    fn test_window_equal_to_length() {
        let ma = MovingAverage::new(MovingAverageConfig { window: 4 }).unwrap();
        assert_eq!(ma.compute(&[1.0, 2.0, 3.0, 6.0]).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_invalid_window() {
        assert!(MovingAverage::new(MovingAverageConfig { window: 0 }).is_err());

        let ma = MovingAverage::new(MovingAverageConfig { window: 5 }).unwrap();
        assert!(matches!(
            ma.compute(&[1.0, 2.0]),
            Err(Error::SignalTooShort { .. })
        ));
    }
}
