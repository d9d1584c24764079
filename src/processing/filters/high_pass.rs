use super::FilterInstance;
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

fn default_order() -> usize {
    5
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HighPassFilterConfig {
    pub cutoff: f64,
    pub fs: f64,
    #[serde(default = "default_order")]
    pub order: usize,
}

/// Normalised (a0 = 1) second-order section. First-order sections have
/// `b[2] == a[2] == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SecondOrderSection {
    b: [f64; 3],
    a: [f64; 3],
}

impl SecondOrderSection {
    fn high_pass(omega: f64, q: f64) -> Self {
        let alpha = f64::sin(omega) / (2.0 * q);
        let cos = f64::cos(omega);
        let a0 = 1.0 + alpha;

        SecondOrderSection {
            b: [(1.0 + cos) / 2.0 / a0, -(1.0 + cos) / a0, (1.0 + cos) / 2.0 / a0],
            a: [1.0, -2.0 * cos / a0, (1.0 - alpha) / a0],
        }
    }

    fn first_order_high_pass(omega: f64) -> Self {
        let k = (omega / 2.0).tan();
        SecondOrderSection {
            b: [1.0 / (1.0 + k), -1.0 / (1.0 + k), 0.0],
            a: [1.0, (k - 1.0) / (k + 1.0), 0.0],
        }
    }

    fn is_first_order(&self) -> bool {
        self.b[2] == 0.0 && self.a[2] == 0.0
    }

    fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }

    /// Internal state that makes a constant `input` produce its steady-state
    /// output from the first sample.
    fn steady_state(&self, input: f64) -> [f64; 2] {
        let output = input * self.dc_gain();
        [
            (self.b[1] + self.b[2]) * input - (self.a[1] + self.a[2]) * output,
            self.b[2] * input - self.a[2] * output,
        ]
    }

    // Transposed direct form II
    fn calculate_output(&self, input: f64, state: &mut [f64; 2]) -> f64 {
        let output = self.b[0] * input + state[0];
        state[0] = self.b[1] * input - self.a[1] * output + state[1];
        state[1] = self.b[2] * input - self.a[2] * output;
        output
    }
}

/// Butterworth high-pass filter applied forward and backward (zero phase).
pub struct HighPassFilter {
    config: HighPassFilterConfig,
    sections: Vec<SecondOrderSection>,
}

impl HighPassFilter {
    pub fn new(config: HighPassFilterConfig) -> Result<Self> {
        if !(config.fs > 0.0 && config.fs.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "sampling rate must be positive, got {}",
                config.fs
            )));
        }
        let nyquist = 0.5 * config.fs;
        if !(config.cutoff > 0.0 && config.cutoff < nyquist) {
            return Err(Error::InvalidConfig(format!(
                "cutoff must lie between 0 and the Nyquist frequency ({nyquist}), got {}",
                config.cutoff
            )));
        }
        if config.order == 0 {
            return Err(Error::InvalidConfig(
                "filter order must be at least 1".to_string(),
            ));
        }

        let sections = Self::design(config.cutoff, config.fs, config.order);
        Ok(Self { config, sections })
    }

    pub fn config(&self) -> &HighPassFilterConfig {
        &self.config
    }

    // Pole pairs of the analog prototype become biquads with Q = 1 / (2 cos psi);
    // an odd order leaves one real pole.
    fn design(cutoff: f64, fs: f64, order: usize) -> Vec<SecondOrderSection> {
        let omega = 2.0 * PI * cutoff / fs;
        let odd = order % 2;
        let mut sections: Vec<SecondOrderSection> = (1..=order / 2)
            .map(|k| {
                let psi = PI * (2 * k - 1 + odd) as f64 / (2 * order) as f64;
                SecondOrderSection::high_pass(omega, 1.0 / (2.0 * psi.cos()))
            })
            .collect();
        if odd == 1 {
            sections.push(SecondOrderSection::first_order_high_pass(omega));
        }
        sections
    }

    /// Number of samples reflected onto each end before filtering.
    pub fn padlen(&self) -> usize {
        let first_order = self.sections.iter().filter(|s| s.is_first_order()).count();
        3 * (2 * self.sections.len() + 1 - first_order)
    }

    fn unit_step_state(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.sections
            .iter()
            .map(|section| {
                let state = section.steady_state(scale);
                scale *= section.dc_gain();
                state
            })
            .collect()
    }

    fn filter_pass(&self, data: &[f64], initial: &[[f64; 2]]) -> Vec<f64> {
        let x0 = data.first().copied().unwrap_or(0.0);
        let mut states: Vec<[f64; 2]> = initial
            .iter()
            .map(|state| [state[0] * x0, state[1] * x0])
            .collect();

        data.iter()
            .map(|&sample| {
                self.sections
                    .iter()
                    .zip(states.iter_mut())
                    .fold(sample, |input, (section, state)| {
                        section.calculate_output(input, state)
                    })
            })
            .collect()
    }

    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let padlen = self.padlen();
        let n = signal.len();
        if n <= padlen {
            return Err(Error::SignalTooShort {
                required: padlen,
                actual: n,
            });
        }

        // Odd extension around both end points
        let first = signal[0];
        let last = signal[n - 1];
        let mut extended = Vec::with_capacity(n + 2 * padlen);
        extended.extend((1..=padlen).rev().map(|i| 2.0 * first - signal[i]));
        extended.extend_from_slice(signal);
        extended.extend((1..=padlen).map(|i| 2.0 * last - signal[n - 1 - i]));

        let zi = self.unit_step_state();
        let mut forward = self.filter_pass(&extended, &zi);
        forward.reverse();
        let mut backward = self.filter_pass(&forward, &zi);
        backward.reverse();

        Ok(backward[padlen..padlen + n].to_vec())
    }
}

impl FilterInstance for HighPassFilter {
    fn id(&self) -> &str {
        "high_pass"
    }

    fn apply(&self, signal: &[f64]) -> Result<Vec<f64>> {
        self.filtfilt(signal)
    }
}
