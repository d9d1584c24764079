use colored::Colorize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

use crate::config::{Config, SimulationConfig};
use crate::error::{Error, Result};
use crate::processing::detectors::adaptive_threshold::{AdaptiveThresholdDetector, Signal};
use crate::processing::detectors::DetectorInstance;

// -----------------------------------------------------------------------------
// SETUP FOR THE SIMULATED SIGNALS
// -----------------------------------------------------------------------------

const INCREMENT_TIME: f64 = 0.1;

const BACKGROUND_I_FREQ: f64 = 0.5;
const BACKGROUND_II_FREQ: f64 = 1.0;
const BACKGROUND_III_FREQ: f64 = 2.0;

const MAX_BAR_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedSample {
    pub value: f64,
    pub spike: bool,
}

/// Slow multi-tone baseline with uniform noise and occasional single-sample
/// upward spikes. Deterministic for a given seed.
pub struct SimulatedSignal {
    config: SimulationConfig,
    rng: StdRng,
    time: f64,
}

impl SimulatedSignal {
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.spike_probability) {
            return Err(Error::InvalidConfig(format!(
                "spike probability must be between 0 and 1, got {}",
                config.spike_probability
            )));
        }
        if !(config.noise_amplitude >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "noise amplitude must not be negative, got {}",
                config.noise_amplitude
            )));
        }
        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            time: 0.0,
        })
    }
}

impl Iterator for SimulatedSignal {
    type Item = SimulatedSample;

    fn next(&mut self) -> Option<SimulatedSample> {
        let baseline = self.config.baseline_amplitude;
        let noise = (self.rng.gen::<f64>() * 2.0 - 1.0) * self.config.noise_amplitude;
        let mut value = 10.0 * (BACKGROUND_I_FREQ * self.time).sin()
            + baseline / 2.0 * (BACKGROUND_II_FREQ * self.time).sin()
            + baseline
            + 5.0 * (BACKGROUND_III_FREQ * self.time).sin()
            + noise;

        let spike = self.rng.gen_bool(self.config.spike_probability);
        if spike {
            value += self.config.spike_amplitude;
        }

        self.time += INCREMENT_TIME;
        Some(SimulatedSample { value, spike })
    }
}

// -----------------------------------------------------------------------------
// RUN CODE
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSummary {
    pub injected: Vec<usize>,
    pub detected: Vec<usize>,
}

/// Streams `samples` simulated values through the detector one at a time and
/// draws one bar per sample to `out`.
pub fn run_simulation<W: Write>(
    config: &Config,
    samples: usize,
    seed: u64,
    out: &mut W,
) -> Result<SimulationSummary> {
    let mut detector = AdaptiveThresholdDetector::new(config.detector)?;
    let signal = SimulatedSignal::new(config.simulation.clone(), seed)?;
    let mut summary = SimulationSummary::default();

    for (index, simulated) in signal.take(samples).enumerate() {
        let step = detector.process_sample(simulated.value);
        if simulated.spike {
            summary.injected.push(index);
        }

        let alert = if step.signal == Signal::Positive {
            summary.detected.push(index);
            "Peak Detected !".red()
        } else {
            "               ".white()
        };

        let raw_len = (simulated.value.max(0.0) as usize).min(MAX_BAR_LEN);
        let avg_len = (step.avg.max(0.0) as usize).min(raw_len);
        writeln!(
            out,
            "{}{}{}",
            alert,
            "|".repeat(avg_len).green(),
            "|".repeat(raw_len - avg_len).white()
        )?;
    }

    Ok(summary)
}
