pub mod high_pass;
pub mod moving_average;

use crate::error::Result;

/// Offline preprocessing step applied to a whole recording before detection.
pub trait FilterInstance: Send + Sync {
    fn id(&self) -> &str;
    fn apply(&self, signal: &[f64]) -> Result<Vec<f64>>;
}
