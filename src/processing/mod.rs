pub mod detectors;
pub mod filters;
pub mod signal_processor;
