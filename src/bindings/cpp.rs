use crate::processing::detectors::adaptive_threshold::{
    AdaptiveThresholdConfig, AdaptiveThresholdDetector, Signal,
};
use crate::processing::detectors::DetectorInstance;

use std::os::raw::c_void;

/// Returns null if the parameters are invalid.
#[no_mangle]
pub extern "C" fn create_peak_detector(lag: usize, threshold: f64, influence: f64) -> *mut c_void {
    let config = AdaptiveThresholdConfig::new(lag, threshold, influence);
    match AdaptiveThresholdDetector::new(config) {
        Ok(detector) => Box::into_raw(Box::new(detector)) as *mut c_void,
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn delete_peak_detector(detector_ptr: *mut c_void) {
    if !detector_ptr.is_null() {
        unsafe {
            drop(Box::from_raw(detector_ptr as *mut AdaptiveThresholdDetector));
        }
    }
}

/// Classifies one sample: -1, 0 or 1. A null detector yields 0.
#[no_mangle]
pub extern "C" fn process_peak_sample(detector_ptr: *mut c_void, sample: f64) -> i8 {
    if detector_ptr.is_null() {
        return 0;
    }
    let detector = unsafe { &mut *(detector_ptr as *mut AdaptiveThresholdDetector) };
    detector.process_sample(sample).signal.value()
}

/// Classifies `length` samples, writing each signal to `signals` when it is
/// not null. Returns true if any sample was a positive peak.
#[no_mangle]
pub extern "C" fn process_peak_chunk(
    detector_ptr: *mut c_void,
    data: *const f64,
    length: usize,
    signals: *mut i8,
) -> bool {
    if detector_ptr.is_null() || data.is_null() {
        return false;
    }
    let detector = unsafe { &mut *(detector_ptr as *mut AdaptiveThresholdDetector) };
    let data_slice = unsafe { std::slice::from_raw_parts(data, length) };

    let mut peak_found = false;
    for (i, &sample) in data_slice.iter().enumerate() {
        let signal = detector.process_sample(sample).signal;
        peak_found |= signal == Signal::Positive;
        if !signals.is_null() {
            unsafe {
                *signals.add(i) = signal.value();
            }
        }
    }

    peak_found
}

#[no_mangle]
pub extern "C" fn reset_peak_detector(detector_ptr: *mut c_void) {
    if detector_ptr.is_null() {
        return;
    }
    let detector = unsafe { &mut *(detector_ptr as *mut AdaptiveThresholdDetector) };
    detector.reset();
}
