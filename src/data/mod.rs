//! Data containers for time-activity curves, input functions and batches.
//!
//! All validation happens at construction time, so the inference engine can
//! assume well-formed data: finite values, strictly increasing frame times,
//! and matching time grids between each curve and its input function.

mod batch;
mod curve;
mod input;

pub use batch::{InputAssignment, TacBatch};
pub use curve::{TimeActivityCurve, TimeGrid};
pub use input::InputFunction;

use crate::error::InputError;

/// Shared validation for a (times, values) series.
pub(crate) fn validate_series(times: &[f64], values: &[f64]) -> Result<(), InputError> {
    if times.is_empty() {
        return Err(InputError::Empty);
    }
    if times.len() != values.len() {
        return Err(InputError::LengthMismatch {
            times: times.len(),
            values: values.len(),
        });
    }
    let mut prev = -1.0;
    for &t in times {
        if !t.is_finite() || t < 0.0 || t <= prev {
            return Err(InputError::NonMonotoneTimes);
        }
        prev = t;
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(InputError::NonFinite);
    }
    Ok(())
}
