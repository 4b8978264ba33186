use serde::{Deserialize, Serialize};

use super::validate_series;
use crate::error::InputError;

/// Plasma or whole-blood input function sampled on a frame grid.
///
/// Read-only input to simulation. The engine requires the input grid to
/// match the grid of every curve it is paired with; the whole-blood and
/// plasma concentrations are taken to be equal, so a single series serves
/// both the convolution and the vascular term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFunction {
    times: Vec<f64>,
    activities: Vec<f64>,
}

impl InputFunction {
    pub fn new(times: Vec<f64>, activities: Vec<f64>) -> Result<Self, InputError> {
        validate_series(&times, &activities)?;
        Ok(Self { times, activities })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn activities(&self) -> &[f64] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_mismatch() {
        let err = InputFunction::new(vec![0.5, 1.5], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            InputError::LengthMismatch {
                times: 2,
                values: 1
            }
        );
    }
}
