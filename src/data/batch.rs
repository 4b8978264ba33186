use serde::{Deserialize, Serialize};

use super::{InputFunction, TimeActivityCurve};
use crate::error::InputError;

/// How input functions map onto the curves of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputAssignment {
    /// One input function shared by every curve (the common case for
    /// whole-scan voxel batches).
    Shared(InputFunction),
    /// One input function per curve, in batch order.
    PerCurve(Vec<InputFunction>),
}

/// A validated batch of time-activity curves with their input function(s).
///
/// The batch index is the unit of independence: nothing in the engine
/// couples results across curves. Construction performs all pre-run input
/// validation; an invalid batch never reaches the sampler.
///
/// # Example
///
/// ```
/// use petabc::{InputAssignment, InputFunction, TacBatch, TimeActivityCurve};
///
/// let times = vec![0.5, 1.5, 2.5];
/// let input = InputFunction::new(times.clone(), vec![80.0, 40.0, 20.0]).unwrap();
/// let curve = TimeActivityCurve::new(times, vec![4.0, 9.0, 11.0]).unwrap();
/// let batch = TacBatch::new(vec![curve], InputAssignment::Shared(input)).unwrap();
/// assert_eq!(batch.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacBatch {
    curves: Vec<TimeActivityCurve>,
    input: InputAssignment,
}

impl TacBatch {
    pub fn new(
        curves: Vec<TimeActivityCurve>,
        input: InputAssignment,
    ) -> Result<Self, InputError> {
        if curves.is_empty() {
            return Err(InputError::EmptyBatch);
        }
        if let InputAssignment::PerCurve(inputs) = &input {
            if inputs.len() != curves.len() {
                return Err(InputError::InputCountMismatch {
                    curves: curves.len(),
                    inputs: inputs.len(),
                });
            }
        }
        let batch = Self { curves, input };
        for (index, curve) in batch.curves.iter().enumerate() {
            if curve.times() != batch.input_for(index).times() {
                return Err(InputError::GridMismatch { index });
            }
            // Surface bad derived durations now rather than mid-run.
            curve.grid()?;
        }
        Ok(batch)
    }

    pub fn curves(&self) -> &[TimeActivityCurve] {
        &self.curves
    }

    /// The input function paired with curve `index`.
    pub fn input_for(&self, index: usize) -> &InputFunction {
        match &self.input {
            InputAssignment::Shared(input) => input,
            InputAssignment::PerCurve(inputs) => &inputs[index],
        }
    }

    /// Number of curves in the batch.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
