use serde::{Deserialize, Serialize};

use super::validate_series;
use crate::error::InputError;

/// Measured tracer concentration over time for one voxel or region.
///
/// Immutable once constructed. Frame times are the frame midpoints relative
/// to tracer administration, strictly increasing. Optional per-frame weights
/// (inverse measurement variance) feed the weighted discrepancy; optional
/// explicit frame durations override the spacing derived from the midpoints.
///
/// # Example
///
/// ```
/// use petabc::TimeActivityCurve;
///
/// let curve = TimeActivityCurve::new(
///     vec![0.5, 1.5, 2.5, 3.5],
///     vec![0.0, 12.4, 30.1, 41.7],
/// )
/// .unwrap();
/// assert_eq!(curve.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeActivityCurve {
    times: Vec<f64>,
    activities: Vec<f64>,
    weights: Option<Vec<f64>>,
    durations: Option<Vec<f64>>,
}

impl TimeActivityCurve {
    /// Construct a curve from frame midpoint times and measured activities.
    pub fn new(times: Vec<f64>, activities: Vec<f64>) -> Result<Self, InputError> {
        validate_series(&times, &activities)?;
        Ok(Self {
            times,
            activities,
            weights: None,
            durations: None,
        })
    }

    /// Attach per-frame inverse-variance weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self, InputError> {
        if weights.len() != self.times.len() {
            return Err(InputError::WeightLengthMismatch {
                weights: weights.len(),
                frames: self.times.len(),
            });
        }
        if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(InputError::BadWeight);
        }
        self.weights = Some(weights);
        Ok(self)
    }

    /// Attach explicit frame durations (scanner frame lengths).
    ///
    /// Without explicit durations the grid derives them from consecutive
    /// midpoint spacing.
    pub fn with_frame_durations(mut self, durations: Vec<f64>) -> Result<Self, InputError> {
        if durations.len() != self.times.len() {
            return Err(InputError::DurationLengthMismatch {
                durations: durations.len(),
                frames: self.times.len(),
            });
        }
        if durations.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(InputError::BadDuration);
        }
        self.durations = Some(durations);
        Ok(self)
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn activities(&self) -> &[f64] {
        &self.activities
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Build the sampling grid for this curve.
    pub fn grid(&self) -> Result<TimeGrid, InputError> {
        match &self.durations {
            Some(durations) => TimeGrid::new(self.times.clone(), durations.clone()),
            None => TimeGrid::from_midpoints(self.times.clone()),
        }
    }
}

/// Sampled time points with their quadrature weights (frame durations).
///
/// Shared by the simulator (convolution quadrature) and the batch validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    times: Vec<f64>,
    durations: Vec<f64>,
}

impl TimeGrid {
    pub fn new(times: Vec<f64>, durations: Vec<f64>) -> Result<Self, InputError> {
        validate_series(&times, &durations)?;
        if durations.iter().any(|d| *d <= 0.0) {
            return Err(InputError::BadDuration);
        }
        Ok(Self { times, durations })
    }

    /// Derive durations from midpoint spacing: the first frame spans the time
    /// from administration to its midpoint, later frames the gap to the
    /// previous midpoint. A grid whose first midpoint is at zero needs at
    /// least two frames so the leading width can be borrowed from the next
    /// spacing.
    pub fn from_midpoints(times: Vec<f64>) -> Result<Self, InputError> {
        validate_series(&times, &times)?;
        let mut durations = Vec::with_capacity(times.len());
        for (k, &t) in times.iter().enumerate() {
            let d = if k == 0 {
                if t > 0.0 {
                    t
                } else if times.len() > 1 {
                    times[1] - t
                } else {
                    return Err(InputError::BadDuration);
                }
            } else {
                t - times[k - 1]
            };
            durations.push(d);
        }
        Ok(Self { times, durations })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
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
    fn rejects_unsorted_times() {
        let err = TimeActivityCurve::new(vec![1.0, 0.5], vec![0.0, 0.0]).unwrap_err();
        assert_eq!(err, InputError::NonMonotoneTimes);
    }

    #[test]
    fn rejects_non_finite_activity() {
        let err = TimeActivityCurve::new(vec![1.0, 2.0], vec![0.0, f64::NAN]).unwrap_err();
        assert_eq!(err, InputError::NonFinite);
    }

    #[test]
    fn derives_durations_from_midpoints() {
        let grid = TimeGrid::from_midpoints(vec![0.5, 1.5, 3.5]).unwrap();
        assert_eq!(grid.durations(), &[0.5, 1.0, 2.0]);
    }

    #[test]
    fn leading_zero_midpoint_borrows_next_spacing() {
        let grid = TimeGrid::from_midpoints(vec![0.0, 2.0, 3.0]).unwrap();
        assert_eq!(grid.durations(), &[2.0, 2.0, 1.0]);
    }

    #[test]
    fn explicit_durations_take_precedence() {
        let curve = TimeActivityCurve::new(vec![0.5, 1.5], vec![1.0, 2.0])
            .unwrap()
            .with_frame_durations(vec![0.25, 0.25])
            .unwrap();
        assert_eq!(curve.grid().unwrap().durations(), &[0.25, 0.25]);
    }

    #[test]
    fn rejects_non_positive_weights() {
        let err = TimeActivityCurve::new(vec![0.5], vec![1.0])
            .unwrap()
            .with_weights(vec![0.0])
            .unwrap_err();
        assert_eq!(err, InputError::BadWeight);
    }
}
