//! Compartmental kinetic models with analytic solutions.
//!
//! A model maps a parameter vector and an input function sampled on a frame
//! grid to a predicted time-activity curve. Solutions are closed-form
//! impulse responses convolved with the input on the grid, so simulation is
//! deterministic, allocation-free and cheap enough to run for millions of
//! particles per scan.

mod one_tissue;
mod two_tissue;

pub use one_tissue::OneTissueModel;
pub use two_tissue::{IrreversibleTwoTissueModel, TwoTissueModel};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::TimeGrid;

/// Per-particle simulation fault.
///
/// Raised when a parameter vector drives the solution outside the
/// representable range (non-finite eigenrates, overflowing exponentials,
/// NaN-poisoned proposals). Callers treat the particle as having infinite
/// discrepancy; the fault never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("parameters drove the model outside the representable range")]
    NumericalInstability,
}

/// Name and physical domain of one kinetic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    name: &'static str,
    lower: f64,
    upper: f64,
}

impl ParameterSpec {
    pub const fn new(name: &'static str, lower: f64, upper: f64) -> Self {
        Self { name, lower, upper }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// A compartmental model with a closed-form solution.
///
/// Implementations must be deterministic given identical inputs: no
/// randomness, no hidden state. The declared [`ParameterSpec`]s are the
/// physical domain that priors and perturbation proposals are validated
/// against.
pub trait KineticModel: Clone + Send + Sync + 'static {
    /// Short model identifier used in error messages.
    fn name(&self) -> &'static str;

    /// Parameter names and physical bounds, in vector order.
    fn parameters(&self) -> &'static [ParameterSpec];

    fn nparams(&self) -> usize {
        self.parameters().len()
    }

    /// Simulate the model over `grid`, writing the predicted activity for
    /// each frame into `out`.
    ///
    /// `params` is in [`Self::parameters`] order, `input` is the input
    /// function sampled on `grid`, and `out` has `grid.len()` elements.
    fn simulate_into(
        &self,
        params: &[f64],
        input: &[f64],
        grid: &TimeGrid,
        out: &mut [f64],
    ) -> Result<(), ModelError>;
}

/// Net influx rate `Ki = K1·k3 / (k2 + k3)` of a two-tissue model.
///
/// The macro parameter reported alongside the raw rate constants for
/// irreversible tracers such as FDG.
pub fn net_influx_rate(k1: f64, k2: f64, k3: f64) -> f64 {
    k1 * k3 / (k2 + k3)
}

/// Causal convolution of an impulse response with the input on the frame
/// grid, quadrature-weighted by frame durations:
/// `out[n] = Σ_{k≤n} response[k] · input[n−k] · duration[k]`.
///
/// Runs in place: `out` holds the impulse response samples on entry and the
/// tissue curve on exit. Descending order keeps the response samples needed
/// by later (smaller `n`) sums untouched.
pub(crate) fn convolve_in_place(input: &[f64], durations: &[f64], out: &mut [f64]) {
    for n in (0..out.len()).rev() {
        let mut acc = 0.0;
        for k in 0..=n {
            acc += out[k] * input[n - k] * durations[k];
        }
        out[n] = acc;
    }
}

/// Shared epilogue of every analytic model: blend the tissue curve with the
/// vascular contribution and reject non-finite results.
pub(crate) fn finish_output(vb: f64, input: &[f64], out: &mut [f64]) -> Result<(), ModelError> {
    for (y, &cb) in out.iter_mut().zip(input) {
        *y = (1.0 - vb) * *y + vb * cb;
        if !y.is_finite() {
            return Err(ModelError::NumericalInstability);
        }
    }
    Ok(())
}

pub(crate) fn all_finite(params: &[f64]) -> bool {
    params.iter().all(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn convolution_matches_direct_sum() {
        let response = [1.0, 0.5, 0.25];
        let input = [2.0, 1.0, 0.5];
        let durations = [1.0, 1.0, 1.0];
        let mut out = response;
        convolve_in_place(&input, &durations, &mut out);
        // out[2] = r0*i2 + r1*i1 + r2*i0
        assert_relative_eq!(out[0], 2.0);
        assert_relative_eq!(out[1], 2.0);
        assert_relative_eq!(out[2], 1.5);
    }

    #[test]
    fn net_influx_rate_literal() {
        assert_relative_eq!(net_influx_rate(0.5, 0.3, 0.02), 0.5 * 0.02 / 0.32);
    }
}
