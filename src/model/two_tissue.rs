use super::{all_finite, convolve_in_place, finish_output, KineticModel, ModelError, ParameterSpec};
use crate::data::TimeGrid;

/// Reversible two-tissue compartment model.
///
/// Parameters `K1`, `k2`, `k3`, `k4` and `vb`. The impulse response is the
/// bi-exponential with eigenrates
/// `α₁,₂ = ((k2+k3+k4) ∓ √((k2+k3+k4)² − 4·k2·k4)) / 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoTissueModel;

static PARAMETERS: [ParameterSpec; 5] = [
    ParameterSpec::new("K1", 0.0, 5.0),
    ParameterSpec::new("k2", 0.0, 5.0),
    ParameterSpec::new("k3", 0.0, 2.0),
    ParameterSpec::new("k4", 0.0, 2.0),
    ParameterSpec::new("vb", 0.0, 1.0),
];

impl KineticModel for TwoTissueModel {
    fn name(&self) -> &'static str {
        "two-tissue"
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        &PARAMETERS
    }

    fn simulate_into(
        &self,
        params: &[f64],
        input: &[f64],
        grid: &TimeGrid,
        out: &mut [f64],
    ) -> Result<(), ModelError> {
        debug_assert_eq!(params.len(), self.nparams());
        debug_assert_eq!(input.len(), grid.len());
        debug_assert_eq!(out.len(), grid.len());
        if !all_finite(params) {
            return Err(ModelError::NumericalInstability);
        }
        let (k1, k2, k3, k4, vb) = (params[0], params[1], params[2], params[3], params[4]);

        let sum = k2 + k3 + k4;
        let disc = sum * sum - 4.0 * k2 * k4;
        if !(disc >= 0.0) {
            return Err(ModelError::NumericalInstability);
        }
        let root = disc.sqrt();
        let alpha1 = 0.5 * (sum - root);
        let alpha2 = 0.5 * (sum + root);
        let spread = alpha2 - alpha1;
        if !(spread > 0.0) || !spread.is_finite() {
            return Err(ModelError::NumericalInstability);
        }
        let phi1 = k1 * (k3 + k4 - alpha1) / spread;
        let phi2 = k1 * (alpha2 - k3 - k4) / spread;

        for (y, &t) in out.iter_mut().zip(grid.times()) {
            *y = phi1 * (-alpha1 * t).exp() + phi2 * (-alpha2 * t).exp();
        }
        convolve_in_place(input, grid.durations(), out);
        finish_output(vb, input, out)
    }
}

/// Irreversible two-tissue compartment model (`k4 = 0`), the standard FDG
/// configuration. Parameters `K1`, `k2`, `k3` and `vb`; impulse response
/// `K1·(k3 + k2·exp(-(k2+k3)·t)) / (k2+k3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrreversibleTwoTissueModel;

static IRREVERSIBLE_PARAMETERS: [ParameterSpec; 4] = [
    ParameterSpec::new("K1", 0.0, 5.0),
    ParameterSpec::new("k2", 0.0, 5.0),
    ParameterSpec::new("k3", 0.0, 2.0),
    ParameterSpec::new("vb", 0.0, 1.0),
];

impl KineticModel for IrreversibleTwoTissueModel {
    fn name(&self) -> &'static str {
        "two-tissue-irreversible"
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        &IRREVERSIBLE_PARAMETERS
    }

    fn simulate_into(
        &self,
        params: &[f64],
        input: &[f64],
        grid: &TimeGrid,
        out: &mut [f64],
    ) -> Result<(), ModelError> {
        debug_assert_eq!(params.len(), self.nparams());
        debug_assert_eq!(input.len(), grid.len());
        debug_assert_eq!(out.len(), grid.len());
        if !all_finite(params) {
            return Err(ModelError::NumericalInstability);
        }
        let (k1, k2, k3, vb) = (params[0], params[1], params[2], params[3]);

        let sum = k2 + k3;
        if !(sum > 0.0) {
            return Err(ModelError::NumericalInstability);
        }
        let trapped = k1 * k3 / sum;
        let transient = k1 * k2 / sum;

        for (y, &t) in out.iter_mut().zip(grid.times()) {
            *y = trapped + transient * (-sum * t).exp();
        }
        convolve_in_place(input, grid.durations(), out);
        finish_output(vb, input, out)
    }
}
