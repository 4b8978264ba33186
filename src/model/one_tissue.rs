use super::{all_finite, convolve_in_place, finish_output, KineticModel, ModelError, ParameterSpec};
use crate::data::TimeGrid;

/// One-tissue compartment model.
///
/// Parameters `K1` (influx, mL/min/mL), `k2` (efflux, 1/min) and `vb`
/// (vascular volume fraction). Impulse response `K1·exp(-k2·t)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneTissueModel;

static PARAMETERS: [ParameterSpec; 3] = [
    ParameterSpec::new("K1", 0.0, 5.0),
    ParameterSpec::new("k2", 0.0, 5.0),
    ParameterSpec::new("vb", 0.0, 1.0),
];

impl KineticModel for OneTissueModel {
    fn name(&self) -> &'static str {
        "one-tissue"
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
        let (k1, k2, vb) = (params[0], params[1], params[2]);

        for (y, &t) in out.iter_mut().zip(grid.times()) {
            *y = k1 * (-k2 * t).exp();
        }
        convolve_in_place(input, grid.durations(), out);
        finish_output(vb, input, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fine_grid(n: usize, dt: f64) -> TimeGrid {
        let times: Vec<f64> = (0..n).map(|k| (k as f64 + 0.5) * dt).collect();
        TimeGrid::from_midpoints(times).unwrap()
    }

    #[test]
    fn constant_input_matches_closed_form() {
        let (k1, k2, c) = (0.4, 0.3, 50.0);
        let grid = fine_grid(500, 0.02);
        let input = vec![c; grid.len()];
        let mut out = vec![0.0; grid.len()];
        OneTissueModel
            .simulate_into(&[k1, k2, 0.0], &input, &grid, &mut out)
            .unwrap();

        // Tissue response to a constant input: K1·C·(1 − exp(-k2·t)) / k2.
        for (&t, &y) in grid.times().iter().zip(&out).skip(50) {
            let exact = k1 * c * (1.0 - (-k2 * t).exp()) / k2;
            assert_relative_eq!(y, exact, max_relative = 0.02);
        }
    }

    #[test]
    fn zero_influx_leaves_only_vascular_signal() {
        let grid = fine_grid(10, 0.5);
        let input: Vec<f64> = (0..10).map(|k| 100.0 - 5.0 * k as f64).collect();
        let mut out = vec![0.0; grid.len()];
        OneTissueModel
            .simulate_into(&[0.0, 0.1, 0.05], &input, &grid, &mut out)
            .unwrap();
        for (&y, &cb) in out.iter().zip(&input) {
            assert_relative_eq!(y, 0.05 * cb);
        }
    }

    #[test]
    fn non_finite_parameters_fault() {
        let grid = fine_grid(4, 0.5);
        let input = vec![1.0; 4];
        let mut out = vec![0.0; 4];
        let err = OneTissueModel
            .simulate_into(&[f64::NAN, 0.1, 0.0], &input, &grid, &mut out)
            .unwrap_err();
        assert_eq!(err, ModelError::NumericalInstability);
    }
}
