use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::settings::Reducer;

/// Why a curve stopped iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Tolerance improvement fell below the configured threshold.
    Converged,
    /// The round budget ran out (or the run was cancelled) first.
    BudgetExhausted,
}

/// Approximate posterior for one curve.
///
/// Holds the terminal population (every accepted, resampled parameter
/// vector), the reduced point estimate with its per-parameter dispersion,
/// and the bookkeeping a caller needs to distinguish confident from
/// budget-capped or low-confidence estimates.
#[derive(Debug, Clone)]
pub struct CurvePosterior {
    samples: Array2<f64>,
    estimate: Vec<f64>,
    dispersion: Vec<f64>,
    termination: TerminationReason,
    rounds: usize,
    tolerances: Vec<f64>,
    degenerate: bool,
}

impl CurvePosterior {
    pub(crate) fn new(
        samples: Array2<f64>,
        reducer: Reducer,
        termination: TerminationReason,
        rounds: usize,
        tolerances: Vec<f64>,
        degenerate: bool,
    ) -> Self {
        let estimate = reduce(samples.view(), reducer);
        let dispersion = samples.std_axis(Axis(0), 0.0).to_vec();
        Self {
            samples,
            estimate,
            dispersion,
            termination,
            rounds,
            tolerances,
            degenerate,
        }
    }

    /// Full posterior sample set (particles × parameters).
    pub fn samples(&self) -> ArrayView2<'_, f64> {
        self.samples.view()
    }

    /// Point estimate, one value per parameter.
    pub fn estimate(&self) -> &[f64] {
        &self.estimate
    }

    /// Per-parameter standard deviation of the posterior samples.
    pub fn dispersion(&self) -> &[f64] {
        &self.dispersion
    }

    pub fn termination(&self) -> TerminationReason {
        self.termination
    }

    /// Rounds actually consumed by this curve.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Realized tolerance schedule, one entry per round.
    pub fn tolerances(&self) -> &[f64] {
        &self.tolerances
    }

    /// True when the estimate went through degenerate-population recovery
    /// and should be treated as low confidence.
    pub fn degenerate(&self) -> bool {
        self.degenerate
    }
}

/// Results for a whole batch, one posterior per curve in batch order.
#[derive(Debug, Clone)]
pub struct AbcOutcome {
    parameter_names: Vec<String>,
    curves: Vec<CurvePosterior>,
}

impl AbcOutcome {
    pub(crate) fn new(parameter_names: Vec<String>, curves: Vec<CurvePosterior>) -> Self {
        Self {
            parameter_names,
            curves,
        }
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn curves(&self) -> &[CurvePosterior] {
        &self.curves
    }

    pub fn curve(&self, index: usize) -> &CurvePosterior {
        &self.curves[index]
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

fn reduce(samples: ArrayView2<'_, f64>, reducer: Reducer) -> Vec<f64> {
    match reducer {
        Reducer::Mean => samples
            .mean_axis(Axis(0))
            .map(|m| m.to_vec())
            .unwrap_or_default(),
        Reducer::Median => samples
            .axis_iter(Axis(1))
            .map(|column| {
                let mut values: Vec<f64> = column.iter().copied().collect();
                values.sort_by(f64::total_cmp);
                let n = values.len();
                if n % 2 == 1 {
                    values[n / 2]
                } else {
                    0.5 * (values[n / 2 - 1] + values[n / 2])
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn mean_and_median_reduce_per_parameter() {
        let samples = array![[1.0, 10.0], [2.0, 20.0], [6.0, 30.0]];
        let mean = reduce(samples.view(), Reducer::Mean);
        let median = reduce(samples.view(), Reducer::Median);
        assert_relative_eq!(mean[0], 3.0);
        assert_relative_eq!(mean[1], 20.0);
        assert_relative_eq!(median[0], 2.0);
        assert_relative_eq!(median[1], 20.0);
    }

    #[test]
    fn even_sample_median_averages_midpoints() {
        let samples = array![[1.0], [2.0], [3.0], [8.0]];
        let median = reduce(samples.view(), Reducer::Median);
        assert_relative_eq!(median[0], 2.5);
    }

    #[test]
    fn dispersion_is_population_standard_deviation() {
        let posterior = CurvePosterior::new(
            array![[0.0], [2.0]],
            Reducer::Mean,
            TerminationReason::Converged,
            3,
            vec![5.0, 2.0, 1.0],
            false,
        );
        assert_relative_eq!(posterior.dispersion()[0], 1.0);
        assert_relative_eq!(posterior.estimate()[0], 1.0);
    }
}
