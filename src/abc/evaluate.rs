use super::distance::Distance;
use super::population::Population;
use crate::data::{TacBatch, TimeGrid};
use crate::error::InputError;
use crate::model::KineticModel;

/// Everything the sampler needs about one curve, extracted once up front so
/// the round loop touches plain slices only.
#[derive(Debug, Clone)]
pub(crate) struct CurveProblem {
    observed: Vec<f64>,
    weights: Option<Vec<f64>>,
    input: Vec<f64>,
    grid: TimeGrid,
}

impl CurveProblem {
    pub(crate) fn grid(&self) -> &TimeGrid {
        &self.grid
    }
}

pub(crate) fn build_problems(batch: &TacBatch) -> Result<Vec<CurveProblem>, InputError> {
    batch
        .curves()
        .iter()
        .enumerate()
        .map(|(index, curve)| {
            Ok(CurveProblem {
                observed: curve.activities().to_vec(),
                weights: curve.weights().map(<[f64]>::to_vec),
                input: batch.input_for(index).activities().to_vec(),
                grid: curve.grid()?,
            })
        })
        .collect()
}

/// Score every particle of a population against one curve.
///
/// Pure with respect to everything but the population's scores and the
/// caller-owned simulation buffer. Particles whose parameters are
/// NaN-poisoned or whose simulation faults score +∞ and are thereby
/// guaranteed rejection; a bad particle never aborts the batch.
pub(crate) fn score_population<M: KineticModel>(
    model: &M,
    problem: &CurveProblem,
    distance: Distance,
    population: &mut Population,
    simulated: &mut [f64],
) {
    debug_assert_eq!(simulated.len(), problem.grid.len());
    for i in 0..population.len() {
        let params = population.row_slice(i);
        if params.iter().any(|p| !p.is_finite()) {
            population.set_score(i, f64::INFINITY);
            continue;
        }
        let score = match model.simulate_into(params, &problem.input, &problem.grid, simulated) {
            Ok(()) => distance
                .evaluate(&problem.observed, simulated, problem.weights.as_deref()),
            Err(_) => f64::INFINITY,
        };
        population.set_score(i, score);
    }
}
