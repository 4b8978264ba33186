use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::distance::Distance;
use super::evaluate::{build_problems, score_population, CurveProblem};
use super::perturb::PerturbationKernel;
use super::population::{stratified_resample, Population};
use super::posterior::{AbcOutcome, CurvePosterior, TerminationReason};
use super::prior::PriorSet;
use super::progress::RoundProgress;
use super::settings::AbcSettings;
use crate::data::TacBatch;
use crate::error::PetAbcError;
use crate::model::KineticModel;

/// Cooperative cancellation flag, checked between rounds.
///
/// Cancelling never corrupts state: curves that were still iterating simply
/// keep their latest population and report `BudgetExhausted`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Population-based ABC sampler with sequential tolerance reduction.
///
/// Each curve of a batch runs its own independent inference: its RNG stream
/// derives from the configured seed alone, its tolerance schedule adapts to
/// its own discrepancies, and it stops iterating on its own convergence or
/// budget. Rayon parallelism across curves is structural and never couples
/// results, so a batch run is bit-identical to running every curve alone.
///
/// # Example
///
/// ```no_run
/// use petabc::{
///     AbcSettings, AbcSmc, IrreversibleTwoTissueModel, Prior, PriorSet, TacBatch,
/// };
/// # fn demo(batch: TacBatch) -> Result<(), petabc::PetAbcError> {
/// let priors = PriorSet::new(vec![
///     Prior::Uniform { low: 0.1, high: 1.0 },
///     Prior::Uniform { low: 0.05, high: 1.0 },
///     Prior::Uniform { low: 0.001, high: 0.1 },
///     Prior::Uniform { low: 0.0, high: 0.1 },
/// ]);
/// let engine = AbcSmc::new(IrreversibleTwoTissueModel, priors, AbcSettings::new())?;
/// let outcome = engine.run(&batch)?;
/// println!("K1 = {}", outcome.curve(0).estimate()[0]);
/// # Ok(())
/// # }
/// ```
pub struct AbcSmc<M: KineticModel> {
    model: M,
    priors: PriorSet,
    distance: Distance,
    settings: AbcSettings,
}

impl<M: KineticModel> AbcSmc<M> {
    /// Validate the configuration and priors against the model; invalid
    /// setups fail here, before any computation.
    pub fn new(model: M, priors: PriorSet, settings: AbcSettings) -> Result<Self, PetAbcError> {
        settings.validate()?;
        priors.validate_for(&model)?;
        Ok(Self {
            model,
            priors,
            distance: Distance::default(),
            settings,
        })
    }

    /// Replace the default discrepancy measure.
    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    pub fn settings(&self) -> &AbcSettings {
        &self.settings
    }

    pub fn run(&self, batch: &TacBatch) -> Result<AbcOutcome, PetAbcError> {
        self.run_with_cancel(batch, &CancelToken::new())
    }

    /// Run the full ABC-SMC loop, checking `cancel` between rounds.
    pub fn run_with_cancel(
        &self,
        batch: &TacBatch,
        cancel: &CancelToken,
    ) -> Result<AbcOutcome, PetAbcError> {
        let problems = build_problems(batch)?;
        let mut states: Vec<CurveState> = problems
            .iter()
            .map(|problem| CurveState::initial(self, problem))
            .collect();

        let progress = self
            .settings
            .show_progress
            .then(|| RoundProgress::new(states.len() * self.settings.max_rounds));

        for round in 0..self.settings.max_rounds {
            if cancel.is_cancelled() {
                tracing::info!(round, "run cancelled, returning partial posteriors");
                break;
            }
            let active = states.iter().filter(|s| s.active()).count();
            if active == 0 {
                break;
            }
            states
                .par_iter_mut()
                .zip(problems.par_iter())
                .for_each(|(state, problem)| {
                    if !state.active() {
                        return;
                    }
                    self.advance_round(state, problem);
                    if let Some(progress) = &progress {
                        progress.inc();
                    }
                });
            tracing::debug!(round, active, "completed ABC round");
        }

        if let Some(progress) = &progress {
            progress.finish();
        }

        let parameter_names = self
            .model
            .parameters()
            .iter()
            .map(|spec| spec.name().to_string())
            .collect();
        let curves = states
            .into_iter()
            .map(|state| {
                CurvePosterior::new(
                    state.posterior,
                    self.settings.reducer,
                    state
                        .termination
                        .unwrap_or(TerminationReason::BudgetExhausted),
                    state.rounds,
                    state.schedule,
                    state.degenerate,
                )
            })
            .collect();
        Ok(AbcOutcome::new(parameter_names, curves))
    }

    /// One EVALUATE + SELECT step for a single curve.
    fn advance_round(&self, state: &mut CurveState, problem: &CurveProblem) {
        let settings = &self.settings;
        score_population(
            &self.model,
            problem,
            self.distance,
            &mut state.population,
            &mut state.simulated,
        );

        let candidate = state.population.score_quantile(settings.tolerance_quantile);
        // The schedule never increases, whatever this round's scores did.
        let tolerance = candidate.min(state.tolerance);
        let mut accepted = state.population.accepted_indices(tolerance);

        let mut degenerate_round = false;
        if accepted.len() < settings.min_accepted() {
            degenerate_round = true;
            accepted = state.population.best_indices(settings.min_accepted());
        }

        state.rounds += 1;

        if accepted.is_empty() {
            // No particle simulated to a finite discrepancy. Keep the last
            // valid posterior and retry from it with fresh proposals.
            state.degenerate = true;
            state.degenerate_streak += 1;
            state.schedule.push(state.tolerance);
            tracing::warn!(
                streak = state.degenerate_streak,
                "round produced no finite discrepancy"
            );
            if state.degenerate_streak >= settings.degenerate_rounds
                || state.rounds >= settings.max_rounds
            {
                state.termination = Some(TerminationReason::BudgetExhausted);
            } else {
                self.refill(state);
            }
            return;
        }

        if degenerate_round {
            state.degenerate = true;
            state.degenerate_streak += 1;
            tracing::warn!(
                accepted = accepted.len(),
                "acceptance below floor, widening to best particles"
            );
        } else {
            state.degenerate_streak = 0;
        }
        state.schedule.push(tolerance);

        let previous = state.tolerance;
        state.tolerance = tolerance;

        // Resample with replacement, uniformly among accepted particles,
        // back to full population size.
        let weights = vec![1.0; accepted.len()];
        let strata = stratified_resample(&weights, settings.particle_count, &mut state.rng);
        let sources: Vec<usize> = strata.into_iter().map(|s| accepted[s]).collect();
        state.posterior = state.population.gather(&sources);

        let converged = !degenerate_round && previous.is_finite() && {
            let improvement = if previous > 0.0 {
                (previous - tolerance) / previous
            } else {
                0.0
            };
            improvement < settings.convergence_threshold
        };
        if converged {
            state.termination = Some(TerminationReason::Converged);
            return;
        }
        if degenerate_round && state.degenerate_streak >= settings.degenerate_rounds {
            state.termination = Some(TerminationReason::BudgetExhausted);
            return;
        }
        if state.rounds >= settings.max_rounds {
            state.termination = Some(TerminationReason::BudgetExhausted);
            return;
        }

        self.refill(state);
    }

    /// Perturb the current posterior into the next round's working
    /// population. Particles whose proposals exhaust the retry cap are
    /// NaN-poisoned so the next selection rejects them.
    fn refill(&self, state: &mut CurveState) {
        let kernel =
            PerturbationKernel::from_population(state.posterior.view(), self.settings.perturb_scale);
        let mut source = vec![0.0; state.posterior.ncols()];
        for i in 0..state.posterior.nrows() {
            for (value, &origin) in source.iter_mut().zip(state.posterior.row(i)) {
                *value = origin;
            }
            let target = state.population.row_slice_mut(i);
            if !kernel.perturb_into(
                &source,
                &self.priors,
                &mut state.rng,
                self.settings.perturb_retries,
                target,
            ) {
                target.fill(f64::NAN);
            }
        }
        state.population.reset_scores();
    }
}

/// Per-curve sampler state carried across rounds.
struct CurveState {
    /// Seed-derived stream; every stochastic operation for this curve draws
    /// from it in a fixed order (prior draws, then per round: resampling,
    /// perturbation).
    rng: StdRng,
    /// Working population, scored each ROUND_EVALUATE.
    population: Population,
    /// Latest resampled accepted set; always a valid posterior to return.
    posterior: Array2<f64>,
    tolerance: f64,
    schedule: Vec<f64>,
    rounds: usize,
    termination: Option<TerminationReason>,
    degenerate_streak: usize,
    degenerate: bool,
    simulated: Vec<f64>,
}

impl CurveState {
    fn initial<M: KineticModel>(engine: &AbcSmc<M>, problem: &CurveProblem) -> Self {
        let mut rng = StdRng::seed_from_u64(engine.settings.seed);
        let population =
            Population::from_prior(&engine.priors, engine.settings.particle_count, &mut rng);
        let posterior = population.params().to_owned();
        Self {
            rng,
            population,
            posterior,
            tolerance: f64::INFINITY,
            schedule: Vec::new(),
            rounds: 0,
            termination: None,
            degenerate_streak: 0,
            degenerate: false,
            simulated: vec![0.0; problem.grid().len()],
        }
    }

    fn active(&self) -> bool {
        self.termination.is_none()
    }
}
