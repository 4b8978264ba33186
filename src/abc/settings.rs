use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a terminal population is reduced to a point estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reducer {
    #[default]
    Mean,
    Median,
}

/// Configuration of an ABC-SMC run.
///
/// Built with `Default` and the `with_*` chainers, validated before any
/// computation starts.
///
/// # Example
///
/// ```
/// use petabc::AbcSettings;
///
/// let settings = AbcSettings::new()
///     .with_particle_count(2000)
///     .with_max_rounds(10)
///     .with_seed(42);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcSettings {
    /// Population size per curve per round.
    pub particle_count: usize,
    /// Hard cap on the number of rounds.
    pub max_rounds: usize,
    /// Acceptance quantile of each round's discrepancies.
    pub tolerance_quantile: f64,
    /// Minimum relative tolerance improvement to keep iterating.
    pub convergence_threshold: f64,
    /// Acceptance-rate floor below which a round counts as degenerate.
    pub min_acceptance: f64,
    /// Consecutive degenerate rounds before a curve gives up.
    pub degenerate_rounds: usize,
    /// Kernel width as a multiple of the accepted population's spread.
    pub perturb_scale: f64,
    /// Proposal redraws before a particle is marked unstable.
    pub perturb_retries: usize,
    /// Origin of every pseudorandom stream in the run.
    pub seed: u64,
    /// Point-estimate reducer.
    pub reducer: Reducer,
    /// Print round progress to stdout.
    pub show_progress: bool,
}

impl Default for AbcSettings {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            max_rounds: 12,
            tolerance_quantile: 0.5,
            convergence_threshold: 0.05,
            min_acceptance: 0.05,
            degenerate_rounds: 3,
            perturb_scale: std::f64::consts::SQRT_2,
            perturb_retries: 100,
            seed: 2024,
            reducer: Reducer::Mean,
            show_progress: false,
        }
    }
}

impl AbcSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_particle_count(mut self, particle_count: usize) -> Self {
        self.particle_count = particle_count;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_tolerance_quantile(mut self, tolerance_quantile: f64) -> Self {
        self.tolerance_quantile = tolerance_quantile;
        self
    }

    pub fn with_convergence_threshold(mut self, convergence_threshold: f64) -> Self {
        self.convergence_threshold = convergence_threshold;
        self
    }

    pub fn with_min_acceptance(mut self, min_acceptance: f64) -> Self {
        self.min_acceptance = min_acceptance;
        self
    }

    pub fn with_degenerate_rounds(mut self, degenerate_rounds: usize) -> Self {
        self.degenerate_rounds = degenerate_rounds;
        self
    }

    pub fn with_perturb_scale(mut self, perturb_scale: f64) -> Self {
        self.perturb_scale = perturb_scale;
        self
    }

    pub fn with_perturb_retries(mut self, perturb_retries: usize) -> Self {
        self.perturb_retries = perturb_retries;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticleCount);
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        if !(self.tolerance_quantile > 0.0 && self.tolerance_quantile < 1.0) {
            return Err(ConfigError::ToleranceQuantileOutOfRange(
                self.tolerance_quantile,
            ));
        }
        if !(self.convergence_threshold >= 0.0) || !self.convergence_threshold.is_finite() {
            return Err(ConfigError::NegativeConvergenceThreshold(
                self.convergence_threshold,
            ));
        }
        if !(self.min_acceptance > 0.0 && self.min_acceptance <= 1.0) {
            return Err(ConfigError::MinAcceptanceOutOfRange(self.min_acceptance));
        }
        if self.degenerate_rounds == 0 {
            return Err(ConfigError::ZeroDegenerateRounds);
        }
        if !(self.perturb_scale > 0.0) || !self.perturb_scale.is_finite() {
            return Err(ConfigError::BadPerturbScale(self.perturb_scale));
        }
        if self.perturb_retries == 0 {
            return Err(ConfigError::ZeroPerturbRetries);
        }
        Ok(())
    }

    /// Smallest acceptance count that does not trip degenerate handling.
    pub(crate) fn min_accepted(&self) -> usize {
        ((self.particle_count as f64 * self.min_acceptance).ceil() as usize).max(2)
    }
}
