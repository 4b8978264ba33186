use thiserror::Error;

use crate::model::ModelError;

/// Crate-level error type.
///
/// Only pre-run problems surface through this enum: configuration and input
/// validation abort the run before any computation starts. Per-particle and
/// per-curve conditions (numerical instability, degenerate populations) are
/// recorded in the per-curve results instead and never abort a batch.
#[derive(Error, Debug)]
pub enum PetAbcError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Fatal configuration problems, detected before the run starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("particle count must be positive")]
    ZeroParticleCount,
    #[error("maximum round count must be positive")]
    ZeroRounds,
    #[error("tolerance quantile must lie in (0, 1), got {0}")]
    ToleranceQuantileOutOfRange(f64),
    #[error("convergence threshold must be finite and non-negative, got {0}")]
    NegativeConvergenceThreshold(f64),
    #[error("minimum acceptance fraction must lie in (0, 1], got {0}")]
    MinAcceptanceOutOfRange(f64),
    #[error("consecutive degenerate round cap must be positive")]
    ZeroDegenerateRounds,
    #[error("perturbation scale must be positive and finite, got {0}")]
    BadPerturbScale(f64),
    #[error("perturbation retry cap must be positive")]
    ZeroPerturbRetries,
    #[error("prior for {name} has invalid bounds [{low}, {high}]")]
    BadPriorBounds { name: String, low: f64, high: f64 },
    #[error("log-uniform prior for {name} requires a positive lower bound, got {low}")]
    NonPositiveLogUniform { name: String, low: f64 },
    #[error("model {model} takes {expected} parameters but {found} priors were given")]
    PriorArityMismatch {
        model: String,
        expected: usize,
        found: usize,
    },
    #[error(
        "prior for {name} ([{low}, {high}]) extends outside its physical domain [{domain_low}, {domain_high}]"
    )]
    PriorOutsideDomain {
        name: String,
        low: f64,
        high: f64,
        domain_low: f64,
        domain_high: f64,
    },
}

/// Fatal input-data problems, detected before the run starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("time series is empty")]
    Empty,
    #[error("times and activities differ in length ({times} vs {values})")]
    LengthMismatch { times: usize, values: usize },
    #[error("{weights} weights supplied for {frames} frames")]
    WeightLengthMismatch { weights: usize, frames: usize },
    #[error("{durations} frame durations supplied for {frames} frames")]
    DurationLengthMismatch { durations: usize, frames: usize },
    #[error("frame times must be non-negative and strictly increasing")]
    NonMonotoneTimes,
    #[error("time series contains a non-finite value")]
    NonFinite,
    #[error("frame durations must be positive and finite")]
    BadDuration,
    #[error("weights must be positive and finite")]
    BadWeight,
    #[error("batch contains no curves")]
    EmptyBatch,
    #[error("{inputs} input functions supplied for {curves} curves")]
    InputCountMismatch { curves: usize, inputs: usize },
    #[error("curve {index}: time grid differs from its input function")]
    GridMismatch { index: usize },
}
