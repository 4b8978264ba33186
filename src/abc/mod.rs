//! Likelihood-free inference engine: ABC-SMC over batches of curves.
//!
//! The sampler draws particle populations from the prior, scores them with
//! the forward simulator and a discrepancy measure, and tightens the
//! acceptance tolerance over sequential rounds. Every curve of a batch runs
//! its own independent inference; rayon parallelism across the curve axis
//! is purely structural and never couples results.

mod distance;
mod evaluate;
mod perturb;
mod population;
mod posterior;
mod prior;
mod progress;
mod settings;
mod smc;

pub use distance::Distance;
pub use perturb::PerturbationKernel;
pub use population::Population;
pub use posterior::{AbcOutcome, CurvePosterior, TerminationReason};
pub use prior::{Prior, PriorSet};
pub use settings::{AbcSettings, Reducer};
pub use smc::{AbcSmc, CancelToken};
