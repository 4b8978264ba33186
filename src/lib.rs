//! petabc — likelihood-free estimation of PET tracer kinetic parameters.
//!
//! The crate pairs a deterministic forward simulator for compartmental
//! kinetic models with a population-based ABC-SMC sampler. Observed
//! time-activity curves go in, approximate posteriors over the rate
//! constants come out, one independent inference per curve, with all
//! per-round work batched across the curve axis.
//!
//! # Example
//!
//! ```
//! use petabc::prelude::*;
//!
//! // Frame grid and a synthetic plasma input.
//! let times: Vec<f64> = (0..24).map(|k| (k as f64 + 0.5) * 0.5).collect();
//! let plasma: Vec<f64> = times.iter().map(|&t| 90.0 * t * (-t / 1.5).exp()).collect();
//! let input = InputFunction::new(times.clone(), plasma.clone()).unwrap();
//!
//! // A noiseless curve simulated from known parameters.
//! let grid = TimeGrid::from_midpoints(times.clone()).unwrap();
//! let mut observed = vec![0.0; times.len()];
//! OneTissueModel
//!     .simulate_into(&[0.4, 0.25, 0.03], &plasma, &grid, &mut observed)
//!     .unwrap();
//! let curve = TimeActivityCurve::new(times, observed).unwrap();
//! let batch = TacBatch::new(vec![curve], InputAssignment::Shared(input)).unwrap();
//!
//! let priors = PriorSet::new(vec![
//!     Prior::Uniform { low: 0.1, high: 1.0 },
//!     Prior::Uniform { low: 0.05, high: 1.0 },
//!     Prior::Uniform { low: 0.0, high: 0.1 },
//! ]);
//! let settings = AbcSettings::new()
//!     .with_particle_count(300)
//!     .with_max_rounds(4)
//!     .with_seed(7);
//! let outcome = AbcSmc::new(OneTissueModel, priors, settings)
//!     .unwrap()
//!     .run(&batch)
//!     .unwrap();
//! assert_eq!(outcome.len(), 1);
//! ```

pub mod abc;
pub mod data;
pub mod error;
pub mod model;

pub use abc::{
    AbcOutcome, AbcSettings, AbcSmc, CancelToken, CurvePosterior, Distance, PerturbationKernel,
    Population, Prior, PriorSet, Reducer, TerminationReason,
};
pub use data::{InputAssignment, InputFunction, TacBatch, TimeActivityCurve, TimeGrid};
pub use error::{ConfigError, InputError, PetAbcError};
pub use model::{
    net_influx_rate, IrreversibleTwoTissueModel, KineticModel, ModelError, OneTissueModel,
    ParameterSpec, TwoTissueModel,
};

pub mod prelude {
    pub use crate::abc::{
        AbcOutcome, AbcSettings, AbcSmc, CancelToken, CurvePosterior, Distance, Prior, PriorSet,
        Reducer, TerminationReason,
    };
    pub use crate::data::{InputAssignment, InputFunction, TacBatch, TimeActivityCurve, TimeGrid};
    pub use crate::error::PetAbcError;
    pub use crate::model::{
        net_influx_rate, IrreversibleTwoTissueModel, KineticModel, ModelError, OneTissueModel,
        TwoTissueModel,
    };
}
