use ndarray::ArrayViewMut2;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::KineticModel;

/// Marginal prior distribution for one kinetic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Prior {
    Uniform { low: f64, high: f64 },
    LogUniform { low: f64, high: f64 },
}

impl Prior {
    pub fn low(&self) -> f64 {
        match *self {
            Prior::Uniform { low, .. } | Prior::LogUniform { low, .. } => low,
        }
    }

    pub fn high(&self) -> f64 {
        match *self {
            Prior::Uniform { high, .. } | Prior::LogUniform { high, .. } => high,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low() && value <= self.high()
    }

    pub(crate) fn sample(&self, rng: &mut StdRng) -> f64 {
        match *self {
            Prior::Uniform { low, high } => low + (high - low) * rng.random::<f64>(),
            Prior::LogUniform { low, high } => {
                let (log_low, log_high) = (low.ln(), high.ln());
                (log_low + (log_high - log_low) * rng.random::<f64>())
                    .exp()
                    .clamp(low, high)
            }
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let (low, high) = (self.low(), self.high());
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(ConfigError::BadPriorBounds {
                name: name.to_string(),
                low,
                high,
            });
        }
        if matches!(self, Prior::LogUniform { .. }) && low <= 0.0 {
            return Err(ConfigError::NonPositiveLogUniform {
                name: name.to_string(),
                low,
            });
        }
        Ok(())
    }
}

/// Factorized joint prior over a model's parameter vector.
///
/// One marginal per parameter, in the model's declared order; the joint
/// density carries no cross-parameter coupling. The bound box doubles as
/// the acceptance region for perturbation proposals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorSet {
    marginals: Vec<Prior>,
}

impl PriorSet {
    pub fn new(marginals: Vec<Prior>) -> Self {
        Self { marginals }
    }

    pub fn marginals(&self) -> &[Prior] {
        &self.marginals
    }

    pub fn len(&self) -> usize {
        self.marginals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marginals.is_empty()
    }

    /// Check arity against the model and each marginal against its
    /// parameter's physical domain.
    pub fn validate_for(&self, model: &impl KineticModel) -> Result<(), ConfigError> {
        let specs = model.parameters();
        if specs.len() != self.marginals.len() {
            return Err(ConfigError::PriorArityMismatch {
                model: model.name().to_string(),
                expected: specs.len(),
                found: self.marginals.len(),
            });
        }
        for (spec, prior) in specs.iter().zip(&self.marginals) {
            prior.validate(spec.name())?;
            if prior.low() < spec.lower() || prior.high() > spec.upper() {
                return Err(ConfigError::PriorOutsideDomain {
                    name: spec.name().to_string(),
                    low: prior.low(),
                    high: prior.high(),
                    domain_low: spec.lower(),
                    domain_high: spec.upper(),
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.marginals.len()
            && self
                .marginals
                .iter()
                .zip(point)
                .all(|(prior, &value)| prior.contains(value))
    }

    /// Fill a (particles × parameters) array with independent draws.
    ///
    /// Consumption order is particle-major, parameter-minor, so the stream
    /// position after sampling is a pure function of the array shape.
    pub(crate) fn sample_into(&self, rng: &mut StdRng, mut out: ArrayViewMut2<'_, f64>) {
        debug_assert_eq!(out.ncols(), self.marginals.len());
        for mut row in out.rows_mut() {
            for (value, prior) in row.iter_mut().zip(&self.marginals) {
                *value = prior.sample(rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OneTissueModel;
    use ndarray::Array2;
    use rand::SeedableRng;

    #[test]
    fn draws_stay_inside_bounds() {
        let priors = PriorSet::new(vec![
            Prior::Uniform {
                low: 0.1,
                high: 1.0,
            },
            Prior::LogUniform {
                low: 0.01,
                high: 1.0,
            },
            Prior::Uniform {
                low: 0.0,
                high: 0.2,
            },
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut draws = Array2::zeros((500, 3));
        priors.sample_into(&mut rng, draws.view_mut());
        for row in draws.rows() {
            assert!(priors.contains(row.as_slice().unwrap()));
        }
    }

    #[test]
    fn same_seed_gives_same_draws() {
        let priors = PriorSet::new(vec![Prior::Uniform {
            low: 0.0,
            high: 1.0,
        }]);
        let mut a = Array2::zeros((16, 1));
        let mut b = Array2::zeros((16, 1));
        priors.sample_into(&mut StdRng::seed_from_u64(11), a.view_mut());
        priors.sample_into(&mut StdRng::seed_from_u64(11), b.view_mut());
        assert_eq!(a, b);
    }

    #[test]
    fn log_uniform_needs_positive_low() {
        let priors = PriorSet::new(vec![
            Prior::Uniform {
                low: 0.0,
                high: 1.0,
            },
            Prior::LogUniform {
                low: 0.0,
                high: 1.0,
            },
            Prior::Uniform {
                low: 0.0,
                high: 0.2,
            },
        ]);
        let err = priors.validate_for(&OneTissueModel).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveLogUniform { .. }));
    }

    #[test]
    fn arity_mismatch_detected() {
        let priors = PriorSet::new(vec![Prior::Uniform {
            low: 0.0,
            high: 1.0,
        }]);
        let err = priors.validate_for(&OneTissueModel).unwrap_err();
        assert!(matches!(err, ConfigError::PriorArityMismatch { .. }));
    }

    #[test]
    fn priors_must_fit_physical_domain() {
        let priors = PriorSet::new(vec![
            Prior::Uniform {
                low: 0.1,
                high: 10.0,
            },
            Prior::Uniform {
                low: 0.0,
                high: 1.0,
            },
            Prior::Uniform {
                low: 0.0,
                high: 0.2,
            },
        ]);
        let err = priors.validate_for(&OneTissueModel).unwrap_err();
        assert!(matches!(err, ConfigError::PriorOutsideDomain { .. }));
    }
}
