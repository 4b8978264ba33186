use ndarray::{ArrayView2, Axis};
use rand::{rngs::StdRng, Rng};
use rand_distr::StandardNormal;

use super::prior::PriorSet;

/// Diagonal Gaussian kernel used to diversify resampled particles.
///
/// The per-parameter width follows the accepted population's spread, so the
/// kernel tightens as the posterior concentrates. Proposals outside the
/// prior bound box are redrawn, never clipped.
#[derive(Debug, Clone)]
pub struct PerturbationKernel {
    scales: Vec<f64>,
}

impl PerturbationKernel {
    /// Kernel sized to `factor` times the per-parameter standard deviation
    /// of `params` (particles × parameters).
    pub fn from_population(params: ArrayView2<'_, f64>, factor: f64) -> Self {
        let scales = params
            .std_axis(Axis(0), 0.0)
            .iter()
            .map(|sd| {
                let s = sd * factor;
                if s.is_finite() {
                    s
                } else {
                    0.0
                }
            })
            .collect();
        Self { scales }
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Propose a perturbed copy of `source` into `out`.
    ///
    /// Redraws until the proposal falls inside the prior bound box, up to
    /// `retries` attempts. Returns `false` when the cap is exhausted; the
    /// caller marks such particles numerically unstable so their weight
    /// vanishes at the next selection.
    pub(crate) fn perturb_into(
        &self,
        source: &[f64],
        priors: &PriorSet,
        rng: &mut StdRng,
        retries: usize,
        out: &mut [f64],
    ) -> bool {
        debug_assert_eq!(source.len(), self.scales.len());
        debug_assert_eq!(out.len(), self.scales.len());
        for _ in 0..retries {
            for ((value, &origin), &scale) in out.iter_mut().zip(source).zip(&self.scales) {
                let z: f64 = rng.sample(StandardNormal);
                *value = origin + scale * z;
            }
            if priors.contains(out) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abc::prior::Prior;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;

    fn unit_box(n: usize) -> PriorSet {
        PriorSet::new(
            (0..n)
                .map(|_| Prior::Uniform {
                    low: 0.0,
                    high: 1.0,
                })
                .collect(),
        )
    }

    #[test]
    fn scales_follow_population_spread() {
        let params = array![[0.0, 10.0], [1.0, 10.0]];
        let kernel = PerturbationKernel::from_population(params.view(), 2.0);
        // Column std (ddof 0): 0.5 and 0.0.
        assert_relative_eq!(kernel.scales()[0], 1.0);
        assert_relative_eq!(kernel.scales()[1], 0.0);
    }

    #[test]
    fn proposals_respect_bounds() {
        let priors = unit_box(2);
        let kernel = PerturbationKernel {
            scales: vec![0.3, 0.3],
        };
        let mut rng = StdRng::seed_from_u64(3);
        let mut out = [0.0; 2];
        for _ in 0..200 {
            assert!(kernel.perturb_into(&[0.5, 0.5], &priors, &mut rng, 100, &mut out));
            assert!(priors.contains(&out));
        }
    }

    #[test]
    fn exhausted_retries_report_failure() {
        let priors = unit_box(1);
        let kernel = PerturbationKernel {
            scales: vec![1.0e9],
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut out = [0.0; 1];
        assert!(!kernel.perturb_into(&[0.5], &priors, &mut rng, 3, &mut out));
    }

    #[test]
    fn zero_spread_keeps_particle_fixed() {
        let priors = unit_box(1);
        let kernel = PerturbationKernel { scales: vec![0.0] };
        let mut rng = StdRng::seed_from_u64(9);
        let mut out = [0.0; 1];
        assert!(kernel.perturb_into(&[0.25], &priors, &mut rng, 1, &mut out));
        assert_relative_eq!(out[0], 0.25);
    }
}
