use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::{rngs::StdRng, Rng};

use super::prior::PriorSet;

/// One curve's particle set at one round: parameter vectors and their
/// discrepancy scores.
///
/// Row `i` of `params` is particle `i`; `scores[i]` is its discrepancy,
/// +∞ until evaluated or when the particle is numerically unstable.
#[derive(Debug, Clone)]
pub struct Population {
    params: Array2<f64>,
    scores: Array1<f64>,
}

impl Population {
    /// Initial population: independent prior draws, unscored.
    pub(crate) fn from_prior(priors: &PriorSet, count: usize, rng: &mut StdRng) -> Self {
        let mut params = Array2::zeros((count, priors.len()));
        priors.sample_into(rng, params.view_mut());
        Self {
            params,
            scores: Array1::from_elem(count, f64::INFINITY),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_params(params: Array2<f64>) -> Self {
        let count = params.nrows();
        Self {
            params,
            scores: Array1::from_elem(count, f64::INFINITY),
        }
    }

    pub fn len(&self) -> usize {
        self.params.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.params.nrows() == 0
    }

    pub fn nparams(&self) -> usize {
        self.params.ncols()
    }

    pub fn params(&self) -> ArrayView2<'_, f64> {
        self.params.view()
    }

    pub fn scores(&self) -> &Array1<f64> {
        &self.scores
    }

    pub(crate) fn row_slice(&self, i: usize) -> &[f64] {
        self.params
            .row(i)
            .to_slice()
            .expect("population rows are contiguous")
    }

    pub(crate) fn row_slice_mut(&mut self, i: usize) -> &mut [f64] {
        self.params
            .row_mut(i)
            .into_slice()
            .expect("population rows are contiguous")
    }

    pub(crate) fn set_score(&mut self, i: usize, score: f64) {
        self.scores[i] = score;
    }

    pub(crate) fn reset_scores(&mut self) {
        self.scores.fill(f64::INFINITY);
    }

    /// Linearly interpolated quantile of the scores; +∞ if either
    /// neighboring order statistic is infinite.
    pub(crate) fn score_quantile(&self, q: f64) -> f64 {
        let mut sorted: Vec<f64> = self.scores.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let position = q * (sorted.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let (a, b) = (sorted[lower], sorted[upper]);
        if !a.is_finite() || !b.is_finite() {
            return f64::INFINITY;
        }
        a + (b - a) * (position - lower as f64)
    }

    /// Particles with a finite score at or below `tolerance`.
    pub(crate) fn accepted_indices(&self, tolerance: f64) -> Vec<usize> {
        self.scores
            .iter()
            .enumerate()
            .filter(|(_, &s)| s.is_finite() && s <= tolerance)
            .map(|(i, _)| i)
            .collect()
    }

    /// The `k` finite-scored particles with the lowest discrepancy.
    pub(crate) fn best_indices(&self, k: usize) -> Vec<usize> {
        let mut finite: Vec<usize> = self
            .scores
            .iter()
            .enumerate()
            .filter(|(_, &s)| s.is_finite())
            .map(|(i, _)| i)
            .collect();
        finite.sort_by(|&a, &b| self.scores[a].total_cmp(&self.scores[b]));
        finite.truncate(k);
        finite
    }

    /// Rows `sources` gathered into a fresh (draws × nparams) array.
    pub(crate) fn gather(&self, sources: &[usize]) -> Array2<f64> {
        self.params.select(Axis(0), sources)
    }
}

/// Stratified resampling: `draws` indices into `weights`, one uniform draw
/// per stratum of the cumulative weight axis. Weights need not be
/// normalized.
pub(crate) fn stratified_resample(weights: &[f64], draws: usize, rng: &mut StdRng) -> Vec<usize> {
    debug_assert!(!weights.is_empty());
    let total: f64 = weights.iter().sum();
    let mut cumulative = Vec::with_capacity(weights.len());
    let mut acc = 0.0;
    for &w in weights {
        acc += w / total;
        cumulative.push(acc);
    }

    let mut indices = Vec::with_capacity(draws);
    let mut k = 0;
    for j in 0..draws {
        let u = (j as f64 + rng.random::<f64>()) / draws as f64;
        while k + 1 < cumulative.len() && cumulative[k] <= u {
            k += 1;
        }
        indices.push(k);
    }
    indices
}
