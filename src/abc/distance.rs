use serde::{Deserialize, Serialize};

/// Discrepancy between an observed and a simulated curve.
///
/// Every variant is monotonic in per-frame absolute error, which the
/// tolerance logic relies on, and any non-finite accumulation collapses to
/// +∞ so unstable particles are rejected without special cases downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    /// Sum of absolute errors over frames.
    AbsoluteSum,
    /// Unweighted sum of squared errors.
    SumOfSquares,
    /// Inverse-variance-weighted sum of squared errors; falls back to the
    /// unweighted sum when the curve carries no weights.
    #[default]
    WeightedSumOfSquares,
}

impl Distance {
    pub fn evaluate(&self, observed: &[f64], simulated: &[f64], weights: Option<&[f64]>) -> f64 {
        debug_assert_eq!(observed.len(), simulated.len());
        let mut acc = 0.0;
        match self {
            Distance::AbsoluteSum => {
                for (&o, &s) in observed.iter().zip(simulated) {
                    acc += (o - s).abs();
                }
            }
            Distance::SumOfSquares => {
                for (&o, &s) in observed.iter().zip(simulated) {
                    let e = o - s;
                    acc += e * e;
                }
            }
            Distance::WeightedSumOfSquares => match weights {
                Some(w) => {
                    debug_assert_eq!(w.len(), observed.len());
                    for ((&o, &s), &wi) in observed.iter().zip(simulated).zip(w) {
                        let e = o - s;
                        acc += wi * e * e;
                    }
                }
                None => {
                    for (&o, &s) in observed.iter().zip(simulated) {
                        let e = o - s;
                        acc += e * e;
                    }
                }
            },
        }
        if acc.is_finite() {
            acc
        } else {
            f64::INFINITY
        }
    }
}
