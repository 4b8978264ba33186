use petabc::prelude::*;

const TRUTH: [f64; 4] = [0.5, 0.3, 0.02, 0.03];

fn frame_times() -> Vec<f64> {
    (0..30).map(|k| (k as f64 + 0.5) * 1.0).collect()
}

fn plasma(times: &[f64]) -> Vec<f64> {
    times
        .iter()
        .map(|&t| 120.0 * t * (-t / 1.5).exp())
        .collect()
}

fn simulate(params: &[f64], times: &[f64], input: &[f64]) -> Vec<f64> {
    let grid = TimeGrid::from_midpoints(times.to_vec()).unwrap();
    let mut out = vec![0.0; times.len()];
    IrreversibleTwoTissueModel
        .simulate_into(params, input, &grid, &mut out)
        .unwrap();
    out
}

fn noiseless_batch() -> TacBatch {
    let times = frame_times();
    let input = plasma(&times);
    let observed = simulate(&TRUTH, &times, &input);
    let curve = TimeActivityCurve::new(times.clone(), observed).unwrap();
    let input = InputFunction::new(times, input).unwrap();
    TacBatch::new(vec![curve], InputAssignment::Shared(input)).unwrap()
}

fn priors() -> PriorSet {
    PriorSet::new(vec![
        Prior::Uniform {
            low: 0.1,
            high: 1.0,
        },
        Prior::Uniform {
            low: 0.05,
            high: 1.0,
        },
        Prior::Uniform {
            low: 0.001,
            high: 0.1,
        },
        Prior::Uniform {
            low: 0.0,
            high: 0.1,
        },
    ])
}

fn settings() -> AbcSettings {
    AbcSettings::new()
        .with_particle_count(1500)
        .with_max_rounds(12)
        .with_convergence_threshold(0.01)
        .with_seed(2024)
}

#[test]
fn recovers_known_parameters_from_noiseless_data() {
    let engine = AbcSmc::new(IrreversibleTwoTissueModel, priors(), settings()).unwrap();
    let outcome = engine.run(&noiseless_batch()).unwrap();

    let posterior = outcome.curve(0);
    let estimate = posterior.estimate();

    assert!((estimate[0] - TRUTH[0]).abs() < 0.2, "K1 = {}", estimate[0]);
    assert!((estimate[1] - TRUTH[1]).abs() < 0.2, "k2 = {}", estimate[1]);
    assert!((estimate[2] - TRUTH[2]).abs() < 0.05, "k3 = {}", estimate[2]);
    assert!((estimate[3] - TRUTH[3]).abs() < 0.05, "vb = {}", estimate[3]);

    // The net influx rate is the well-identified macro parameter.
    let ki_true = net_influx_rate(TRUTH[0], TRUTH[1], TRUTH[2]);
    let ki_est = net_influx_rate(estimate[0], estimate[1], estimate[2]);
    assert!(
        (ki_est - ki_true).abs() < 0.01,
        "Ki = {} vs {}",
        ki_est,
        ki_true
    );

    // The fitted curve reproduces the observations.
    let times = frame_times();
    let input = plasma(&times);
    let observed = simulate(&TRUTH, &times, &input);
    let fitted = simulate(estimate, &times, &input);
    let err: f64 = observed
        .iter()
        .zip(&fitted)
        .map(|(o, f)| (o - f) * (o - f))
        .sum::<f64>()
        .sqrt();
    let scale: f64 = observed.iter().map(|o| o * o).sum::<f64>().sqrt();
    assert!(err / scale < 0.1, "relative misfit {}", err / scale);
}

#[test]
fn posterior_is_tighter_than_the_prior() {
    let engine = AbcSmc::new(IrreversibleTwoTissueModel, priors(), settings()).unwrap();
    let outcome = engine.run(&noiseless_batch()).unwrap();

    let posterior = outcome.curve(0);
    for (dispersion, prior) in posterior.dispersion().iter().zip(priors().marginals()) {
        let prior_sd = (prior.high() - prior.low()) / 12f64.sqrt();
        assert!(*dispersion < prior_sd);
    }
}

#[test]
fn unreachable_data_still_returns_an_estimate() {
    let times = frame_times();
    let input = plasma(&times);
    // Activity far outside anything the prior-supported models can produce.
    let observed = vec![1.0e6; times.len()];
    let curve = TimeActivityCurve::new(times.clone(), observed).unwrap();
    let input = InputFunction::new(times, input).unwrap();
    let batch = TacBatch::new(vec![curve], InputAssignment::Shared(input)).unwrap();

    let engine = AbcSmc::new(IrreversibleTwoTissueModel, priors(), settings()).unwrap();
    let outcome = engine.run(&batch).unwrap();

    let posterior = outcome.curve(0);
    assert!(posterior.estimate().iter().all(|v| v.is_finite()));
    assert!(priors().contains(posterior.estimate()));
    assert!(posterior.rounds() >= 1);
}

#[test]
fn weighted_discrepancy_accepts_per_frame_weights() {
    let times = frame_times();
    let input = plasma(&times);
    let observed = simulate(&TRUTH, &times, &input);
    let weights = vec![2.0; times.len()];
    let curve = TimeActivityCurve::new(times.clone(), observed)
        .unwrap()
        .with_weights(weights)
        .unwrap();
    let input = InputFunction::new(times, input).unwrap();
    let batch = TacBatch::new(vec![curve], InputAssignment::Shared(input)).unwrap();

    let quick = settings().with_particle_count(400).with_max_rounds(4);
    let engine = AbcSmc::new(IrreversibleTwoTissueModel, priors(), quick).unwrap();
    let outcome = engine.run(&batch).unwrap();
    assert!(priors().contains(outcome.curve(0).estimate()));
}
