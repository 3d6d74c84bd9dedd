use adaptive_mh::distributions::{DiagGaussian, IsotropicGaussian};
use adaptive_mh::metropolis_hastings::MetropolisHastings;
use adaptive_mh::proposal::RandomWalkProposal;

use ndarray::Axis;

/// Gibbs-style composition: two samplers share a 2-D standard normal target
/// but each only perturbs its own coordinate. Alternating draws while
/// handing the state back and forth explores the full target.
#[test]
fn blockwise_samplers_compose() {
    const SWEEPS: usize = 10_000;

    let build = |index: usize, seed: u64| {
        let target: DiagGaussian<f64> = DiagGaussian::standard(2);
        let proposal = RandomWalkProposal::new(IsotropicGaussian::new(1.0, 1).unwrap(), vec![1.0])
            .unwrap()
            .with_indices(vec![index])
            .unwrap();
        MetropolisHastings::new(target, proposal, &[0.0, 0.0])
            .unwrap()
            .set_seed(seed)
    };

    let mut first = build(0, 10);
    let mut second = build(1, 11);

    let mut draws = Vec::with_capacity(SWEEPS * 2);
    for _ in 0..SWEEPS {
        let state = first.draw().unwrap();
        second.set_state(state).unwrap();
        let state = second.draw().unwrap();
        draws.extend_from_slice(&state);
        first.set_state(state).unwrap();
    }
    let samples = ndarray::Array2::from_shape_vec((SWEEPS, 2), draws).unwrap();

    let mean = samples.mean_axis(Axis(0)).unwrap();
    let var = samples.var_axis(Axis(0), 1.0);
    for d in 0..2 {
        assert!(
            mean[d].abs() < 0.15,
            "mean[{d}] = {} deviates from 0",
            mean[d]
        );
        assert!(
            (var[d] - 1.0).abs() < 0.3,
            "var[{d}] = {} deviates from 1",
            var[d]
        );
    }

    assert!(first.acceptance_rate().unwrap() > 0.0);
    assert!(second.acceptance_rate().unwrap() > 0.0);
}

/// A marginal sampler leaves the coordinates outside its block untouched.
#[test]
fn marginal_block_fixes_other_coordinates() {
    let target: DiagGaussian<f64> = DiagGaussian::standard(3);
    let proposal = RandomWalkProposal::new(IsotropicGaussian::new(1.0, 1).unwrap(), vec![1.0])
        .unwrap()
        .with_indices(vec![1])
        .unwrap();
    let mut mh = MetropolisHastings::new(target, proposal, &[0.25, 0.0, -0.75])
        .unwrap()
        .set_seed(99);

    for _ in 0..200 {
        let state = mh.draw().unwrap();
        assert_eq!(state[0], 0.25);
        assert_eq!(state[2], -0.75);
    }
}
