use adaptive_mh::distributions::{DiagGaussian, FnLink, GaussianConditional, IsotropicGaussian};
use adaptive_mh::metropolis_hastings::MetropolisHastings;
use adaptive_mh::posterior::Likelihood;
use adaptive_mh::proposal::RandomWalkProposal;

use ndarray::{Array2, Axis};
use std::error::Error;

/// Bayesian linear regression: y_i ~ N(a + b * x_i, 0.5), state = [a, b],
/// sampled with an adaptive random walk over the standard normal prior.
fn main() -> Result<(), Box<dyn Error>> {
    // Synthetic observations from a = 1, b = 2.
    let xs: Vec<f64> = (0..20).map(|i| i as f64 / 10.0).collect();
    let observations =
        Array2::from_shape_vec((20, 1), xs.iter().map(|x| 1.0 + 2.0 * x).collect())?;
    let covariates = Array2::from_shape_vec((20, 1), xs)?;

    let link = FnLink::new(2, 2, 1, |state: &[f64], cov: &[f64]| {
        vec![state[0] + state[1] * cov[0], 0.5]
    });
    let likelihood = Likelihood::new(Box::new(GaussianConditional), observations)?
        .with_link(Box::new(link))?
        .with_covariates(covariates)?;

    let prior: DiagGaussian<f64> = DiagGaussian::standard(2);
    let proposal = RandomWalkProposal::new(IsotropicGaussian::new(1.0, 2)?, vec![0.5, 0.5])?;

    let mut mh = MetropolisHastings::new(prior, proposal, &[0.0, 0.0])?
        .set_likelihood(likelihood)?
        .set_burn_in(2_000)
        .set_thinning(5)?
        .set_seed(42);

    let samples = mh.run_progress(5_000)?;

    let mean = samples
        .mean_axis(Axis(0))
        .ok_or("Computing the posterior mean failed.")?;
    println!("Posterior mean: {mean}");
    println!("Acceptance rate: {:.3}", mh.acceptance_rate()?);
    println!("Final step scale: {:?}", mh.proposal().delta());

    Ok(())
}
