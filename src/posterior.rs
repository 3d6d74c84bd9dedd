/*!
Composition of a prior target and an optional observation likelihood into a
single log-posterior function of the chain state.

Two prior forms are supported: a closed-form distribution implementing
[`Target`], or a user log-density function restricted to a [`Support`] region
via [`LogTargetDensity`]. Outside the support the log-density is the finite
zero-density sentinel [`log_zero`], never an error: out-of-support candidates
are legitimate candidates that the acceptance test rejects.
*/

use ndarray::Array2;
use num_traits::Float;

use crate::distributions::{Conditional, Link, Target};
use crate::error::Error;

/// The log-density assigned to zero-probability regions.
///
/// Finite (the lowest finite value of `T`, not `-inf`) so that the
/// log-acceptance-ratio arithmetic never produces NaN.
pub fn log_zero<T: Float>() -> T {
    T::min_value()
}

/// A region of the state space with a membership test.
pub trait Support<T> {
    /// Dimension of the region.
    fn dim(&self) -> usize;

    /// Whether `state` lies inside the region.
    fn contains(&self, state: &[T]) -> bool;
}

/// An axis-aligned box `[lower_0, upper_0] x ... x [lower_{d-1}, upper_{d-1}]`.
#[derive(Debug, Clone)]
pub struct Interval<T> {
    lower: Vec<T>,
    upper: Vec<T>,
}

impl<T: Float> Interval<T> {
    /// Creates the box; bounds must have equal length and satisfy
    /// `lower[i] <= upper[i]`.
    pub fn new(lower: Vec<T>, upper: Vec<T>) -> Result<Self, Error> {
        if lower.len() != upper.len() {
            return Err(Error::DimensionMismatch {
                what: "interval bounds",
                expected: lower.len(),
                actual: upper.len(),
            });
        }
        if lower.iter().zip(&upper).any(|(&l, &u)| l > u) {
            return Err(Error::InvalidArgument(
                "interval lower bound exceeds upper bound".into(),
            ));
        }
        Ok(Self { lower, upper })
    }
}

impl<T: Float> Support<T> for Interval<T> {
    fn dim(&self) -> usize {
        self.lower.len()
    }

    fn contains(&self, state: &[T]) -> bool {
        state
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .all(|(&x, (&l, &u))| x >= l && x <= u)
    }
}

/// The whole of `R^d`.
#[derive(Debug, Clone, Copy)]
pub struct Unbounded {
    dim: usize,
}

impl Unbounded {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl<T> Support<T> for Unbounded {
    fn dim(&self) -> usize {
        self.dim
    }

    fn contains(&self, _state: &[T]) -> bool {
        true
    }
}

/**
A prior given by a user log-density function restricted to a support region.

Implements [`Target`] by evaluating the function inside the support and
returning [`log_zero`] outside it.

# Examples

```rust
use adaptive_mh::distributions::Target;
use adaptive_mh::posterior::{log_zero, Interval, LogTargetDensity};

// Exponential density truncated to [0, 10].
let support = Interval::new(vec![0.0], vec![10.0]).unwrap();
let prior = LogTargetDensity::new(|x: &[f64]| -x[0], support);
assert_eq!(prior.log_density(&[1.0]), -1.0);
assert_eq!(prior.log_density(&[-1.0]), log_zero::<f64>());
```
*/
#[derive(Debug, Clone)]
pub struct LogTargetDensity<F, S> {
    f: F,
    support: S,
}

impl<F, S> LogTargetDensity<F, S> {
    pub fn new(f: F, support: S) -> Self {
        Self { f, support }
    }
}

impl<T, F, S> Target<T> for LogTargetDensity<F, S>
where
    T: Float,
    F: Fn(&[T]) -> T,
    S: Support<T>,
{
    fn dim(&self) -> usize {
        self.support.dim()
    }

    fn log_density(&self, state: &[T]) -> T {
        if self.support.contains(state) {
            (self.f)(state)
        } else {
            log_zero()
        }
    }
}

/**
The likelihood term of a Bayesian posterior: a conditional distribution, an
optional link function, a fixed observation sample, and an optional covariate
sample.

For each observation row the link maps (chain state, covariate row) to the
conditional's parameter vector; the total log-likelihood is the sum of the
per-row conditional log-densities. When no link is set the chain state itself
is the parameter vector. All dimensional cross-checks happen at construction;
the remaining check against the chain dimension happens when the likelihood
is attached to a sampler.

# Examples

```rust
use adaptive_mh::distributions::GaussianConditional;
use adaptive_mh::posterior::Likelihood;
use ndarray::arr2;

// State is directly the [mean, std] parameter of the conditional.
let observations = arr2(&[[0.1], [-0.2], [0.05]]);
let lik: Likelihood<f64> = Likelihood::new(Box::new(GaussianConditional), observations).unwrap();
let total = lik.log_likelihood(&[0.0, 1.0]);
assert!(total.is_finite());
```
*/
pub struct Likelihood<T> {
    conditional: Box<dyn Conditional<T>>,
    link: Option<Box<dyn Link<T>>>,
    observations: Array2<T>,
    covariates: Array2<T>,
}

impl<T: Float> Likelihood<T> {
    /// Creates a likelihood from a conditional and its observation sample.
    /// The observation width must match the conditional dimension.
    pub fn new(
        conditional: Box<dyn Conditional<T>>,
        observations: Array2<T>,
    ) -> Result<Self, Error> {
        if observations.ncols() != conditional.obs_dim() {
            return Err(Error::DimensionMismatch {
                what: "observation sample",
                expected: conditional.obs_dim(),
                actual: observations.ncols(),
            });
        }
        let n = observations.nrows();
        Ok(Self {
            conditional,
            link: None,
            observations,
            covariates: Array2::zeros((n, 0)),
        })
    }

    /// Attaches a link function; its output dimension must match the
    /// conditional's parameter dimension.
    pub fn with_link(mut self, link: Box<dyn Link<T>>) -> Result<Self, Error> {
        if link.output_dim() != self.conditional.param_dim() {
            return Err(Error::DimensionMismatch {
                what: "link function output",
                expected: self.conditional.param_dim(),
                actual: link.output_dim(),
            });
        }
        self.link = Some(link);
        Ok(self)
    }

    /// Attaches a covariate sample: one row per observation, with width equal
    /// to the link's covariate dimension. Requires a link to be set first.
    pub fn with_covariates(mut self, covariates: Array2<T>) -> Result<Self, Error> {
        let link = self.link.as_ref().ok_or_else(|| {
            Error::InvalidArgument("covariates require a link function".into())
        })?;
        if covariates.ncols() != link.covariate_dim() {
            return Err(Error::DimensionMismatch {
                what: "covariate sample",
                expected: link.covariate_dim(),
                actual: covariates.ncols(),
            });
        }
        if covariates.nrows() != self.observations.nrows() {
            return Err(Error::DimensionMismatch {
                what: "covariate sample size",
                expected: self.observations.nrows(),
                actual: covariates.nrows(),
            });
        }
        self.covariates = covariates;
        Ok(self)
    }

    /// Validates the likelihood against the chain dimension `d`: the link
    /// input (or, without a link, the conditional parameter vector) must be
    /// of dimension `d`.
    pub fn check_state_dim(&self, d: usize) -> Result<(), Error> {
        match &self.link {
            Some(link) => {
                if link.input_dim() != d {
                    return Err(Error::DimensionMismatch {
                        what: "link function input",
                        expected: d,
                        actual: link.input_dim(),
                    });
                }
            }
            None => {
                if self.conditional.param_dim() != d {
                    return Err(Error::DimensionMismatch {
                        what: "conditional parameter vector",
                        expected: d,
                        actual: self.conditional.param_dim(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Total log-likelihood of the observation sample at `state`, saturating
    /// at [`log_zero`] when any row falls in a zero-density region.
    pub fn log_likelihood(&self, state: &[T]) -> T {
        let mut value = T::zero();
        for i in 0..self.observations.nrows() {
            let params = match &self.link {
                Some(link) => {
                    let covariate: Vec<T> = self.covariates.row(i).to_vec();
                    link.eval(state, &covariate)
                }
                None => state.to_vec(),
            };
            let obs: Vec<T> = self.observations.row(i).to_vec();
            value = value + self.conditional.log_density(&obs, &params);
            if value <= log_zero() {
                return log_zero();
            }
        }
        value
    }

    /// The observation sample.
    pub fn observations(&self) -> &Array2<T> {
        &self.observations
    }

    /// The covariate sample (zero-width when none was given).
    pub fn covariates(&self) -> &Array2<T> {
        &self.covariates
    }
}

/// Prior and optional likelihood, composed into the log-posterior the
/// acceptance test evaluates.
pub struct Posterior<T, D> {
    target: D,
    likelihood: Option<Likelihood<T>>,
}

impl<T, D> Posterior<T, D>
where
    T: Float,
    D: Target<T>,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            likelihood: None,
        }
    }

    /// Attaches a likelihood term; dimensional checks against the chain must
    /// already have been done via [`Likelihood::check_state_dim`].
    pub(crate) fn set_likelihood(&mut self, likelihood: Likelihood<T>) {
        self.likelihood = Some(likelihood);
    }

    /// Dimension of the state space.
    pub fn dim(&self) -> usize {
        self.target.dim()
    }

    /// Log-density of the prior at `state`.
    pub fn log_prior(&self, state: &[T]) -> T {
        self.target.log_density(state)
    }

    /// Total log-likelihood at `state`; 0 when no likelihood is set
    /// (prior-only sampling).
    pub fn log_likelihood(&self, state: &[T]) -> T {
        match &self.likelihood {
            Some(lik) => lik.log_likelihood(state),
            None => T::zero(),
        }
    }

    /// `log_likelihood(state) + log_prior(state)`, saturating at
    /// [`log_zero`]. The likelihood is skipped entirely when the prior
    /// already vanishes.
    pub fn log_posterior(&self, state: &[T]) -> T {
        let lp = self.log_prior(state);
        if lp <= log_zero() {
            return log_zero();
        }
        let value = self.log_likelihood(state) + lp;
        if value <= log_zero() {
            log_zero()
        } else {
            value
        }
    }

    /// The prior target.
    pub fn target(&self) -> &D {
        &self.target
    }

    /// The likelihood term, if set.
    pub fn likelihood(&self) -> Option<&Likelihood<T>> {
        self.likelihood.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{DiagGaussian, FnLink, GaussianConditional};
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    const LOG_STD_NORMAL_MODE: f64 = -0.9189385332046727;

    #[test]
    fn interval_membership() {
        let b = Interval::new(vec![-1.0, 0.0], vec![1.0, 2.0]).unwrap();
        assert!(b.contains(&[0.0, 1.0]));
        assert!(b.contains(&[-1.0, 2.0]));
        assert!(!b.contains(&[1.5, 1.0]));
        assert!(!b.contains(&[0.0, -0.1]));
    }

    #[test]
    fn interval_rejects_bad_bounds() {
        assert!(Interval::new(vec![0.0], vec![1.0, 2.0]).is_err());
        assert!(Interval::<f64>::new(vec![1.0], vec![0.0]).is_err());
    }

    #[test]
    fn log_target_density_sentinel_outside_support() {
        let support = Interval::new(vec![0.0], vec![1.0]).unwrap();
        let prior = LogTargetDensity::new(|x: &[f64]| -x[0], support);
        assert_eq!(prior.dim(), 1);
        assert_eq!(prior.log_density(&[0.5]), -0.5);
        assert_eq!(prior.log_density(&[2.0]), log_zero::<f64>());
    }

    #[test]
    fn posterior_without_likelihood_equals_prior() {
        let posterior = Posterior::new(DiagGaussian::<f64>::standard(1));
        assert_eq!(posterior.log_likelihood(&[0.3]), 0.0);
        assert_eq!(posterior.log_posterior(&[0.3]), posterior.log_prior(&[0.3]));
        assert_abs_diff_eq!(
            posterior.log_posterior(&[0.0]),
            LOG_STD_NORMAL_MODE,
            epsilon = 1e-12
        );
    }

    #[test]
    fn likelihood_without_link_sums_rows() {
        // State = [mean, std] fed directly to the conditional.
        let observations = arr2(&[[0.0], [1.0]]);
        let lik: Likelihood<f64> =
            Likelihood::new(Box::new(GaussianConditional), observations).unwrap();
        lik.check_state_dim(2).unwrap();
        let expected = LOG_STD_NORMAL_MODE + (LOG_STD_NORMAL_MODE - 0.5);
        assert_abs_diff_eq!(lik.log_likelihood(&[0.0, 1.0]), expected, epsilon = 1e-12);
    }

    #[test]
    fn likelihood_with_link_and_covariates() {
        // Linear regression: y_i ~ N(a + b * x_i, 1), state = [a, b].
        let observations = arr2(&[[1.0], [3.0]]);
        let covariates = arr2(&[[0.0], [1.0]]);
        let link = FnLink::new(2, 2, 1, |state: &[f64], cov: &[f64]| {
            vec![state[0] + state[1] * cov[0], 1.0]
        });
        let lik = Likelihood::new(Box::new(GaussianConditional), observations)
            .unwrap()
            .with_link(Box::new(link))
            .unwrap()
            .with_covariates(covariates)
            .unwrap();
        lik.check_state_dim(2).unwrap();
        // Perfect fit: both residuals are zero.
        assert_abs_diff_eq!(
            lik.log_likelihood(&[1.0, 2.0]),
            2.0 * LOG_STD_NORMAL_MODE,
            epsilon = 1e-12
        );
    }

    #[test]
    fn likelihood_validation() {
        // Observation width must match the conditional dimension.
        let wide = arr2(&[[0.0, 1.0]]);
        assert!(Likelihood::<f64>::new(Box::new(GaussianConditional), wide).is_err());

        // Link output must match the conditional parameter dimension.
        let obs = arr2(&[[0.0]]);
        let bad_link = FnLink::new(2, 3, 0, |_: &[f64], _: &[f64]| vec![0.0, 1.0, 2.0]);
        assert!(Likelihood::new(Box::new(GaussianConditional), obs.clone())
            .unwrap()
            .with_link(Box::new(bad_link))
            .is_err());

        // Covariates without a link are rejected.
        assert!(Likelihood::<f64>::new(Box::new(GaussianConditional), obs.clone())
            .unwrap()
            .with_covariates(arr2(&[[1.0]]))
            .is_err());

        // Covariate row count must match the observations.
        let link = FnLink::new(2, 2, 1, |s: &[f64], _: &[f64]| s.to_vec());
        assert!(Likelihood::new(Box::new(GaussianConditional), obs)
            .unwrap()
            .with_link(Box::new(link))
            .unwrap()
            .with_covariates(arr2(&[[1.0], [2.0]]))
            .is_err());
    }

    #[test]
    fn posterior_saturates_at_sentinel() {
        let support = Interval::new(vec![0.0], vec![1.0]).unwrap();
        let prior = LogTargetDensity::new(|_: &[f64]| 0.0, support);
        let posterior = Posterior::new(prior);
        assert_eq!(posterior.log_posterior(&[-0.5]), log_zero::<f64>());
    }
}
