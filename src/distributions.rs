/*!
Defines the narrow distribution interfaces consumed by the samplers, together
with a handful of concrete implementations sufficient for priors, proposal
noise, and observation likelihoods.

Everything is generic over the floating-point precision (`f32` or `f64`) via
the [`num_traits::Float`] trait.

# Examples

```rust
use adaptive_mh::distributions::{DiagGaussian, Instrumental, IsotropicGaussian, Target};
use rand::rngs::SmallRng;
use rand::SeedableRng;

// A standard normal prior in 2 dimensions.
let prior: DiagGaussian<f64> = DiagGaussian::standard(2);
let lp = prior.log_density(&[0.5, -0.5]);
println!("log-density: {lp}");

// Zero-mean isotropic Gaussian proposal noise.
let noise: IsotropicGaussian<f64> = IsotropicGaussian::new(1.0, 2).unwrap();
let mut rng = SmallRng::seed_from_u64(42);
let z = noise.sample(&mut rng);
assert_eq!(z.len(), 2);
```
*/

use num_traits::Float;
use rand::rngs::SmallRng;
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use std::f64::consts::PI;

use crate::error::Error;

/// A prior (or more generally target) density over the chain state, known up
/// to normalization.
pub trait Target<T: Float> {
    /// Dimension of the state space.
    fn dim(&self) -> usize;

    /// Log of the (possibly unnormalized) density at `state`.
    fn log_density(&self, state: &[T]) -> T;
}

/// The instrumental distribution driving a random walk: the zero-mean,
/// symmetric noise added to the updated coordinates of the current state.
///
/// `mean` and `skewness` are used by [`RandomWalkProposal::new`] to verify
/// the symmetry required by the unadjusted Metropolis acceptance rule.
///
/// [`RandomWalkProposal::new`]: crate::proposal::RandomWalkProposal::new
pub trait Instrumental<T: Float> {
    /// Dimension of a realization (the block size).
    fn dim(&self) -> usize;

    /// Draws one realization from the distribution.
    fn sample(&self, rng: &mut SmallRng) -> Vec<T>;

    /// Mean vector of the distribution.
    fn mean(&self) -> Vec<T>;

    /// Skewness vector of the distribution.
    fn skewness(&self) -> Vec<T>;
}

/// The conditional distribution of one observation row given a parameter
/// vector, used to build a likelihood term.
pub trait Conditional<T: Float> {
    /// Dimension of one observation row.
    fn obs_dim(&self) -> usize;

    /// Dimension of the parameter vector.
    fn param_dim(&self) -> usize;

    /// Log-density of `observation` under the parameters `params`.
    fn log_density(&self, observation: &[T], params: &[T]) -> T;
}

/// Deterministic link mapping (chain state, per-row covariate) to the
/// parameter vector consumed by a [`Conditional`].
pub trait Link<T: Float> {
    /// Dimension of the chain state accepted by [`Link::eval`].
    fn input_dim(&self) -> usize;

    /// Dimension of the produced parameter vector.
    fn output_dim(&self) -> usize;

    /// Width of one covariate row (0 means "no covariates").
    fn covariate_dim(&self) -> usize;

    /// Computes the conditional parameters for one observation row.
    fn eval(&self, state: &[T], covariate: &[T]) -> Vec<T>;
}

/**
A Gaussian distribution with diagonal covariance, parameterized by a mean
vector and a vector of per-coordinate standard deviations.

Implements [`Target`] (normalized log-density) for use as a closed-form
prior, and [`Instrumental`] so the zero-mean case can drive a random walk.

# Examples

```rust
use adaptive_mh::distributions::{DiagGaussian, Target};

let prior = DiagGaussian::new(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
assert_eq!(prior.dim(), 2);
let lp = prior.log_density(&[0.0, 1.0]);
```
*/
#[derive(Debug, Clone)]
pub struct DiagGaussian<T> {
    /// Mean vector.
    pub mean: Vec<T>,
    /// Per-coordinate standard deviations, all positive.
    pub std: Vec<T>,
}

impl<T: Float> DiagGaussian<T> {
    /// Creates a diagonal Gaussian; `mean` and `std` must have the same
    /// length and every standard deviation must be positive.
    pub fn new(mean: Vec<T>, std: Vec<T>) -> Result<Self, Error> {
        if mean.len() != std.len() {
            return Err(Error::DimensionMismatch {
                what: "diagonal Gaussian standard deviations",
                expected: mean.len(),
                actual: std.len(),
            });
        }
        if std.iter().any(|&s| !(s > T::zero())) {
            return Err(Error::InvalidArgument(
                "standard deviations must be positive".into(),
            ));
        }
        Ok(Self { mean, std })
    }

    /// The standard normal distribution in `dim` dimensions.
    pub fn standard(dim: usize) -> Self {
        Self {
            mean: vec![T::zero(); dim],
            std: vec![T::one(); dim],
        }
    }
}

impl<T: Float> Target<T> for DiagGaussian<T> {
    fn dim(&self) -> usize {
        self.mean.len()
    }

    fn log_density(&self, state: &[T]) -> T {
        let half = T::from(0.5).unwrap();
        let log_two_pi = (T::from(2.0 * PI).unwrap()).ln();
        let mut lp = T::zero();
        for ((&x, &m), &s) in state.iter().zip(&self.mean).zip(&self.std) {
            let z = (x - m) / s;
            lp = lp - half * (log_two_pi + z * z) - s.ln();
        }
        lp
    }
}

impl<T: Float> Instrumental<T> for DiagGaussian<T>
where
    StandardNormal: Distribution<T>,
{
    fn dim(&self) -> usize {
        self.mean.len()
    }

    fn sample(&self, rng: &mut SmallRng) -> Vec<T> {
        self.mean
            .iter()
            .zip(&self.std)
            .map(|(&m, &s)| {
                let z: T = rng.sample(StandardNormal);
                m + s * z
            })
            .collect()
    }

    fn mean(&self) -> Vec<T> {
        self.mean.clone()
    }

    fn skewness(&self) -> Vec<T> {
        vec![T::zero(); self.mean.len()]
    }
}

/**
Zero-mean isotropic Gaussian noise: independent `N(0, std^2)` coordinates.

The workhorse instrumental distribution for random-walk proposals.

# Examples

```rust
use adaptive_mh::distributions::{Instrumental, IsotropicGaussian};
use rand::rngs::SmallRng;
use rand::SeedableRng;

let noise: IsotropicGaussian<f64> = IsotropicGaussian::new(0.5, 3).unwrap();
let mut rng = SmallRng::seed_from_u64(0);
assert_eq!(noise.sample(&mut rng).len(), 3);
```
*/
#[derive(Debug, Clone)]
pub struct IsotropicGaussian<T> {
    /// Standard deviation shared by all coordinates.
    pub std: T,
    dim: usize,
}

impl<T: Float> IsotropicGaussian<T> {
    /// Creates isotropic Gaussian noise of the given dimension; the standard
    /// deviation must be finite and positive.
    pub fn new(std: T, dim: usize) -> Result<Self, Error> {
        if !(std.is_finite() && std > T::zero()) {
            return Err(Error::InvalidArgument(
                "the standard deviation must be finite and positive".into(),
            ));
        }
        Ok(Self { std, dim })
    }
}

impl<T: Float> Instrumental<T> for IsotropicGaussian<T>
where
    StandardNormal: Distribution<T>,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn sample(&self, rng: &mut SmallRng) -> Vec<T> {
        let normal = Normal::new(T::zero(), self.std)
            .expect("Expecting creation of normal distribution to succeed.");
        normal.sample_iter(rng).take(self.dim).collect()
    }

    fn mean(&self) -> Vec<T> {
        vec![T::zero(); self.dim]
    }

    fn skewness(&self) -> Vec<T> {
        vec![T::zero(); self.dim]
    }
}

/// Zero-mean uniform noise on `[-width, width]` in every coordinate.
///
/// Useful when a hard bound on the step size is wanted, e.g. to test
/// bounded-support rejection with steps large enough to exit the support.
#[derive(Debug, Clone)]
pub struct SymmetricUniform<T> {
    /// Half-width of the support, positive.
    pub width: T,
    dim: usize,
}

impl<T: Float> SymmetricUniform<T> {
    /// Creates uniform noise of the given dimension; the half-width must be
    /// finite and positive.
    pub fn new(width: T, dim: usize) -> Result<Self, Error> {
        if !(width.is_finite() && width > T::zero()) {
            return Err(Error::InvalidArgument(
                "the half-width must be finite and positive".into(),
            ));
        }
        Ok(Self { width, dim })
    }
}

impl<T: Float> Instrumental<T> for SymmetricUniform<T>
where
    rand_distr::Standard: Distribution<T>,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn sample(&self, rng: &mut SmallRng) -> Vec<T> {
        let two = T::from(2.0).unwrap();
        (0..self.dim)
            .map(|_| {
                let u: T = rng.gen();
                (two * u - T::one()) * self.width
            })
            .collect()
    }

    fn mean(&self) -> Vec<T> {
        vec![T::zero(); self.dim]
    }

    fn skewness(&self) -> Vec<T> {
        vec![T::zero(); self.dim]
    }
}

/// One-dimensional Gaussian conditional with parameter vector `[mean, std]`.
///
/// A non-positive standard deviation reached by the chain is treated as a
/// zero-density region, not an error.
#[derive(Debug, Clone, Copy)]
pub struct GaussianConditional;

impl<T: Float> Conditional<T> for GaussianConditional {
    fn obs_dim(&self) -> usize {
        1
    }

    fn param_dim(&self) -> usize {
        2
    }

    fn log_density(&self, observation: &[T], params: &[T]) -> T {
        let (mean, std) = (params[0], params[1]);
        if !(std > T::zero()) {
            return T::min_value();
        }
        let half = T::from(0.5).unwrap();
        let log_two_pi = (T::from(2.0 * PI).unwrap()).ln();
        let z = (observation[0] - mean) / std;
        -half * (log_two_pi + z * z) - std.ln()
    }
}

/**
Wraps a closure as a [`Link`] with explicitly declared dimensions.

# Examples

```rust
use adaptive_mh::distributions::{FnLink, Link};

// state = [intercept, slope], covariate = [x]; params = [mu, sigma].
let link = FnLink::new(2, 2, 1, |state: &[f64], cov: &[f64]| {
    vec![state[0] + state[1] * cov[0], 1.0]
});
assert_eq!(link.eval(&[1.0, 2.0], &[3.0]), vec![7.0, 1.0]);
```
*/
#[derive(Debug, Clone)]
pub struct FnLink<F> {
    f: F,
    input_dim: usize,
    output_dim: usize,
    covariate_dim: usize,
}

impl<F> FnLink<F> {
    pub fn new(input_dim: usize, output_dim: usize, covariate_dim: usize, f: F) -> Self {
        Self {
            f,
            input_dim,
            output_dim,
            covariate_dim,
        }
    }
}

impl<T: Float, F: Fn(&[T], &[T]) -> Vec<T>> Link<T> for FnLink<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn covariate_dim(&self) -> usize {
        self.covariate_dim
    }

    fn eval(&self, state: &[T], covariate: &[T]) -> Vec<T> {
        (self.f)(state, covariate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn diag_gaussian_standard_normal_log_density() {
        let prior: DiagGaussian<f64> = DiagGaussian::standard(1);
        // ln(1/sqrt(2*pi)) at the mode.
        assert_abs_diff_eq!(
            prior.log_density(&[0.0]),
            -0.9189385332046727,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            prior.log_density(&[1.0]),
            -0.9189385332046727 - 0.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn diag_gaussian_matches_scaled_shifted_form() {
        let prior = DiagGaussian::new(vec![2.0], vec![3.0]).unwrap();
        let std: DiagGaussian<f64> = DiagGaussian::standard(1);
        let x = 4.7;
        let expected = std.log_density(&[(x - 2.0) / 3.0]) - 3.0f64.ln();
        assert_abs_diff_eq!(prior.log_density(&[x]), expected, epsilon = 1e-12);
    }

    #[test]
    fn diag_gaussian_rejects_bad_construction() {
        assert!(DiagGaussian::new(vec![0.0, 0.0], vec![1.0]).is_err());
        assert!(DiagGaussian::new(vec![0.0], vec![0.0]).is_err());
        assert!(DiagGaussian::new(vec![0.0], vec![-1.0]).is_err());
    }

    #[test]
    fn isotropic_gaussian_moments() {
        let noise: IsotropicGaussian<f64> = IsotropicGaussian::new(1.0, 4).unwrap();
        assert_eq!(noise.dim(), 4);
        assert_eq!(noise.mean(), vec![0.0; 4]);
        assert_eq!(noise.skewness(), vec![0.0; 4]);

        let mut rng = SmallRng::seed_from_u64(7);
        let n = 20_000;
        let mut sum = 0.0;
        for _ in 0..n {
            sum += noise.sample(&mut rng).iter().sum::<f64>();
        }
        let empirical_mean = sum / (n as f64 * 4.0);
        assert!(
            empirical_mean.abs() < 0.05,
            "empirical mean too far from 0: {empirical_mean}"
        );
    }

    #[test]
    fn isotropic_gaussian_rejects_bad_std() {
        // Configuration errors surface at construction, not at draw time.
        assert!(IsotropicGaussian::new(f64::NAN, 1).is_err());
        assert!(IsotropicGaussian::new(f64::INFINITY, 1).is_err());
        assert!(IsotropicGaussian::new(0.0, 1).is_err());
        assert!(IsotropicGaussian::new(-1.0, 1).is_err());
    }

    #[test]
    fn symmetric_uniform_rejects_bad_width() {
        assert!(SymmetricUniform::new(f64::NAN, 1).is_err());
        assert!(SymmetricUniform::new(0.0, 1).is_err());
        assert!(SymmetricUniform::new(-2.0, 1).is_err());
    }

    #[test]
    fn symmetric_uniform_stays_in_range() {
        let noise: SymmetricUniform<f64> = SymmetricUniform::new(2.0, 3).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..1000 {
            for &z in noise.sample(&mut rng).iter() {
                assert!((-2.0..=2.0).contains(&z));
            }
        }
    }

    #[test]
    fn gaussian_conditional_log_density() {
        let cond = GaussianConditional;
        // Standard normal at its mode.
        assert_abs_diff_eq!(
            Conditional::<f64>::log_density(&cond, &[0.0], &[0.0, 1.0]),
            -0.9189385332046727,
            epsilon = 1e-12
        );
        // Zero-density region rather than a panic.
        assert_eq!(
            Conditional::<f64>::log_density(&cond, &[0.0], &[0.0, -1.0]),
            f64::MIN
        );
    }
}
