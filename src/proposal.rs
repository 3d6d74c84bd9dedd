/*!
Candidate generation for Metropolis-Hastings samplers.

[`Proposal`] is the capability "propose a candidate state from the current
state"; [`RandomWalkProposal`] is the concrete adaptive random-walk strategy.
Alternative strategies (independent proposals, gradient-based proposals) can
implement the trait without touching the acceptance engine.
*/

use num_traits::Float;
use rand::rngs::SmallRng;

use crate::distributions::Instrumental;
use crate::error::Error;

/// Tolerance on the norm of the instrumental distribution's mean and
/// skewness vectors for the symmetry check.
pub const SYMMETRY_EPS: f64 = 1e-12;

/// A strategy for proposing candidate states.
pub trait Proposal<T: Float> {
    /// Proposes a candidate state from the current state, drawing randomness
    /// from the chain's generator.
    fn propose(&mut self, current: &[T], rng: &mut SmallRng) -> Vec<T>;

    /// Validates the proposal against the chain dimension `d` at sampler
    /// construction. Strategies updating a block of coordinates resolve an
    /// unspecified block to all of `[0, d)` here.
    fn check_dims(&mut self, d: usize) -> Result<(), Error>;

    /// Number of internal draws per adaptation window, or `None` for
    /// proposals that never adapt.
    fn adaptation_period(&self) -> Option<u64> {
        None
    }

    /// Rescaling callback invoked by the engine during burn-in with the
    /// acceptance ratio observed over the last window.
    fn adapt(&mut self, _rho: T) {}
}

/**
Step-scale adaptation parameters for the random walk.

While the chain is in burn-in, every `period` internal draws the step scale
is multiplied by `shrink` when the window acceptance ratio falls below
`lower` (too many rejections) and by `expansion` when it exceeds `upper`
(acceptance too easy, chain not exploring).

The default targets the `[0.117, 0.468]` acceptance interval with factors
0.8/1.2 over windows of 30 draws.
*/
#[derive(Debug, Clone, Copy)]
pub struct AdaptationConfig<T> {
    /// Lower bound of the target acceptance-rate interval, in (0, 1).
    pub lower: T,
    /// Upper bound of the target acceptance-rate interval, in (0, 1).
    pub upper: T,
    /// Step expansion factor, > 1.
    pub expansion: T,
    /// Step shrink factor, in (0, 1).
    pub shrink: T,
    /// Number of internal draws per adaptation window, >= 1.
    pub period: u64,
}

impl<T: Float> AdaptationConfig<T> {
    /// Validates and creates the configuration.
    pub fn new(lower: T, upper: T, expansion: T, shrink: T, period: u64) -> Result<Self, Error> {
        if !(lower > T::zero() && upper < T::one() && lower < upper) {
            return Err(Error::InvalidArgument(
                "adaptation range must satisfy 0 < lower < upper < 1".into(),
            ));
        }
        if !(expansion > T::one()) {
            return Err(Error::InvalidArgument(
                "expansion factor must be > 1".into(),
            ));
        }
        if !(shrink > T::zero() && shrink < T::one()) {
            return Err(Error::InvalidArgument(
                "shrink factor must be in (0, 1)".into(),
            ));
        }
        if period == 0 {
            return Err(Error::InvalidArgument(
                "adaptation period must be positive".into(),
            ));
        }
        Ok(Self {
            lower,
            upper,
            expansion,
            shrink,
            period,
        })
    }
}

impl<T: Float> Default for AdaptationConfig<T> {
    fn default() -> Self {
        Self {
            lower: T::from(0.117).unwrap(),
            upper: T::from(0.468).unwrap(),
            expansion: T::from(1.2).unwrap(),
            shrink: T::from(0.8).unwrap(),
            period: 30,
        }
    }
}

/**
Adaptive random-walk proposal.

A candidate is the current state with `delta[j] * z[j]` added to the `j`-th
updated coordinate, where `z` is a realization of a symmetric zero-mean
instrumental distribution and `delta` the per-block step scale. Coordinates
outside the block are left unchanged, which is what allows an external
orchestrator to compose several samplers block-wise over one shared state.

# Examples

```rust
use adaptive_mh::distributions::IsotropicGaussian;
use adaptive_mh::proposal::RandomWalkProposal;

// Update only the first and third coordinate of a 4-dimensional chain.
let proposal = RandomWalkProposal::new(IsotropicGaussian::new(1.0f64, 2).unwrap(), vec![0.5, 0.5])
    .unwrap()
    .with_indices(vec![0, 2])
    .unwrap();
assert_eq!(proposal.delta(), &[0.5, 0.5]);
```
*/
#[derive(Debug, Clone)]
pub struct RandomWalkProposal<T, I> {
    instrumental: I,
    delta: Vec<T>,
    indices: Vec<usize>,
    adaptation: AdaptationConfig<T>,
}

impl<T, I> RandomWalkProposal<T, I>
where
    T: Float,
    I: Instrumental<T>,
{
    /// Creates a random walk driven by `instrumental` with initial step
    /// scale `delta` (one positive entry per updated coordinate).
    ///
    /// Fails when the instrumental dimension does not match the step scale
    /// or when the instrumental is not symmetric around zero within
    /// [`SYMMETRY_EPS`].
    pub fn new(instrumental: I, delta: Vec<T>) -> Result<Self, Error> {
        if instrumental.dim() != delta.len() {
            return Err(Error::DimensionMismatch {
                what: "instrumental distribution",
                expected: delta.len(),
                actual: instrumental.dim(),
            });
        }
        if delta.iter().any(|&d| !(d > T::zero())) {
            return Err(Error::InvalidArgument(
                "step scale entries must be positive".into(),
            ));
        }
        let eps = T::from(SYMMETRY_EPS).unwrap();
        if norm(&instrumental.skewness()) >= eps {
            return Err(Error::InvalidArgument(
                "the instrumental distribution is not symmetric".into(),
            ));
        }
        if norm(&instrumental.mean()) >= eps {
            return Err(Error::InvalidArgument(
                "the instrumental distribution must have a null mean".into(),
            ));
        }
        Ok(Self {
            instrumental,
            delta,
            indices: Vec::new(),
            adaptation: AdaptationConfig::default(),
        })
    }

    /// Restricts the walk to the given coordinate block. Indices must be
    /// distinct and as many as there are step-scale entries; unset indices
    /// default to all coordinates when the sampler is constructed.
    pub fn with_indices(mut self, indices: Vec<usize>) -> Result<Self, Error> {
        if indices.len() != self.delta.len() {
            return Err(Error::DimensionMismatch {
                what: "marginal indices",
                expected: self.delta.len(),
                actual: indices.len(),
            });
        }
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != indices.len() {
            return Err(Error::InvalidArgument(
                "marginal indices must be distinct".into(),
            ));
        }
        self.indices = indices;
        Ok(self)
    }

    /// Replaces the adaptation configuration.
    pub fn with_adaptation(mut self, adaptation: AdaptationConfig<T>) -> Self {
        self.adaptation = adaptation;
        self
    }

    /// The current step scale.
    pub fn delta(&self) -> &[T] {
        &self.delta
    }

    /// The updated coordinate block (empty until resolved against the chain
    /// dimension at sampler construction).
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The adaptation configuration.
    pub fn adaptation(&self) -> &AdaptationConfig<T> {
        &self.adaptation
    }

    /// The instrumental distribution.
    pub fn instrumental(&self) -> &I {
        &self.instrumental
    }
}

impl<T, I> Proposal<T> for RandomWalkProposal<T, I>
where
    T: Float,
    I: Instrumental<T>,
{
    fn propose(&mut self, current: &[T], rng: &mut SmallRng) -> Vec<T> {
        let z = self.instrumental.sample(rng);
        let mut candidate = current.to_vec();
        for (j, &idx) in self.indices.iter().enumerate() {
            candidate[idx] = candidate[idx] + self.delta[j] * z[j];
        }
        candidate
    }

    fn check_dims(&mut self, d: usize) -> Result<(), Error> {
        if self.indices.is_empty() {
            if self.delta.len() != d {
                return Err(Error::DimensionMismatch {
                    what: "step scale",
                    expected: d,
                    actual: self.delta.len(),
                });
            }
            self.indices = (0..d).collect();
            return Ok(());
        }
        if let Some(&bad) = self.indices.iter().find(|&&idx| idx >= d) {
            return Err(Error::InvalidArgument(format!(
                "marginal index {bad} out of range for dimension {d}"
            )));
        }
        Ok(())
    }

    fn adaptation_period(&self) -> Option<u64> {
        Some(self.adaptation.period)
    }

    fn adapt(&mut self, rho: T) {
        if rho < self.adaptation.lower {
            // too many rejections: make smaller steps
            for d in self.delta.iter_mut() {
                *d = *d * self.adaptation.shrink;
            }
        } else if rho > self.adaptation.upper {
            // acceptance too easy: make larger steps
            for d in self.delta.iter_mut() {
                *d = *d * self.adaptation.expansion;
            }
        }
    }
}

fn norm<T: Float>(v: &[T]) -> T {
    v.iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{DiagGaussian, IsotropicGaussian};
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn rejects_mismatched_instrumental() {
        let r = RandomWalkProposal::new(IsotropicGaussian::new(1.0f64, 3).unwrap(), vec![1.0, 1.0]);
        assert!(matches!(r, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn rejects_non_positive_delta() {
        let r = RandomWalkProposal::new(IsotropicGaussian::new(1.0f64, 2).unwrap(), vec![1.0, 0.0]);
        assert!(r.is_err());
    }

    #[test]
    fn rejects_non_centered_instrumental() {
        // Gaussian with a shifted mean fails the null-mean check.
        let shifted = DiagGaussian::new(vec![0.5], vec![1.0]).unwrap();
        let r = RandomWalkProposal::new(shifted, vec![1.0]);
        assert!(matches!(r, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn rejects_duplicate_indices() {
        let r = RandomWalkProposal::new(IsotropicGaussian::new(1.0f64, 2).unwrap(), vec![1.0, 1.0])
            .unwrap()
            .with_indices(vec![1, 1]);
        assert!(r.is_err());
    }

    #[test]
    fn check_dims_fills_default_indices() {
        let mut p =
            RandomWalkProposal::new(IsotropicGaussian::new(1.0f64, 3).unwrap(), vec![1.0; 3]).unwrap();
        p.check_dims(3).unwrap();
        assert_eq!(p.indices(), &[0, 1, 2]);
    }

    #[test]
    fn check_dims_rejects_out_of_range_index() {
        let mut p = RandomWalkProposal::new(IsotropicGaussian::new(1.0f64, 1).unwrap(), vec![1.0])
            .unwrap()
            .with_indices(vec![4])
            .unwrap();
        assert!(p.check_dims(3).is_err());
    }

    #[test]
    fn propose_leaves_other_coordinates_unchanged() {
        let mut p = RandomWalkProposal::new(IsotropicGaussian::new(1.0f64, 1).unwrap(), vec![1.0])
            .unwrap()
            .with_indices(vec![1])
            .unwrap();
        p.check_dims(3).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..100 {
            let candidate = p.propose(&[1.0, 2.0, 3.0], &mut rng);
            assert_eq!(candidate[0], 1.0);
            assert_eq!(candidate[2], 3.0);
        }
    }

    #[test]
    fn adapt_branches() {
        let config = AdaptationConfig::new(0.2, 0.5, 2.0, 0.5, 10).unwrap();
        let mut p = RandomWalkProposal::new(IsotropicGaussian::new(1.0f64, 1).unwrap(), vec![1.0])
            .unwrap()
            .with_adaptation(config);

        // Below the interval: shrink.
        p.adapt(0.1);
        assert_abs_diff_eq!(p.delta()[0], 0.5);
        // Inside the interval: unchanged.
        p.adapt(0.3);
        assert_abs_diff_eq!(p.delta()[0], 0.5);
        // Above the interval: expand.
        p.adapt(0.9);
        assert_abs_diff_eq!(p.delta()[0], 1.0);
    }

    #[test]
    fn adaptation_config_validation() {
        assert!(AdaptationConfig::new(0.0, 0.5, 1.2, 0.8, 10).is_err());
        assert!(AdaptationConfig::new(0.2, 1.0, 1.2, 0.8, 10).is_err());
        assert!(AdaptationConfig::new(0.5, 0.2, 1.2, 0.8, 10).is_err());
        assert!(AdaptationConfig::new(0.2, 0.5, 1.0, 0.8, 10).is_err());
        assert!(AdaptationConfig::new(0.2, 0.5, 1.2, 1.0, 10).is_err());
        assert!(AdaptationConfig::new(0.2, 0.5, 1.2, 0.8, 0).is_err());
        assert!(AdaptationConfig::<f64>::new(0.2, 0.5, 1.2, 0.8, 1).is_ok());
    }
}
