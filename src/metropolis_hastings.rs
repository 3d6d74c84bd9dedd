/*!
# Metropolis-Hastings acceptance engine

This module implements the single-chain Metropolis-Hastings sampler driving
a [`Proposal`] strategy against a Bayesian log-posterior (prior [`Target`]
plus optional [`Likelihood`]). One external [`draw`](MetropolisHastings::draw)
performs `thinning` internal iterations (plus `burn_in` extra ones on the
very first draw), records the resulting state in the history, and returns it.

## Overview

- **Acceptance test**: entirely in log-space; a candidate is accepted iff
  `ln(u) < log_posterior(candidate) - log_posterior(current)` with
  `u ~ Uniform(0, 1)`, which avoids overflow for very large or very negative
  ratios.
- **Adaptation**: during burn-in the engine periodically reports the window
  acceptance ratio to the proposal, which may rescale its steps; the scale is
  frozen once burn-in ends.
- **Reproducibility**: the chain owns a seeded [`SmallRng`]; two samplers
  constructed identically and given the same seed produce bit-identical
  state and history sequences.

## Example

```rust
use adaptive_mh::distributions::{DiagGaussian, IsotropicGaussian};
use adaptive_mh::metropolis_hastings::MetropolisHastings;
use adaptive_mh::proposal::RandomWalkProposal;

let prior: DiagGaussian<f64> = DiagGaussian::standard(1);
let proposal = RandomWalkProposal::new(IsotropicGaussian::new(1.0, 1).unwrap(), vec![1.0]).unwrap();
let mut mh = MetropolisHastings::new(prior, proposal, &[0.0])
    .unwrap()
    .set_seed(42);

let samples = mh.run(100).unwrap();
assert_eq!(samples.shape(), &[100, 1]);
let rate = mh.acceptance_rate().unwrap();
assert!(rate > 0.0 && rate <= 1.0);
```
*/

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{ArrayView1, Array2};
use num_traits::Float;
use rand::prelude::*;

use crate::distributions::Target;
use crate::error::Error;
use crate::history::{Full, HistoryStrategy};
use crate::posterior::{log_zero, Likelihood, Posterior};
use crate::proposal::Proposal;

/**
A single Markov chain sampling a Bayesian posterior with the
Metropolis-Hastings algorithm.

# Type Parameters
- `T`: the floating-point type (`f32` or `f64`).
- `D`: the prior target, implementing [`Target`].
- `P`: the proposal strategy, implementing [`Proposal`].
- `H`: the history storage policy, [`Full`] by default.

The chain is a single logical thread of control: `draw` takes `&mut self`,
so concurrent draws on one instance are ruled out at compile time. Callers
wanting several independent chains construct one sampler per chain with
independent seeds.
*/
pub struct MetropolisHastings<T, D, P, H = Full<T>> {
    posterior: Posterior<T, D>,
    proposal: P,
    initial_state: Vec<T>,
    current_state: Vec<T>,
    burn_in: u64,
    thinning: u64,
    samples_number: u64,
    accepted_number: u64,
    accepted_adaptation: u64,
    current_log_posterior: Option<T>,
    log_floor: T,
    history: H,
    /// The chain's random seed.
    pub seed: u64,
    rng: SmallRng,
}

impl<T, D, P> MetropolisHastings<T, D, P, Full<T>>
where
    T: Float,
    D: Target<T>,
    P: Proposal<T>,
{
    /**
    Constructs a sampler for the given prior target, proposal strategy, and
    initial state, with an unbounded history.

    Validates eagerly: the initial state dimension must match the target
    dimension, and the proposal must pass its own dimensional checks (e.g.
    marginal indices within range). An empty coordinate block in the
    proposal defaults to all coordinates here.

    # Examples

    ```rust
    use adaptive_mh::distributions::{DiagGaussian, IsotropicGaussian};
    use adaptive_mh::metropolis_hastings::MetropolisHastings;
    use adaptive_mh::proposal::RandomWalkProposal;

    let prior: DiagGaussian<f64> = DiagGaussian::standard(2);
    let proposal =
        RandomWalkProposal::new(IsotropicGaussian::new(1.0, 2).unwrap(), vec![1.0, 1.0]).unwrap();
    let mh = MetropolisHastings::new(prior, proposal, &[0.0, 0.0]).unwrap();
    assert_eq!(mh.dim(), 2);
    ```
    */
    pub fn new(target: D, mut proposal: P, initial_state: &[T]) -> Result<Self, Error> {
        let d = initial_state.len();
        if target.dim() != d {
            return Err(Error::DimensionMismatch {
                what: "initial state",
                expected: target.dim(),
                actual: d,
            });
        }
        proposal.check_dims(d)?;
        let seed = thread_rng().gen::<u64>();
        Ok(Self {
            posterior: Posterior::new(target),
            proposal,
            initial_state: initial_state.to_vec(),
            current_state: initial_state.to_vec(),
            burn_in: 0,
            thinning: 1,
            samples_number: 0,
            accepted_number: 0,
            accepted_adaptation: 0,
            current_log_posterior: None,
            log_floor: log_zero(),
            history: Full::new(d),
            seed,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

impl<T, D, P, H> MetropolisHastings<T, D, P, H>
where
    T: Float,
    D: Target<T>,
    P: Proposal<T>,
    H: HistoryStrategy<T>,
{
    /// Sets a new seed for the chain's random number generator, ensuring
    /// reproducibility across runs.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Sets the number of initial internal iterations run once, on the
    /// first draw, before the chain is considered stationary. Step-scale
    /// adaptation only happens during this phase.
    pub fn set_burn_in(mut self, burn_in: u64) -> Self {
        self.burn_in = burn_in;
        self
    }

    /// Sets the number of internal iterations per recorded draw; must be
    /// at least 1.
    pub fn set_thinning(mut self, thinning: u64) -> Result<Self, Error> {
        if thinning == 0 {
            return Err(Error::InvalidArgument(
                "the thinning parameter must be positive".into(),
            ));
        }
        self.thinning = thinning;
        Ok(self)
    }

    /// Attaches an observation likelihood, turning prior-only sampling into
    /// posterior sampling. Cross-checks the likelihood dimensions against
    /// the chain dimension.
    pub fn set_likelihood(mut self, likelihood: Likelihood<T>) -> Result<Self, Error> {
        likelihood.check_state_dim(self.dim())?;
        self.posterior.set_likelihood(likelihood);
        self.current_log_posterior = None;
        Ok(self)
    }

    /// Overrides the zero-density threshold used to validate the initial
    /// state and to short-circuit out-of-support candidates.
    pub fn set_log_floor(mut self, log_floor: T) -> Self {
        self.log_floor = log_floor;
        self
    }

    /// Replaces the history storage policy, keeping all other chain state.
    pub fn set_history<H2: HistoryStrategy<T>>(
        self,
        history: H2,
    ) -> MetropolisHastings<T, D, P, H2> {
        MetropolisHastings {
            posterior: self.posterior,
            proposal: self.proposal,
            initial_state: self.initial_state,
            current_state: self.current_state,
            burn_in: self.burn_in,
            thinning: self.thinning,
            samples_number: self.samples_number,
            accepted_number: self.accepted_number,
            accepted_adaptation: self.accepted_adaptation,
            current_log_posterior: self.current_log_posterior,
            log_floor: self.log_floor,
            history,
            seed: self.seed,
            rng: self.rng,
        }
    }

    /// Dimension of the chain state.
    pub fn dim(&self) -> usize {
        self.initial_state.len()
    }

    /// The state the chain was constructed with.
    pub fn initial_state(&self) -> &[T] {
        &self.initial_state
    }

    /// The current position of the chain.
    pub fn current_state(&self) -> &[T] {
        &self.current_state
    }

    /// Replaces the current position of the chain and invalidates the
    /// cached log-posterior.
    ///
    /// This is the seam for block-wise (Gibbs-style) composition: an
    /// orchestrator owning several samplers over disjoint coordinate blocks
    /// propagates the shared evolving state between them with this method.
    pub fn set_state(&mut self, state: Vec<T>) -> Result<(), Error> {
        if state.len() != self.dim() {
            return Err(Error::DimensionMismatch {
                what: "chain state",
                expected: self.dim(),
                actual: state.len(),
            });
        }
        self.current_state = state;
        self.current_log_posterior = None;
        Ok(())
    }

    /// Total internal iterations taken so far.
    pub fn samples_number(&self) -> u64 {
        self.samples_number
    }

    /// Total accepted candidates so far.
    pub fn accepted_number(&self) -> u64 {
        self.accepted_number
    }

    /// Burn-in length.
    pub fn burn_in(&self) -> u64 {
        self.burn_in
    }

    /// Thinning factor.
    pub fn thinning(&self) -> u64 {
        self.thinning
    }

    /// The recorded history of returned states.
    pub fn history(&self) -> &H {
        &self.history
    }

    /// The proposal strategy.
    pub fn proposal(&self) -> &P {
        &self.proposal
    }

    /// The composed posterior.
    pub fn posterior(&self) -> &Posterior<T, D> {
        &self.posterior
    }

    /// Fraction of accepted candidates over all internal iterations.
    /// Fails until at least one draw was taken.
    pub fn acceptance_rate(&self) -> Result<T, Error> {
        if self.samples_number == 0 {
            return Err(Error::NotYetAvailable("acceptance rate"));
        }
        Ok(T::from(self.accepted_number).unwrap() / T::from(self.samples_number).unwrap())
    }
}

impl<T, D, P, H> MetropolisHastings<T, D, P, H>
where
    T: Float,
    D: Target<T>,
    P: Proposal<T>,
    H: HistoryStrategy<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    /**
    Advances the chain by one external draw and returns the new state.

    Performs `thinning` internal Metropolis-Hastings iterations, preceded by
    `burn_in` extra ones if this is the first draw. Each iteration proposes
    a candidate, computes the log acceptance ratio

    ```text
    log alpha = log_posterior(candidate) - log_posterior(current)
    ```

    and accepts iff `ln(u) < log alpha` for `u ~ Uniform(0, 1)`. Candidates
    at the zero-density floor are rejected outright, independent of the
    uniform draw. The state reached after the last internal iteration is
    appended to the history and returned.

    # Errors

    Fails with [`Error::InvalidInitialState`] when, on the very first draw,
    the initial state itself has zero posterior density.
    */
    pub fn draw(&mut self) -> Result<Vec<T>, Error> {
        let size = self.thinning + if self.samples_number == 0 { self.burn_in } else { 0 };

        let mut current_lp = match self.current_log_posterior {
            Some(lp) => lp,
            None => {
                let lp = self.posterior.log_posterior(&self.current_state);
                if self.samples_number == 0 && lp <= self.log_floor {
                    return Err(Error::InvalidInitialState);
                }
                lp
            }
        };

        for _ in 0..size {
            let candidate = self.proposal.propose(&self.current_state, &mut self.rng);
            let new_lp = self.posterior.log_posterior(&candidate);

            // alpha = posterior(candidate) / posterior(current), in log-space
            let log_alpha = new_lp - current_lp;
            let u: T = self.rng.gen();
            if new_lp > self.log_floor && u.ln() < log_alpha {
                current_lp = new_lp;
                self.accepted_number += 1;
                self.accepted_adaptation += 1;
                self.current_state = candidate;
            }

            self.samples_number += 1;

            // re-adapt the proposal while still in burn-in
            if self.samples_number < self.burn_in {
                if let Some(period) = self.proposal.adaptation_period() {
                    if self.samples_number % period == period - 1 {
                        let rho = T::from(self.accepted_adaptation).unwrap()
                            / T::from(period).unwrap();
                        self.proposal.adapt(rho);
                        self.accepted_adaptation = 0;
                    }
                }
            }
        }

        self.current_log_posterior = Some(current_lp);
        self.history.store(&self.current_state);
        Ok(self.current_state.clone())
    }

    /// Takes `n_draws` draws and returns them as an `n_draws x dim` matrix,
    /// one row per draw.
    pub fn run(&mut self, n_draws: usize) -> Result<Array2<T>, Error> {
        let mut out = Array2::<T>::zeros((n_draws, self.dim()));
        for i in 0..n_draws {
            let state = self.draw()?;
            out.row_mut(i).assign(&ArrayView1::from(state.as_slice()));
        }
        Ok(out)
    }

    /// Like [`run`](Self::run), with a progress bar.
    pub fn run_progress(&mut self, n_draws: usize) -> Result<Array2<T>, Error> {
        let pb = ProgressBar::new(n_draws as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );

        let mut out = Array2::<T>::zeros((n_draws, self.dim()));
        for i in 0..n_draws {
            let state = self.draw()?;
            out.row_mut(i).assign(&ArrayView1::from(state.as_slice()));
            pb.inc(1);
        }
        pb.finish_with_message("Done!");
        Ok(out)
    }
}
