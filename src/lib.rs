/*!
A compact library for drawing samples from Bayesian posterior distributions
with the Metropolis-Hastings algorithm and an adaptive random-walk proposal.

The posterior is the product (sum in log-space) of a prior — a closed-form
[`Target`](distributions::Target) or a log-density function restricted to a
[`Support`](posterior::Support) region — and an optional observation
[`Likelihood`](posterior::Likelihood). During burn-in the random walk
rescales its steps from the observed acceptance ratio; afterwards the scale
is frozen and every `thinning`-th internal state is recorded.

```rust
use adaptive_mh::distributions::{DiagGaussian, IsotropicGaussian};
use adaptive_mh::metropolis_hastings::MetropolisHastings;
use adaptive_mh::proposal::RandomWalkProposal;

let prior: DiagGaussian<f64> = DiagGaussian::standard(2);
let proposal =
    RandomWalkProposal::new(IsotropicGaussian::new(1.0, 2).unwrap(), vec![1.0, 1.0]).unwrap();

let mut mh = MetropolisHastings::new(prior, proposal, &[0.0, 0.0])
    .unwrap()
    .set_seed(42)
    .set_burn_in(500);

let samples = mh.run(1_000).unwrap();
assert_eq!(samples.shape(), &[1_000, 2]);
```
*/

pub mod distributions;
pub mod error;
pub mod history;
pub mod io;
pub mod metropolis_hastings;
pub mod posterior;
pub mod proposal;
