/*!
Append-only recording of the chain states returned by a sampler, one entry
per external draw regardless of the internal burn-in/thinning granularity.

The storage policy is pluggable through [`HistoryStrategy`] without altering
sampler semantics: [`Full`] keeps everything, [`Last`] keeps a bounded tail.
*/

use ndarray::Array2;
use num_traits::Float;
use std::collections::VecDeque;

/// Storage policy for recorded chain states.
pub trait HistoryStrategy<T> {
    /// Appends one state snapshot.
    fn store(&mut self, state: &[T]);

    /// Number of currently recorded states.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The recorded states as a `len x dim` matrix, oldest first.
    fn sample(&self) -> Array2<T>;
}

/// Unbounded append-only history, the default policy.
#[derive(Debug, Clone)]
pub struct Full<T> {
    dim: usize,
    data: Vec<T>,
    rows: usize,
}

impl<T> Full<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
            rows: 0,
        }
    }
}

impl<T: Float> HistoryStrategy<T> for Full<T> {
    fn store(&mut self, state: &[T]) {
        debug_assert_eq!(state.len(), self.dim);
        self.data.extend_from_slice(state);
        self.rows += 1;
    }

    fn len(&self) -> usize {
        self.rows
    }

    fn sample(&self) -> Array2<T> {
        Array2::from_shape_vec((self.rows, self.dim), self.data.clone())
            .expect("Expecting history buffer to be rectangular.")
    }
}

/// Compacted history keeping only the most recent `capacity` states.
#[derive(Debug, Clone)]
pub struct Last<T> {
    dim: usize,
    capacity: usize,
    data: VecDeque<Vec<T>>,
}

impl<T> Last<T> {
    /// `capacity` must be at least 1; a zero capacity keeps one state.
    pub fn new(dim: usize, capacity: usize) -> Self {
        Self {
            dim,
            capacity: capacity.max(1),
            data: VecDeque::new(),
        }
    }
}

impl<T: Float> HistoryStrategy<T> for Last<T> {
    fn store(&mut self, state: &[T]) {
        debug_assert_eq!(state.len(), self.dim);
        if self.data.len() == self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(state.to_vec());
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn sample(&self) -> Array2<T> {
        let flat: Vec<T> = self.data.iter().flatten().copied().collect();
        Array2::from_shape_vec((self.data.len(), self.dim), flat)
            .expect("Expecting history buffer to be rectangular.")
    }
}
