//! Error type shared by all samplers in this crate.
//!
//! Configuration problems are reported eagerly by constructors and setters;
//! the only draw-time failure is an initial state with zero posterior density.

use thiserror::Error;

/// Errors raised by sampler construction, configuration, or the first draw.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two entities that must agree in dimension do not.
    #[error("{what}: expected dimension {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A configuration value is out of its admissible range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The initial state has zero posterior density. Detected on the first
    /// draw, the only place where initialization is validated.
    #[error("the initial state should have non-zero posterior probability density")]
    InvalidInitialState,

    /// A statistic was queried before any draw was taken.
    #[error("{0} is not yet available: no samples were generated")]
    NotYetAvailable(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = Error::DimensionMismatch {
            what: "instrumental distribution",
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            e.to_string(),
            "instrumental distribution: expected dimension 2, got 3"
        );
        assert_eq!(
            Error::NotYetAvailable("acceptance rate").to_string(),
            "acceptance rate is not yet available: no samples were generated"
        );
    }
}
