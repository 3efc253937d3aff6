//! Errors signalled by construction and query.

use thiserror::Error;

/// Failures of `FuzzyQuantile` and `Summary` operations
///
/// None of these are fatal. Query failures are resolved by inserting more
/// data, flushing and waiting before asking again. Construction failures mean
/// the `Config` needs fixing.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// The requested percentile is outside of [0, 1].
    #[error("invalid percentile {percentile}: must be within [0, 1]")]
    InvalidArgument {
        /// The rejected percentile.
        percentile: f64,
    },

    /// No batch has been merged into the summary yet.
    #[error("no items stored")]
    EmptyStore,

    /// The scan found no tuple satisfying the rank window.
    #[error("item not found")]
    NotFound,

    /// The biased error tolerance is outside of (0, 1).
    #[error("invalid epsilon {epsilon}: must be within (0, 1)")]
    InvalidEpsilon {
        /// The rejected epsilon.
        epsilon: f64,
    },

    /// A quantile target has a quantile or error outside of (0, 1).
    #[error("invalid target (quantile {quantile}, error {error}): both must be within (0, 1)")]
    InvalidTarget {
        /// The target quantile.
        quantile: f64,
        /// The target error.
        error: f64,
    },

    /// Targeted mode was requested without any targets.
    #[error("targeted invariant requires at least one target")]
    NoTargets,

    /// The batch cap must admit at least one value.
    #[error("invalid max batch {max_batch}: must be at least 1")]
    InvalidBatch {
        /// The rejected cap.
        max_batch: usize,
    },
}

/// Result alias for this crate.
pub type Result<T> = ::std::result::Result<T, Error>;
