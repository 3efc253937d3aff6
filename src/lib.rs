//! This crate provides biased and targeted quantiles over data streams in a
//! moderate amount of memory.
//!
//! Order statistics is a rough business. Exact solutions are expensive in terms
//! of memory and computation. The summary of Cormode, Korn, Muthukrishnan and
//! Srivastava keeps a bounded set of tuples whose rank error is governed by an
//! invariant function: either a uniform relative error (biased) or a set of
//! quantiles of special interest with their own tolerances (targeted).
//!
//! `FuzzyQuantile` puts a buffered ingestion pipeline in front of the
//! summary. Values are collected in batches which are merged by a background
//! worker, keeping the cost of insertion low on the producer side. `Summary`
//! is the synchronous core and may be used on its own.
#![deny(missing_docs, missing_copy_implementations, missing_debug_implementations,
        unstable_features, unused_import_braces)]

#[cfg(test)]
extern crate quickcheck;

#[cfg(feature = "serde_support")]
#[macro_use]
extern crate serde_derive;

#[cfg(feature = "serde_support")]
extern crate serde;

mod config;
mod error;
mod invariant;
mod pipeline;
mod quantile;
pub mod summary;

pub use crate::config::{Config, StoreKind, DEFAULT_EPSILON, MAX_INSERT_BATCH};
pub use crate::error::{Error, Result};
pub use crate::invariant::{Invariant, Target};
pub use crate::quantile::FuzzyQuantile;
pub use crate::summary::{Summary, Tuple};
