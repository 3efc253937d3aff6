use tracing::{debug, dispatcher, Dispatch};

use crate::config::{Config, StoreKind};
use crate::error::Result;
use crate::invariant::Invariant;
use crate::pipeline::Pipeline;
use crate::summary::Summary;

/// Streaming quantile estimation with buffered, background merging
///
/// Inserted values are buffered and merged into the summary by a worker
/// thread one batch at a time. Queries only see merged values: call `flush`
/// and then `wait`, or `sync` for both, before querying to account for
/// everything inserted so far.
///
/// # Examples
/// ```
/// use fuzzy_quantile::{Config, FuzzyQuantile};
///
/// let mut fq = FuzzyQuantile::new(Config::biased(0.001)).unwrap();
/// for i in 1..1001 {
///     fq.insert(i as f64);
/// }
/// fq.sync();
/// assert_eq!(fq.count(), 1000);
/// assert_eq!(fq.query(0.5), Ok(500.0));
/// assert_eq!(fq.max(), Some(1000.0));
/// ```
#[derive(Debug)]
pub struct FuzzyQuantile {
    pipeline: Pipeline,
}

impl FuzzyQuantile {
    /// Create a new FuzzyQuantile
    ///
    /// Fails when `config` holds an epsilon or a target outside of (0, 1) or
    /// a `max_batch` of zero.
    pub fn new(config: Config) -> Result<FuzzyQuantile> {
        let invariant = config.invariant()?;
        let capacity = config.buffer_size()?;
        let dispatch = config.dispatch.clone().unwrap_or_else(Dispatch::none);

        let summary = match config.store {
            StoreKind::LinkedList => Summary::new(invariant),
        };
        dispatcher::with_default(&dispatch, || {
            debug!(
                capacity,
                store = ?config.store,
                invariant = ?summary.invariant(),
                "fuzzy quantile created"
            )
        });

        Ok(FuzzyQuantile {
            pipeline: Pipeline::new(summary, capacity, dispatch),
        })
    }

    /// Insert a value
    ///
    /// Never waits for a merge in progress. NaN is ignored.
    pub fn insert(&mut self, v: f64) {
        self.pipeline.insert(v);
    }

    /// Hand the buffered values to the merge worker
    ///
    /// This does not wait for the merge to complete, see `wait`.
    pub fn flush(&mut self) {
        self.pipeline.flush();
    }

    /// Block until every flushed or full batch has been merged
    pub fn wait(&self) {
        self.pipeline.wait();
    }

    /// `flush` then `wait`
    pub fn sync(&mut self) {
        self.flush();
        self.wait();
    }

    /// Query for the ε-approximate value at `percentile`
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` when percentile is not within [0, 1].
    /// * `EmptyStore` when no batch has been merged yet.
    /// * `NotFound` when no tuple fits the rank window.
    pub fn query(&self, percentile: f64) -> Result<f64> {
        self.pipeline.summary().query(percentile)
    }

    /// Discard every value, buffered or merged
    pub fn reset(&mut self) {
        self.pipeline.reset();
    }

    /// Human readable statistics of the storage
    ///
    /// Not a stable format.
    pub fn describe(&self) -> String {
        let summary = self.pipeline.summary();
        format!(
            "\nstorage stat:\nbuf size: {}\nbuf use: {}\n{}",
            self.pipeline.capacity(),
            self.pipeline.buffered(),
            *summary
        )
    }

    /// Count of values merged so far
    pub fn count(&self) -> u64 {
        self.pipeline.summary().count()
    }

    /// Number of tuples in the summary
    pub fn size(&self) -> usize {
        self.pipeline.summary().len()
    }

    /// Count of tuples eliminated by compression so far
    pub fn removed(&self) -> u64 {
        self.pipeline.summary().removed()
    }

    /// The exact minimum merged so far
    pub fn min(&self) -> Option<f64> {
        self.pipeline.summary().min()
    }

    /// The exact maximum merged so far
    pub fn max(&self) -> Option<f64> {
        self.pipeline.summary().max()
    }

    /// Capacity of the insertion buffer
    pub fn buffer_capacity(&self) -> usize {
        self.pipeline.capacity()
    }

    /// Values inserted but not yet handed to the merge worker
    pub fn buffered(&self) -> usize {
        self.pipeline.buffered()
    }

    /// The invariant function in use
    pub fn invariant(&self) -> Invariant {
        self.pipeline.summary().invariant().clone()
    }

    /// The diagnostic sink in use
    pub fn dispatch(&self) -> &Dispatch {
        self.pipeline.dispatch()
    }
}
