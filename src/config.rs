//! Construction options for `FuzzyQuantile`.

use tracing::Dispatch;

use crate::error::{Error, Result};
use crate::invariant::{Invariant, Target};

/// The default relative error of the biased invariant, 1%
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Hard cap on the number of values buffered before a batch is merged
///
/// This bounds the cost of sorting a batch and how long an inserted value
/// may wait before queries can see it.
pub const MAX_INSERT_BATCH: usize = 500;

/// Storage behind the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum StoreKind {
    /// An index-stable doubly linked list of tuples.
    LinkedList,
}

impl Default for StoreKind {
    fn default() -> StoreKind {
        StoreKind::LinkedList
    }
}

/// Configuration of a `FuzzyQuantile`
///
/// When `quantiles` is empty the biased invariant with `epsilon` is used,
/// otherwise the targeted invariant over `quantiles` and `epsilon` is
/// ignored.
///
/// # Examples
/// ```
/// use fuzzy_quantile::{Config, Target};
///
/// let conf = Config::targeted(vec![
///     Target::new(0.5, 0.01).unwrap(),
///     Target::new(0.99, 0.001).unwrap(),
/// ]);
/// assert_eq!(Ok(500), conf.buffer_size());
/// assert_eq!(Ok(50), Config::default().buffer_size());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(default))]
pub struct Config {
    /// Relative error of the biased invariant.
    pub epsilon: f64,
    /// Targets of the targeted invariant.
    pub quantiles: Vec<Target>,
    /// Storage behind the summary.
    pub store: StoreKind,
    /// Cap on the insertion buffer, at least 1.
    pub max_batch: usize,
    /// Where diagnostics go. When `None` they are discarded.
    #[cfg_attr(feature = "serde_support", serde(skip))]
    pub dispatch: Option<Dispatch>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            epsilon: DEFAULT_EPSILON,
            quantiles: Vec::new(),
            store: StoreKind::default(),
            max_batch: MAX_INSERT_BATCH,
            dispatch: None,
        }
    }
}

impl Config {
    /// Biased configuration with relative error `epsilon`
    pub fn biased(epsilon: f64) -> Config {
        Config {
            epsilon,
            ..Config::default()
        }
    }

    /// Targeted configuration over `quantiles`
    pub fn targeted(quantiles: Vec<Target>) -> Config {
        Config {
            quantiles,
            ..Config::default()
        }
    }

    /// Replace the buffer cap
    ///
    /// A cap of 1 merges every value as it is inserted. Together with a
    /// single target this is the classic per-element targeted summary.
    pub fn with_max_batch(mut self, max_batch: usize) -> Config {
        self.max_batch = max_batch;
        self
    }

    /// Send diagnostics to `dispatch`
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Config {
        self.dispatch = Some(dispatch);
        self
    }

    /// Validate and build the invariant function
    pub fn invariant(&self) -> Result<Invariant> {
        if self.quantiles.is_empty() {
            Invariant::biased(self.epsilon)
        } else {
            Invariant::targeted(self.quantiles.clone())
        }
    }

    /// The insertion buffer capacity
    ///
    /// `min(max_batch, floor(1 / 2ε))` where ε is the effective epsilon of
    /// the invariant, never less than 1.
    pub fn buffer_size(&self) -> Result<usize> {
        if self.max_batch == 0 {
            return Err(Error::InvalidBatch {
                max_batch: self.max_batch,
            });
        }
        let epsilon = self.invariant()?.effective_epsilon();
        let size = (1.0 / (2.0 * epsilon)) as usize;
        Ok(size.min(self.max_batch).max(1))
    }
}
