//! This is an implementation of the summary presented in Cormode, Korn,
//! Muthukrishnan, Srivastava's paper "Effective Computation of Biased Quantiles
//! over Data Streams". The ambition here is to approximate quantiles on a
//! stream of data without having a boatload of information kept in memory.
//!
//! The summary S(n) is an ordered sequence of tuples (v, g, delta). For the
//! tuple at rank r -- the sum of the g of every tuple before it -- the
//! invariant `g + delta <= f(r, n)` holds after every insertion and every
//! compression. The first and last tuples always have a delta of zero: the
//! minimum and maximum are known exactly.
//!
//! `Summary` is the synchronous core. It is driven in batches by the
//! ingestion pipeline of `FuzzyQuantile` but may be used directly, one value
//! or one batch at a time.
use std::fmt;

mod entry;
pub(crate) mod list;

pub use self::entry::Tuple;
use self::list::List;
use crate::error::{Error, Result};
use crate::invariant::Invariant;

/// A structure to provide approximate quantile queries in bounded memory and
/// with bounded error.
#[derive(Clone, Debug)]
pub struct Summary {
    invariant: Invariant,

    // The outlined implementation uses a linked list and so do we. Batches
    // splice new tuples into the middle of the sequence and compression
    // unlinks them again, both of which are O(1) here.
    tuples: List<Tuple>,

    count: u64,   // total samples ever merged
    removed: u64, // total tuples ever eliminated by compression
}

impl Summary {
    /// Create a new, empty Summary
    ///
    /// # Examples
    /// ```
    /// use fuzzy_quantile::{Invariant, Summary};
    ///
    /// let mut summary = Summary::new(Invariant::biased(0.001).unwrap());
    /// for i in 1..1001 {
    ///     summary.insert(i as f64);
    /// }
    /// assert_eq!(summary.query(0.5), Ok(500.0));
    /// assert_eq!(summary.query(0.95), Ok(950.0));
    /// ```
    pub fn new(invariant: Invariant) -> Summary {
        Summary {
            invariant,
            tuples: List::new(),
            count: 0,
            removed: 0,
        }
    }

    /// The invariant function governing this summary
    pub fn invariant(&self) -> &Invariant {
        &self.invariant
    }

    /// Insert a single value and compress
    ///
    /// This is the degenerate batch of one. It is considerably slower per
    /// value than `merge_batch` for any real stream as every call pays for a
    /// full compression pass.
    pub fn insert(&mut self, v: f64) {
        if v.is_nan() {
            return;
        }
        self.insert_sorted(&[v]);
        self.compress();
    }

    /// Sort `batch`, merge it into the summary and compress
    ///
    /// NaN values are dropped. Returns the number of tuples eliminated by the
    /// compression pass.
    pub fn merge_batch(&mut self, mut batch: Vec<f64>) -> usize {
        batch.retain(|v| !v.is_nan());
        batch.sort_unstable_by(f64::total_cmp);
        self.insert_sorted(&batch);
        self.compress()
    }

    /// Merge an ascending batch of values into the summary
    ///
    /// The caller guarantees `batch` is ascending and free of NaN, the
    /// public entry points `insert` and `merge_batch` take care of that.
    ///
    /// The batch and the summary are walked together. Each value is spliced
    /// in ahead of the first tuple not smaller than it with a g of 1 and a
    /// delta of `floor(f(r, n)) - 1`, r being the rank of everything before
    /// it. A new minimum or maximum is exact and receives a delta of 0. The
    /// count is bumped after the delta of each value has been decided.
    ///
    /// No compression is done here, see `compress`.
    pub(crate) fn insert_sorted(&mut self, batch: &[f64]) {
        debug_assert!(
            batch.windows(2).all(|w| w[0] <= w[1]),
            "batch not ascending"
        );

        let mut cursor = self.tuples.head();
        let mut r: u64 = 0;
        for &v in batch {
            while let Some(h) = cursor {
                let t = &self.tuples[h];
                if !(t.value < v) {
                    break;
                }
                r += t.g;
                cursor = self.tuples.next(h);
            }

            cursor = Some(match cursor {
                // insert in the middle
                Some(h) if r > 0 => {
                    let delta = self
                        .invariant
                        .threshold(r, self.count)
                        .saturating_sub(1);
                    self.tuples.insert_before(h, Tuple::new(v, 1, delta))
                }
                // insert at the front
                Some(h) => self.tuples.insert_before(h, Tuple::new(v, 1, 0)),
                // insert at the back
                None => self.tuples.push_back(Tuple::new(v, 1, 0)),
            });
            self.count += 1;
        }
    }

    /// Merge adjacent tuples wherever the invariant allows it
    ///
    /// A single pass over adjacent pairs (prev, cur). The pair collapses into
    /// cur when `prev.g + cur.g + cur.delta <= floor(f(r, n))`, r being the
    /// rank before prev. The first and last tuples are never collapsed away.
    /// Returns the number of tuples eliminated.
    pub fn compress(&mut self) -> usize {
        if self.tuples.len() < 4 {
            return 0;
        }

        let first = match self.tuples.head() {
            Some(h) => h,
            None => return 0,
        };
        let mut r = self.tuples[first].g;
        let mut prev = match self.tuples.next(first) {
            Some(h) => h,
            None => return 0,
        };
        let mut cur = self.tuples.next(prev);
        let mut removed = 0;

        while let Some(c) = cur {
            let nxt = self.tuples.next(c);
            // cur is the last tuple, which stays put
            if nxt.is_none() {
                break;
            }

            let prev_g = self.tuples[prev].g;
            let Tuple { g, delta, .. } = self.tuples[c];
            if prev_g + g + delta <= self.invariant.threshold(r, self.count) {
                self.tuples[c].g += prev_g;
                self.tuples.remove(prev);
                removed += 1;
                // The merged tuple inherits prev's rank, r stays.
            } else {
                r += prev_g;
            }
            prev = c;
            cur = nxt;
        }

        self.removed += removed as u64;
        removed
    }

    /// Query the summary for an ε-approximate quantile
    ///
    /// The acceptable rank window is centred on `percentile * n` with a half
    /// width of `f(percentile * n, n) / 2`. The answer is the value of the
    /// tuple just before the first tuple whose maximal rank leaves the
    /// window.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` when percentile is not within [0, 1].
    /// * `EmptyStore` when nothing has been merged.
    /// * `NotFound` when no tuple satisfies the window: the window ends ahead
    ///   of the first tuple, or past the last one. Use `min` and `max` for
    ///   the exact extremes.
    pub fn query(&self, percentile: f64) -> Result<f64> {
        if !(percentile >= 0.0 && percentile <= 1.0) {
            return Err(Error::InvalidArgument { percentile });
        }
        if self.tuples.is_empty() {
            return Err(Error::EmptyStore);
        }

        let min_rank = percentile * self.count as f64;
        let max_rank =
            (min_rank + self.invariant.bound(min_rank as u64, self.count) / 2.0) as u64;

        let mut r: u64 = 0;
        let mut prev: Option<&Tuple> = None;
        for t in self.tuples.iter() {
            if r + t.g + t.delta > max_rank {
                return prev.map(|p| p.value).ok_or(Error::NotFound);
            }
            r += t.g;
            prev = Some(t);
        }
        Err(Error::NotFound)
    }

    /// Clear every tuple and counter
    pub fn reset(&mut self) {
        self.tuples.clear();
        self.count = 0;
        self.removed = 0;
    }

    /// Total stored tuples
    ///
    /// This value will fluctuate as compression happens.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// True when no tuples are stored
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Total samples, ever
    ///
    /// This value will never decrease until reset and may or may not be
    /// equivalent to `Self::len`
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Total tuples eliminated by compression, ever
    pub fn removed(&self) -> u64 {
        self.removed
    }

    /// The exact minimum merged so far
    pub fn min(&self) -> Option<f64> {
        self.tuples.head().map(|h| self.tuples[h].value)
    }

    /// The exact maximum merged so far
    pub fn max(&self) -> Option<f64> {
        self.tuples.tail().map(|h| self.tuples[h].value)
    }

    /// Iterate the tuples in ascending order of value
    pub fn tuples(&self) -> impl Iterator<Item = &Tuple> + '_ {
        self.tuples.iter()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "total {}\nremoved {}\nstorage size {}\n",
            self.count,
            self.removed,
            self.len()
        )
    }
}
