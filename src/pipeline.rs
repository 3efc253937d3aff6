//! Buffered ingestion in front of a shared `Summary`.
//!
//! Values accumulate in a bounded buffer owned by the single producer. A full
//! buffer is detached, swapped for a fresh one and sent down a channel to one
//! merge worker, which sorts the batch, merges it into the summary and
//! compresses, all under the summary lock. The producer never waits on that
//! lock. Because there is only one worker at most one merge is in progress at
//! any time. The channel holds at most `QUEUE_DEPTH` further batches, a
//! producer outrunning the worker blocks on the channel until there is room,
//! so no more than `(QUEUE_DEPTH + 2) * capacity` values are held in memory
//! outside the summary.
//!
//! Every batch sent is counted as pending until the worker has finished with
//! it, which is what `wait` blocks on.
use std::mem;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, debug_span, dispatcher, error, trace, Dispatch};

use crate::summary::Summary;

/// Batches waiting in the channel behind the one being merged
const QUEUE_DEPTH: usize = 1;

#[derive(Debug)]
struct Shared {
    summary: Mutex<Summary>,
    pending: Mutex<usize>,
    idle: Condvar,
}

impl Shared {
    fn finish(&self) {
        let mut pending = self.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            self.idle.notify_all();
        }
    }
}

// Retires one pending batch when dropped, unwinding included, so that a
// panicking merge can never leave `wait` blocked.
struct Completion<'a>(&'a Shared);

impl<'a> Drop for Completion<'a> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

fn merge_loop(shared: Arc<Shared>, rx: Receiver<Vec<f64>>) {
    for batch in rx {
        let _done = Completion(&shared);
        let span = debug_span!("merge", batch = batch.len());
        let _enter = span.enter();

        let start = Instant::now();
        let mut summary = shared.summary.lock();
        let removed = summary.merge_batch(batch);
        debug!(
            elapsed = ?start.elapsed(),
            removed,
            size = summary.len(),
            count = summary.count(),
            "batch merged"
        );
    }
    trace!("merge worker exiting");
}

#[derive(Debug)]
pub(crate) struct Pipeline {
    buffer: Vec<f64>,
    capacity: usize,
    shared: Arc<Shared>,
    tx: Option<SyncSender<Vec<f64>>>,
    worker: Option<JoinHandle<()>>,
    dispatch: Dispatch,
}

impl Pipeline {
    pub fn new(summary: Summary, capacity: usize, dispatch: Dispatch) -> Pipeline {
        assert!(capacity != 0);
        let shared = Arc::new(Shared {
            summary: Mutex::new(summary),
            pending: Mutex::new(0),
            idle: Condvar::new(),
        });
        let (tx, rx) = mpsc::sync_channel(QUEUE_DEPTH);

        let worker_shared = Arc::clone(&shared);
        let worker_dispatch = dispatch.clone();
        let worker = thread::spawn(move || {
            dispatcher::with_default(&worker_dispatch, || merge_loop(worker_shared, rx))
        });

        Pipeline {
            buffer: Vec::with_capacity(capacity),
            capacity,
            shared,
            tx: Some(tx),
            worker: Some(worker),
            dispatch,
        }
    }

    pub fn insert(&mut self, v: f64) {
        if v.is_nan() {
            return;
        }
        self.buffer.push(v);
        if self.buffer.len() >= self.capacity {
            self.handoff();
        }
    }

    /// Hand whatever is buffered to the worker without waiting for it
    pub fn flush(&mut self) {
        let buffered = self.buffer.len();
        self.handoff();
        dispatcher::with_default(&self.dispatch, || debug!(buffered, "flushed"));
    }

    /// Block until every batch handed off so far is merged and compressed
    pub fn wait(&self) {
        let mut pending = self.shared.pending.lock();
        while *pending > 0 {
            self.shared.idle.wait(&mut pending);
        }
    }

    /// Drop buffered values and clear the summary
    ///
    /// Batches already handed off are merged first, then discarded.
    pub fn reset(&mut self) {
        self.wait();
        self.buffer.clear();
        self.shared.summary.lock().reset();
        dispatcher::with_default(&self.dispatch, || debug!("reset"));
    }

    pub fn summary(&self) -> MutexGuard<Summary> {
        self.shared.summary.lock()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    fn handoff(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let batch = mem::replace(&mut self.buffer, Vec::with_capacity(self.capacity));
        let len = batch.len();

        *self.shared.pending.lock() += 1;
        let sent = match self.tx {
            Some(ref tx) => tx.send(batch).is_ok(),
            None => false,
        };
        if !sent {
            self.shared.finish();
            dispatcher::with_default(&self.dispatch, || {
                error!(batch = len, "merge worker is gone, batch dropped")
            });
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what it has and exit.
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                dispatcher::with_default(&self.dispatch, || error!("merge worker panicked"));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::invariant::Invariant;

    fn pipeline(capacity: usize) -> Pipeline {
        let summary = Summary::new(Invariant::biased(0.01).unwrap());
        Pipeline::new(summary, capacity, Dispatch::none())
    }

    #[test]
    fn full_buffer_is_handed_off() {
        let mut p = pipeline(10);
        for i in 0..25 {
            p.insert(f64::from(i));
        }
        assert_eq!(5, p.buffered());
        p.wait();
        assert_eq!(20, p.summary().count());

        p.flush();
        assert_eq!(0, p.buffered());
        p.wait();
        assert_eq!(25, p.summary().count());
    }

    #[test]
    fn flush_of_empty_buffer_is_a_no_op() {
        let mut p = pipeline(10);
        p.flush();
        p.wait();
        assert!(p.summary().is_empty());
    }

    #[test]
    fn nan_is_not_buffered() {
        let mut p = pipeline(10);
        p.insert(::std::f64::NAN);
        assert_eq!(0, p.buffered());
    }

    #[test]
    fn reset_after_pending_batches() {
        let mut p = pipeline(3);
        for i in 0..1_000 {
            p.insert(f64::from(i));
        }
        p.reset();
        assert_eq!(0, p.buffered());
        assert_eq!(0, p.summary().count());

        // the worker survives a reset
        for i in 0..3 {
            p.insert(f64::from(i));
        }
        p.wait();
        assert_eq!(3, p.summary().count());
    }

    #[test]
    fn pending_batches_are_bounded() {
        let summary = Summary::new(Invariant::biased(0.001).unwrap());
        let mut p = Pipeline::new(summary, 500, Dispatch::none());
        let shared = Arc::clone(&p.shared);

        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut max_pending = 0;
        for _ in 0..2_000_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            p.insert((seed % 1_000_000) as f64);
            max_pending = max_pending.max(*shared.pending.lock());
        }
        p.flush();
        p.wait();

        // one batch in the merge, the rest queued in the channel
        assert!(max_pending <= QUEUE_DEPTH + 1, "max pending: {}", max_pending);
        assert_eq!(2_000_000, p.summary().count());
    }

    #[test]
    fn drop_merges_outstanding_batches() {
        let summary = Summary::new(Invariant::biased(0.01).unwrap());
        let mut p = Pipeline::new(summary, 4, Dispatch::none());
        let shared = Arc::clone(&p.shared);
        for i in 0..400 {
            p.insert(f64::from(i));
        }
        drop(p);
        assert_eq!(400, shared.summary.lock().count());
        assert_eq!(0, *shared.pending.lock());
    }
}
