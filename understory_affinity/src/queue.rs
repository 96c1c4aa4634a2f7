// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A job queue drained by the thread that created it.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use tracing::{trace, warn};

use crate::jobs::JobQueue;
use crate::{AffineContext, Job, Unavailable};

/// An affine context owned by an existing thread.
///
/// Use this when the thread that owns the backing objects already runs its
/// own loop (a toolkit main loop, a test body). Jobs posted from anywhere
/// wait until the owner calls [`run_pending`](Self::run_pending).
///
/// A caller blocked in [`run_sync`](crate::run_sync) waits until the owner
/// pumps the queue or closes it, so the owner must keep doing one or the
/// other.
///
/// ```rust
/// use understory_affinity::{AffineContext, AffineQueue, post};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let queue = AffineQueue::new();
/// assert!(queue.is_current());
///
/// let flag = Arc::new(AtomicBool::new(false));
/// let remote = queue.clone();
/// let set = Arc::clone(&flag);
/// std::thread::spawn(move || post(&remote, move || set.store(true, Ordering::SeqCst)))
///     .join()
///     .unwrap()
///     .unwrap();
///
/// assert!(!flag.load(Ordering::SeqCst));
/// assert_eq!(queue.run_pending(), 1);
/// assert!(flag.load(Ordering::SeqCst));
/// ```
#[derive(Clone)]
pub struct AffineQueue {
    queue: Arc<JobQueue>,
    owner: ThreadId,
}

impl AffineQueue {
    /// Creates a queue owned by the calling thread.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: Arc::new(JobQueue::default()),
            owner: thread::current().id(),
        }
    }

    /// Runs queued jobs until the queue is empty, including jobs posted by
    /// the jobs themselves, and returns how many ran.
    ///
    /// # Panics
    ///
    /// Panics when called from a thread other than the owner.
    pub fn run_pending(&self) -> usize {
        assert!(
            self.is_current(),
            "AffineQueue::run_pending called off its owning thread"
        );
        let mut ran = 0;
        loop {
            let batch = self.queue.take_all();
            if batch.is_empty() {
                break;
            }
            for job in batch {
                job();
                ran += 1;
            }
        }
        if ran > 0 {
            trace!(ran, "affine queue drained");
        }
        ran
    }

    /// Returns the number of jobs waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Stops accepting work and drops queued jobs without running them.
    pub fn close(&self) {
        let dropped = self.queue.close();
        if !dropped.is_empty() {
            warn!(dropped = dropped.len(), "affine queue closed with queued jobs");
        }
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

impl Default for AffineQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AffineContext for AffineQueue {
    fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    fn post(&self, job: Job) -> Result<(), Unavailable> {
        self.queue.push(job)
    }
}

impl core::fmt::Debug for AffineQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AffineQueue")
            .field("owner", &self.owner)
            .field("queue", &self.queue)
            .finish()
    }
}
