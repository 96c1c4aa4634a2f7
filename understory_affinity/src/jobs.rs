// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! FIFO job queue shared by the context implementations.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::{Job, Unavailable};

#[derive(Default)]
struct Jobs {
    pending: VecDeque<Job>,
    closed: bool,
}

/// A closable FIFO of jobs with a wakeup for blocked consumers.
#[derive(Default)]
pub(crate) struct JobQueue {
    jobs: Mutex<Jobs>,
    ready: Condvar,
}

impl JobQueue {
    pub(crate) fn push(&self, job: Job) -> Result<(), Unavailable> {
        let mut jobs = self.jobs.lock();
        if jobs.closed {
            drop(jobs);
            return Err(Unavailable);
        }
        jobs.pending.push_back(job);
        drop(jobs);
        self.ready.notify_one();
        Ok(())
    }

    /// Takes everything queued so far without blocking.
    pub(crate) fn take_all(&self) -> VecDeque<Job> {
        core::mem::take(&mut self.jobs.lock().pending)
    }

    /// Blocks until a job is available, or returns `None` once closed.
    pub(crate) fn wait_pop(&self) -> Option<Job> {
        let mut jobs = self.jobs.lock();
        loop {
            if jobs.closed {
                return None;
            }
            if let Some(job) = jobs.pending.pop_front() {
                return Some(job);
            }
            self.ready.wait(&mut jobs);
        }
    }

    /// Stops accepting work and hands back whatever was still queued.
    ///
    /// The caller drops the returned jobs outside the lock.
    pub(crate) fn close(&self) -> VecDeque<Job> {
        let mut jobs = self.jobs.lock();
        jobs.closed = true;
        let rest = core::mem::take(&mut jobs.pending);
        drop(jobs);
        self.ready.notify_all();
        rest
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.jobs.lock().closed
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.lock().pending.len()
    }
}

impl core::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let jobs = self.jobs.lock();
        f.debug_struct("JobQueue")
            .field("pending", &jobs.pending.len())
            .field("closed", &jobs.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fifo_order() {
        let queue = JobQueue::default();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for i in 0..3 {
            let seen = Arc::clone(&seen);
            queue.push(Box::new(move || seen.lock().push(i))).unwrap();
        }
        assert_eq!(queue.len(), 3);
        for job in queue.take_all() {
            job();
        }
        assert_eq!(*seen.lock(), [0, 1, 2]);
    }

    #[test]
    fn close_refuses_and_returns_pending() {
        let queue = JobQueue::default();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        queue
            .push(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        let rest = queue.close();
        assert_eq!(rest.len(), 1);
        assert!(queue.is_closed());
        assert_eq!(queue.push(Box::new(|| {})), Err(Unavailable));
        assert!(queue.wait_pop().is_none(), "closed queue never blocks");
        drop(rest);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
