// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A dedicated serial executor thread.

use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::jobs::JobQueue;
use crate::{AffineContext, Job, Unavailable};

/// A thread that runs posted jobs one at a time.
///
/// This stands in for a toolkit's main thread where there is none, such as
/// headless node trees and tests. Dropping the last [`AffineThread`] shuts
/// the thread down; [`AffineHandle`]s outlive it and report
/// [`Unavailable`] afterwards.
///
/// ```rust
/// use understory_affinity::{AffineContext, AffineThread, run_sync};
///
/// let thread = AffineThread::spawn("render").unwrap();
/// let handle = thread.handle();
/// assert!(!handle.is_current());
/// assert_eq!(run_sync(&handle, || 2 + 2), Ok(4));
///
/// thread.shutdown();
/// assert!(run_sync(&handle, || 0).is_err());
/// ```
pub struct AffineThread {
    handle: AffineHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

/// A cloneable reference to an [`AffineThread`]'s queue.
#[derive(Clone)]
pub struct AffineHandle {
    queue: Arc<JobQueue>,
    thread: ThreadId,
    name: Arc<str>,
}

impl AffineThread {
    /// Starts a thread named `name`.
    pub fn spawn(name: &str) -> io::Result<Self> {
        let queue = Arc::new(JobQueue::default());
        let worker_queue = Arc::clone(&queue);
        let join = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || run_worker(&worker_queue))?;
        debug!(thread = name, "affine thread started");
        Ok(Self {
            handle: AffineHandle {
                queue,
                thread: join.thread().id(),
                name: Arc::from(name),
            },
            join: Mutex::new(Some(join)),
        })
    }

    /// Returns a handle that posts to this thread.
    #[must_use]
    pub fn handle(&self) -> AffineHandle {
        self.handle.clone()
    }

    /// Stops the thread.
    ///
    /// Jobs still queued are dropped without running, which wakes any
    /// caller blocked on them with [`Unavailable`]. The job currently
    /// running, if any, completes. When called from another thread this
    /// waits for the worker to exit.
    pub fn shutdown(&self) {
        let dropped = self.handle.queue.close();
        if !dropped.is_empty() {
            warn!(
                thread = &*self.handle.name,
                dropped = dropped.len(),
                "affine thread shut down with queued jobs"
            );
        }
        drop(dropped);

        let join = self.join.lock().take();
        if let Some(join) = join {
            if self.handle.is_current() {
                // The worker exits after this job; it cannot join itself.
                return;
            }
            if join.join().is_err() {
                error!(thread = &*self.handle.name, "affine thread panicked");
            }
            debug!(thread = &*self.handle.name, "affine thread stopped");
        }
    }
}

fn run_worker(queue: &JobQueue) {
    while let Some(job) = queue.wait_pop() {
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("job panicked on affine thread");
        }
    }
}

impl AffineContext for AffineHandle {
    fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }

    fn post(&self, job: Job) -> Result<(), Unavailable> {
        trace!(thread = &*self.name, "post");
        self.queue.push(job)
    }
}

impl AffineContext for AffineThread {
    fn is_current(&self) -> bool {
        self.handle.is_current()
    }

    fn post(&self, job: Job) -> Result<(), Unavailable> {
        self.handle.post(job)
    }
}

impl Drop for AffineThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl core::fmt::Debug for AffineThread {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AffineThread")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl core::fmt::Debug for AffineHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AffineHandle")
            .field("name", &self.name)
            .field("thread", &self.thread)
            .field("queue", &self.queue)
            .finish()
    }
}
