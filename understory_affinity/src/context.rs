// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`AffineContext`] trait and the calls built on it.

use std::sync::mpsc;

/// A unit of work handed to an affine context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// The affine context no longer accepts work, or dropped a job before
/// running it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("affine context is unavailable")]
pub struct Unavailable;

/// A serial execution context that owns thread-affine objects.
///
/// Objects bound to a context may only be touched by code running on it.
/// Other threads reach them by posting jobs, which the context runs one at a
/// time in the order they were posted.
///
/// A context that stops accepting work must drop every job it did not run.
/// [`run_sync`] relies on that to wake its caller instead of blocking
/// forever.
pub trait AffineContext: Send + Sync + 'static {
    /// Returns `true` if the calling code is running on this context.
    fn is_current(&self) -> bool;

    /// Queues `job` to run on this context.
    ///
    /// Returns [`Unavailable`] if the context has shut down; `job` is dropped
    /// without running in that case.
    fn post(&self, job: Job) -> Result<(), Unavailable>;
}

/// Runs `f` on `context` and waits for its result.
///
/// When called from the context itself, `f` runs inline. Otherwise the
/// caller blocks until the context has run the job. If the context shuts
/// down first, or drops the job unrun, the caller gets [`Unavailable`].
///
/// ```rust
/// use understory_affinity::{AffineThread, run_sync};
///
/// let thread = AffineThread::spawn("ui").unwrap();
/// let on_thread = run_sync(&thread, || std::thread::current().name().map(String::from));
/// assert_eq!(on_thread.unwrap().as_deref(), Some("ui"));
/// ```
pub fn run_sync<C, F, R>(context: &C, f: F) -> Result<R, Unavailable>
where
    C: AffineContext + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if context.is_current() {
        return Ok(f());
    }
    let (sender, receiver) = mpsc::sync_channel(1);
    context.post(Box::new(move || {
        // The waiter only goes away after a result or a drop.
        let _ = sender.send(f());
    }))?;
    receiver.recv().map_err(|_| Unavailable)
}

/// Queues `f` on `context` without waiting for it.
///
/// Unlike [`run_sync`], this never runs `f` inline, even on the context
/// itself, so the job always observes state after the caller returns.
pub fn post<C, F>(context: &C, f: F) -> Result<(), Unavailable>
where
    C: AffineContext + ?Sized,
    F: FnOnce() + Send + 'static,
{
    context.post(Box::new(f))
}
