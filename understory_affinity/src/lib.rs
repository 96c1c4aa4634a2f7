// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Affinity: thread-affine execution contexts.
//!
//! UI toolkits only allow their objects to be touched from one thread.
//! This crate names that thread as an [`AffineContext`] and gives other
//! threads two ways to reach it:
//!
//! - [`run_sync`]: run a closure there and wait for the result (inline when
//!   already on the context).
//! - [`post`]: queue a closure and return immediately.
//!
//! Two contexts are provided:
//!
//! - [`AffineThread`]: a dedicated thread that runs posted jobs in order.
//! - [`AffineQueue`]: a queue owned by an existing thread, drained whenever
//!   that thread calls [`AffineQueue::run_pending`].
//!
//! Toolkit integrations implement [`AffineContext`] over their own main
//! queue.
//!
//! ## Shutdown
//!
//! A context that shuts down drops its queued jobs unrun. Every blocked
//! [`run_sync`] caller is woken with [`Unavailable`] rather than left
//! waiting.
//!
//! ```rust
//! use understory_affinity::{AffineThread, Unavailable, run_sync};
//!
//! let thread = AffineThread::spawn("main").unwrap();
//! let handle = thread.handle();
//! assert_eq!(run_sync(&handle, || 1 + 1), Ok(2));
//!
//! drop(thread);
//! assert_eq!(run_sync(&handle, || 1 + 1), Err(Unavailable));
//! ```

mod context;
mod jobs;
mod queue;
mod thread;

pub use context::{AffineContext, Job, Unavailable, post, run_sync};
pub use queue::AffineQueue;
pub use thread::{AffineHandle, AffineThread};
