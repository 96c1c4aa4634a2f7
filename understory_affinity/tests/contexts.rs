// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_affinity` crate.
//!
//! These drive both context kinds from many threads at once and check that
//! jobs stay serial and that shutdown never strands a caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use understory_affinity::{AffineContext, AffineQueue, AffineThread, Unavailable, post, run_sync};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn many_callers_share_one_serial_thread() {
    init_tracing();
    let thread = AffineThread::spawn("serial").unwrap();
    let handle = thread.handle();
    let counter = Arc::new(parking_lot::Mutex::new(0_usize));
    let in_job = Arc::new(AtomicUsize::new(0));

    let callers: Vec<_> = (0..16)
        .map(|_| {
            let handle = handle.clone();
            let counter = Arc::clone(&counter);
            let in_job = Arc::clone(&in_job);
            thread::spawn(move || {
                for _ in 0..50 {
                    let counter = Arc::clone(&counter);
                    let in_job = Arc::clone(&in_job);
                    run_sync(&handle, move || {
                        assert_eq!(in_job.fetch_add(1, Ordering::SeqCst), 0);
                        *counter.lock() += 1;
                        in_job.fetch_sub(1, Ordering::SeqCst);
                    })
                    .unwrap();
                }
            })
        })
        .collect();
    for caller in callers {
        caller.join().unwrap();
    }
    assert_eq!(*counter.lock(), 16 * 50);
}

#[test]
fn posts_from_one_thread_keep_their_order() {
    init_tracing();
    let queue = AffineQueue::new();
    let remote = queue.clone();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    thread::spawn(move || {
        for i in 0..100 {
            let sink = Arc::clone(&sink);
            post(&remote, move || sink.lock().push(i)).unwrap();
        }
    })
    .join()
    .unwrap();

    assert_eq!(queue.run_pending(), 100);
    assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
}

#[test]
fn dropping_the_thread_fails_later_calls() {
    init_tracing();
    let thread = AffineThread::spawn("gone").unwrap();
    let handle = thread.handle();
    assert!(!handle.is_current());
    drop(thread);
    assert_eq!(run_sync(&handle, || ()), Err(Unavailable));
    assert_eq!(post(&handle, || ()), Err(Unavailable));
}

#[test]
fn contexts_work_as_trait_objects() {
    init_tracing();
    let thread = AffineThread::spawn("dyn").unwrap();
    let contexts: Vec<Arc<dyn AffineContext>> =
        vec![Arc::new(thread.handle()), Arc::new(AffineQueue::new())];
    // The queue is owned by this thread, so the call runs inline.
    for context in &contexts {
        assert_eq!(run_sync(&**context, || 9), Ok(9));
    }
}
