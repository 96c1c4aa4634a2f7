// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exactly-once creation with retry on failure.

use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

/// Where a node is in its creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// No backing object; writes go to the shadow store.
    Uninitialized,
    /// A caller is running the factory and flush.
    Creating,
    /// The backing object exists. Terminal.
    Created,
}

enum GateState<T> {
    Uninitialized,
    Creating(ThreadId),
    Created(T),
}

/// Why [`CreationGate::ensure`] returned without a value.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GateError<E> {
    /// `make` failed; the gate is back to uninitialized.
    Failed(E),
    /// `make` tried to enter the gate it is running under.
    Reentrant,
}

/// Runs a constructor exactly once across all callers.
///
/// The lock is only held to decide who creates. The winner runs `make`
/// unlocked while the state is `Creating`; everyone else parks on a
/// condition variable until it settles.
pub(crate) struct CreationGate<T> {
    state: Mutex<GateState<T>>,
    settled: Condvar,
}

impl<T: Clone> CreationGate<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Uninitialized),
            settled: Condvar::new(),
        }
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        match &*self.state.lock() {
            GateState::Uninitialized => Lifecycle::Uninitialized,
            GateState::Creating(_) => Lifecycle::Creating,
            GateState::Created(_) => Lifecycle::Created,
        }
    }

    /// Returns the created value without waiting.
    pub(crate) fn get(&self) -> Option<T> {
        match &*self.state.lock() {
            GateState::Created(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns the created value, running `make` if nobody has yet.
    ///
    /// A failed or panicking `make` returns the gate to `Uninitialized` and
    /// wakes the waiters, one of which then takes its own turn.
    pub(crate) fn ensure<E>(&self, make: impl FnOnce() -> Result<T, E>) -> Result<T, GateError<E>> {
        let current = thread::current().id();
        let mut state = self.state.lock();
        loop {
            let vacant = match &*state {
                GateState::Created(value) => return Ok(value.clone()),
                GateState::Creating(owner) if *owner == current => {
                    return Err(GateError::Reentrant);
                }
                GateState::Creating(_) => false,
                GateState::Uninitialized => true,
            };
            if vacant {
                break;
            }
            self.settled.wait(&mut state);
        }
        *state = GateState::Creating(current);
        drop(state);

        let mut revert = RevertOnUnwind { gate: self, armed: true };
        let result = make();
        revert.armed = false;

        let mut state = self.state.lock();
        let outcome = match result {
            Ok(value) => {
                *state = GateState::Created(value.clone());
                Ok(value)
            }
            Err(error) => {
                *state = GateState::Uninitialized;
                Err(GateError::Failed(error))
            }
        };
        drop(state);
        self.settled.notify_all();
        outcome
    }
}

struct RevertOnUnwind<'a, T> {
    gate: &'a CreationGate<T>,
    armed: bool,
}

impl<T> Drop for RevertOnUnwind<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *self.gate.state.lock() = GateState::Uninitialized;
            self.gate.settled.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    #[test]
    fn creates_once() {
        let gate = CreationGate::new();
        assert_eq!(gate.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(gate.ensure(|| Ok::<_, ()>(1)), Ok(1));
        assert_eq!(gate.ensure(|| Ok::<_, ()>(2)), Ok(1));
        assert_eq!(gate.get(), Some(1));
        assert_eq!(gate.lifecycle(), Lifecycle::Created);
    }

    #[test]
    fn failure_allows_retry() {
        let gate = CreationGate::new();
        assert_eq!(gate.ensure(|| Err::<u8, _>("nope")), Err(GateError::Failed("nope")));
        assert_eq!(gate.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(gate.get(), None);
        assert_eq!(gate.ensure(|| Ok::<_, &str>(3)), Ok(3));
    }

    #[test]
    fn reentry_is_reported() {
        let gate = CreationGate::new();
        let result = gate.ensure(|| match gate.ensure(|| Ok::<_, ()>(0)) {
            Err(GateError::Reentrant) => Err(()),
            other => panic!("unexpected {other:?}"),
        });
        assert_eq!(result, Err(GateError::Failed(())));
        assert_eq!(gate.lifecycle(), Lifecycle::Uninitialized);
    }

    #[test]
    fn panic_reverts() {
        let gate = Arc::new(CreationGate::new());
        let inner = Arc::clone(&gate);
        let joined = thread::spawn(move || {
            let _ = inner.ensure(|| -> Result<u8, ()> { panic!("factory exploded") });
        })
        .join();
        assert!(joined.is_err());
        assert_eq!(gate.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(gate.ensure(|| Ok::<_, ()>(4)), Ok(4));
    }

    #[test]
    fn hundred_racers_one_creation() {
        const RACERS: usize = 100;
        let gate = Arc::new(CreationGate::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let start = Arc::new(Barrier::new(RACERS));

        let racers: Vec<_> = (0..RACERS)
            .map(|i| {
                let gate = Arc::clone(&gate);
                let calls = Arc::clone(&calls);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    gate.ensure(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::yield_now();
                        Ok::<_, ()>(Arc::new(i))
                    })
                    .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<usize>> = racers.into_iter().map(|r| r.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    }
}
