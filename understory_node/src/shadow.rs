// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node state accumulated before the backing object exists.
//!
//! A [`ShadowState`] is one lock around a sequenced [`PropertyStore`] and
//! the pending signals. Sealing it hands everything to the flush and
//! installs the live handle; from then on every call answers with that
//! handle instead of touching the store.
//!
//! Sequences are allocated under the same lock that records the write and
//! that seals the shadow. Sequence order is therefore the order in which
//! writes land, and every write answered with the live handle was issued
//! after every write the flush applied.

use core::cell::RefCell;

use parking_lot::ReentrantMutex;
use tracing::trace;
use understory_property::{
    ErasedValue, PendingEntry, PropertyId, PropertyRegistry, PropertyStore, Sequence,
};

use crate::NodeId;
use crate::types::Signals;

pub(crate) struct ShadowState<L> {
    inner: ReentrantMutex<RefCell<ShadowInner<L>>>,
}

struct ShadowInner<L> {
    store: PropertyStore<NodeId>,
    signals: Signals,
    live: Option<L>,
    last_sequence: u64,
}

/// Result of reading through the shadow.
pub(crate) enum ShadowRead<L> {
    /// A value written before creation.
    Pending(ErasedValue),
    /// Nothing written; the default applies.
    Unset,
    /// Sealed; ask the backing object.
    Live(L),
}

impl<L: Clone> ShadowState<L> {
    pub(crate) fn new(owner: NodeId) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(ShadowInner {
                store: PropertyStore::new(owner),
                signals: Signals::empty(),
                live: None,
                last_sequence: 0,
            })),
        }
    }

    /// Runs `f` under the lock.
    ///
    /// # Panics
    ///
    /// Panics when re-entered from inside a flush, that is when a backing
    /// object being created calls back into its node.
    fn enter<R>(&self, f: impl FnOnce(&mut ShadowInner<L>) -> R) -> R {
        let guard = self.inner.lock();
        let Ok(mut inner) = guard.try_borrow_mut() else {
            panic!("node used from inside the flush of its own backing object");
        };
        f(&mut inner)
    }

    /// Records a write under the next sequence and returns that sequence.
    ///
    /// Once sealed, returns the live handle and the value instead.
    pub(crate) fn write(
        &self,
        id: PropertyId,
        value: ErasedValue,
    ) -> Result<Sequence, (L, ErasedValue)> {
        self.enter(|inner| {
            if let Some(live) = &inner.live {
                return Err((live.clone(), value));
            }
            inner.last_sequence += 1;
            let sequence = Sequence::new(inner.last_sequence);
            let accepted = inner.store.set_erased(id, value, sequence);
            debug_assert!(accepted, "shadow sequences are allocated in order");
            trace!(node = %inner.store.owner(), property = %id, %sequence, "shadow write");
            Ok(sequence)
        })
    }

    pub(crate) fn read(&self, id: PropertyId) -> ShadowRead<L> {
        self.enter(|inner| {
            if let Some(live) = &inner.live {
                return ShadowRead::Live(live.clone());
            }
            match inner.store.get_erased(id) {
                Some(value) => ShadowRead::Pending(value.clone()),
                None => ShadowRead::Unset,
            }
        })
    }

    /// Records a signal, or returns the live handle once sealed.
    pub(crate) fn signal(&self, signals: Signals) -> Result<(), L> {
        self.enter(|inner| match &inner.live {
            Some(live) => Err(live.clone()),
            None => {
                inner.signals |= signals;
                Ok(())
            }
        })
    }

    /// Hands the shadow to `flush` and installs the handle it returns.
    ///
    /// The lock is held throughout, so no write can land between the flush
    /// and the seal, and a call from inside `flush` back into this shadow
    /// panics. `flush` receives copies: if it unwinds, the pending writes
    /// and signals are still here for the next attempt.
    pub(crate) fn seal(
        &self,
        registry: &PropertyRegistry,
        flush: impl FnOnce(Vec<PendingEntry>, Signals) -> L,
    ) -> L {
        self.enter(|inner| {
            debug_assert!(inner.live.is_none(), "shadow sealed twice");
            let pending = inner.store.clone().drain_sorted(registry);
            let live = flush(pending, inner.signals);
            inner.store = PropertyStore::new(inner.store.owner());
            inner.signals = Signals::empty();
            inner.live = Some(live.clone());
            live
        })
    }

    pub(crate) fn is_sealed(&self) -> bool {
        self.enter(|inner| inner.live.is_some())
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.enter(|inner| inner.store.len())
    }
}

impl<L> core::fmt::Debug for ShadowState<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let guard = self.inner.lock();
        let Ok(inner) = guard.try_borrow() else {
            return f.write_str("ShadowState { <flushing> }");
        };
        f.debug_struct("ShadowState")
            .field("pending", &inner.store.len())
            .field("signals", &inner.signals)
            .field("sealed", &inner.live.is_some())
            .field("last_sequence", &inner.last_sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackingKind, props};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;

    fn shadow() -> ShadowState<Arc<&'static str>> {
        ShadowState::new(NodeId::next())
    }

    #[test]
    fn sequences_follow_landing_order() {
        let shadow = shadow();
        let a = shadow.write(props::id::ALPHA, ErasedValue::new(0.2_f64)).ok();
        let b = shadow.write(props::id::ALPHA, ErasedValue::new(0.9_f64)).ok();
        assert_eq!(a, Some(Sequence::new(1)));
        assert_eq!(b, Some(Sequence::new(2)));
        match shadow.read(props::id::ALPHA) {
            ShadowRead::Pending(value) => assert_eq!(value.downcast_ref::<f64>(), Some(&0.9)),
            _ => panic!("expected a pending value"),
        }
        assert!(matches!(shadow.read(props::id::HIDDEN), ShadowRead::Unset));
    }

    #[test]
    fn seal_drains_in_flush_order_and_redirects() {
        let shadow = shadow();
        let registry = BackingKind::View.properties();
        for id in [props::id::FRAME, props::id::ALPHA, props::id::ANCHOR_POINT] {
            let value = registry.default_erased(id).unwrap();
            assert!(shadow.write(id, value).is_ok());
        }
        shadow.signal(Signals::NEEDS_LAYOUT).unwrap();
        assert_eq!(shadow.pending_len(), 3);

        let live = shadow.seal(registry, |pending, signals| {
            let ids: Vec<_> = pending.iter().map(|e| e.id).collect();
            assert_eq!(ids, [props::id::ALPHA, props::id::ANCHOR_POINT, props::id::FRAME]);
            assert_eq!(signals, Signals::NEEDS_LAYOUT);
            Arc::new("live")
        });

        assert!(shadow.is_sealed());
        assert_eq!(shadow.pending_len(), 0);
        assert!(matches!(shadow.read(props::id::ALPHA), ShadowRead::Live(l) if Arc::ptr_eq(&l, &live)));
        let (handle, value) = shadow
            .write(props::id::HIDDEN, ErasedValue::new(true))
            .unwrap_err();
        assert!(Arc::ptr_eq(&handle, &live));
        assert_eq!(value.downcast_ref::<bool>(), Some(&true));
        assert!(shadow.signal(Signals::NEEDS_DISPLAY).is_err());
    }

    #[test]
    fn unwinding_flush_keeps_the_shadow() {
        let shadow = shadow();
        let registry = BackingKind::Layer.properties();
        assert!(shadow.write(props::id::ALPHA, ErasedValue::new(0.3_f64)).is_ok());
        shadow.signal(Signals::NEEDS_DISPLAY).unwrap();

        let unwound = catch_unwind(AssertUnwindSafe(|| {
            shadow.seal(registry, |_, _| -> Arc<&'static str> { panic!("apply failed") })
        }));
        assert!(unwound.is_err());
        assert!(!shadow.is_sealed());
        assert_eq!(shadow.pending_len(), 1);

        shadow.seal(registry, |pending, signals| {
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].value.downcast_ref::<f64>(), Some(&0.3));
            assert_eq!(signals, Signals::NEEDS_DISPLAY);
            Arc::new("live")
        });
        assert_eq!(shadow.pending_len(), 0);
    }
}
