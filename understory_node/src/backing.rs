// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The toolkit object behind a node.

use core::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use understory_affinity::{AffineContext, Unavailable, run_sync};
use understory_property::{ErasedValue, Property, PropertyId};

use crate::BackingKind;

/// A toolkit object that a node configures.
///
/// Implementations wrap the real view or layer. The node only ever calls
/// these methods from its affine context, but the object itself must be
/// `Send` so a shared handle to it can travel with posted jobs.
///
/// The object must not call back into its own node from these methods.
/// Such a call is detected and panics; see [`BackingRef::with`].
///
/// Values arrive already coerced by the descriptor table. A backing object
/// may still apply its own validation. Properties it does not support are
/// ignored by [`apply`](Self::apply) and answered with `None` by
/// [`read`](Self::read), which makes the node report the table default.
pub trait Backing: Send + 'static {
    /// The kind of object this is. Selects the descriptor table.
    const KIND: BackingKind;

    /// Writes one property.
    fn apply(&mut self, property: PropertyId, value: &ErasedValue);

    /// Reads one property.
    fn read(&self, property: PropertyId) -> Option<ErasedValue>;

    /// Requests a redraw of the contents.
    fn set_needs_display(&mut self);

    /// Requests a layout pass.
    fn set_needs_layout(&mut self);
}

/// Typed helpers over [`Backing`]'s erased interface.
pub trait BackingExt: Backing {
    /// Writes a typed property.
    fn apply_typed<T: Clone + Send + Sync + 'static>(&mut self, property: Property<T>, value: T) {
        self.apply(property.id(), &ErasedValue::new(value));
    }

    /// Reads a typed property, or `None` if unsupported or of another type.
    fn read_typed<T: Clone + 'static>(&self, property: Property<T>) -> Option<T> {
        self.read(property.id())?.downcast().ok()
    }
}

impl<B: Backing> BackingExt for B {}

/// The created object, shared between the node and its [`BackingRef`]s.
///
/// Only the affine context enters it. The reentrant lock lets a nested
/// entry on that thread reach the cell, where the failed borrow reports it
/// instead of deadlocking.
pub(crate) struct Slot<B> {
    cell: ReentrantMutex<RefCell<B>>,
}

impl<B: Backing> Slot<B> {
    pub(crate) fn new(backing: B) -> Self {
        Self {
            cell: ReentrantMutex::new(RefCell::new(backing)),
        }
    }

    /// Runs `f` on the object.
    ///
    /// # Panics
    ///
    /// Panics if the object is already in use further up this thread's
    /// stack.
    pub(crate) fn enter<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let guard = self.cell.lock();
        let Ok(mut backing) = guard.try_borrow_mut() else {
            panic!(
                "{:?} backing object re-entered: its node was used from inside a call \
                 already running on the object",
                B::KIND
            );
        };
        f(&mut backing)
    }
}

/// A shared handle to a created backing object.
///
/// Cloning is cheap. The object stays bound to the node's affine context:
/// [`with`](Self::with) runs in place and insists on being called there,
/// while [`run`](Self::run) marshals from anywhere.
pub struct BackingRef<B> {
    backing: Arc<Slot<B>>,
    context: Arc<dyn AffineContext>,
}

impl<B: Backing> BackingRef<B> {
    pub(crate) fn new(backing: Arc<Slot<B>>, context: Arc<dyn AffineContext>) -> Self {
        Self { backing, context }
    }

    /// Runs `f` on the backing object from the affine context.
    ///
    /// `f` must not use the node this object belongs to, nor enter the
    /// object again.
    ///
    /// # Panics
    ///
    /// Panics when called off the affine context, and when the object is
    /// re-entered from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        assert!(
            self.context.is_current(),
            "backing object accessed off its affine context"
        );
        self.backing.enter(f)
    }

    /// Runs `f` on the backing object on the affine context and waits for
    /// the result.
    ///
    /// The same re-entry rule as [`with`](Self::with) applies to `f`.
    pub fn run<R, F>(&self, f: F) -> Result<R, Unavailable>
    where
        F: FnOnce(&mut B) -> R + Send + 'static,
        R: Send + 'static,
    {
        let backing = Arc::clone(&self.backing);
        run_sync(&*self.context, move || backing.enter(f))
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.backing, &other.backing)
    }
}

impl<B> Clone for BackingRef<B> {
    fn clone(&self) -> Self {
        Self {
            backing: Arc::clone(&self.backing),
            context: Arc::clone(&self.context),
        }
    }
}

impl<B> core::fmt::Debug for BackingRef<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackingRef")
            .field("backing", &Arc::as_ptr(&self.backing))
            .finish_non_exhaustive()
    }
}
