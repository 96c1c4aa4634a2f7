// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Post-creation routing of reads, writes and signals.

use std::sync::Arc;

use tracing::trace;
use understory_affinity::{AffineContext, Unavailable, post, run_sync};
use understory_property::{ErasedValue, PropertyId};

use crate::backing::Slot;
use crate::types::Signals;
use crate::{Backing, NodeId, WritePolicy};

/// Routes traffic for a created node onto its affine context.
///
/// On the context every call goes straight to the backing object. Off it,
/// reads and [`WritePolicy::Blocking`] writes wait for a marshaled call,
/// while [`WritePolicy::Deferred`] writes and signals are posted.
pub(crate) struct Dispatcher {
    node: NodeId,
    context: Arc<dyn AffineContext>,
    policy: WritePolicy,
}

impl Dispatcher {
    pub(crate) fn new(node: NodeId, context: Arc<dyn AffineContext>, policy: WritePolicy) -> Self {
        Self {
            node,
            context,
            policy,
        }
    }

    pub(crate) fn context(&self) -> &Arc<dyn AffineContext> {
        &self.context
    }

    pub(crate) fn write<B: Backing>(
        &self,
        backing: &Arc<Slot<B>>,
        id: PropertyId,
        value: ErasedValue,
    ) -> Result<(), Unavailable> {
        if self.context.is_current() {
            trace!(node = %self.node, property = %id, "direct write");
            backing.enter(|backing| backing.apply(id, &value));
            return Ok(());
        }
        let backing = Arc::clone(backing);
        let job = move || backing.enter(|backing| backing.apply(id, &value));
        match self.policy {
            WritePolicy::Blocking => {
                trace!(node = %self.node, property = %id, "marshaled write");
                run_sync(&*self.context, job)
            }
            WritePolicy::Deferred => {
                trace!(node = %self.node, property = %id, "deferred write");
                post(&*self.context, job)
            }
        }
    }

    pub(crate) fn read<B: Backing>(
        &self,
        backing: &Arc<Slot<B>>,
        id: PropertyId,
    ) -> Result<Option<ErasedValue>, Unavailable> {
        if self.context.is_current() {
            return Ok(backing.enter(|backing| backing.read(id)));
        }
        trace!(node = %self.node, property = %id, "marshaled read");
        let backing = Arc::clone(backing);
        run_sync(&*self.context, move || backing.enter(|backing| backing.read(id)))
    }

    pub(crate) fn signal<B: Backing>(
        &self,
        backing: &Arc<Slot<B>>,
        signals: Signals,
    ) -> Result<(), Unavailable> {
        if self.context.is_current() {
            backing.enter(|backing| deliver(backing, signals));
            return Ok(());
        }
        trace!(node = %self.node, ?signals, "posted signal");
        let backing = Arc::clone(backing);
        post(&*self.context, move || backing.enter(|backing| deliver(backing, signals)))
    }
}

pub(crate) fn deliver<B: Backing>(backing: &mut B, signals: Signals) {
    if signals.contains(Signals::NEEDS_DISPLAY) {
        backing.set_needs_display();
    }
    if signals.contains(Signals::NEEDS_LAYOUT) {
        backing.set_needs_layout();
    }
}

impl core::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("node", &self.node)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
