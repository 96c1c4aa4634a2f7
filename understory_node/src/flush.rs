// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Applying shadow state to a freshly created backing object.

use understory_property::{ErasedValue, PendingEntry, PropertyId, PropertyRegistry};

use crate::Backing;
use crate::dispatch::deliver;
use crate::types::Signals;

/// Applies `pending` and the always-flushed defaults to `backing` in flush
/// order, then delivers `signals`. Returns the number of properties written.
///
/// Pending values win over always-flushed defaults for the same property.
pub(crate) fn flush<B: Backing>(
    backing: &mut B,
    registry: &PropertyRegistry,
    pending: Vec<PendingEntry>,
    signals: Signals,
) -> usize {
    let mut writes: Vec<(PropertyId, ErasedValue)> =
        pending.into_iter().map(|entry| (entry.id, entry.value)).collect();
    for id in registry.always_flushed() {
        if writes.iter().any(|(written, _)| *written == id) {
            continue;
        }
        if let Some(default) = registry.default_erased(id) {
            writes.push((id, default));
        }
    }
    writes.sort_by_key(|(id, _)| registry.flush_key(*id));

    for (id, value) in &writes {
        backing.apply(*id, value);
    }
    deliver(backing, signals);
    writes.len()
}
