// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object sparse storage of pending property values.
//!
//! [`PropertyStore`] keeps only the properties that were explicitly written.
//! Every entry carries the [`Sequence`] of the write that produced it, and a
//! write that arrives with an older sequence than the stored one is dropped,
//! so racing writers converge on the newest write no matter which of them
//! reaches the store last.
//!
//! # Implementation
//!
//! Following the `WinUI` approach, entries live in a vector sorted by
//! [`PropertyId`] and are found by binary search:
//!
//! - contiguous memory, no hash buckets
//! - O(log n) lookup, fast for typical counts (5-20)
//! - inline storage for small sets via `SmallVec`

use alloc::vec::Vec;
use core::fmt;
use smallvec::SmallVec;

use crate::id::{Property, PropertyId};
use crate::registry::PropertyRegistry;
use crate::value::ErasedValue;

/// Most nodes are configured with fewer than 8 explicit properties before
/// they are materialized.
const INLINE_CAPACITY: usize = 8;

/// Position of a write in an object's write history.
///
/// Sequences are handed out by a monotonic counter owned by whoever owns the
/// store; higher means newer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sequence(u64);

impl Sequence {
    /// The sequence before any write.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw counter value.
    #[must_use]
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq {}", self.0)
    }
}

/// One pending value taken out of a store.
#[derive(Clone, Debug)]
pub struct PendingEntry {
    /// The property written.
    pub id: PropertyId,
    /// Sequence of the winning write.
    pub sequence: Sequence,
    /// The value written.
    pub value: ErasedValue,
}

/// Sparse, sequence-aware storage for explicitly written property values.
///
/// ```rust
/// use understory_property::{PropertyMetadata, PropertyRegistry, PropertyStore, Sequence};
///
/// let mut registry = PropertyRegistry::new();
/// let alpha = registry.register("alpha", PropertyMetadata::new(1.0_f64));
///
/// let mut store = PropertyStore::new(7_u64);
/// assert_eq!(store.get_effective(alpha, &registry), 1.0);
///
/// assert!(store.set(alpha, 0.5, Sequence::new(2)));
/// // An older write lost the race and is discarded.
/// assert!(!store.set(alpha, 0.9, Sequence::new(1)));
/// assert_eq!(store.get(alpha), Some(&0.5));
/// ```
#[derive(Clone)]
pub struct PropertyStore<K> {
    entries: SmallVec<[PendingEntry; INLINE_CAPACITY]>,
    owner: K,
}

impl<K: Copy + Eq> PropertyStore<K> {
    /// Creates an empty store for `owner`.
    #[must_use]
    pub fn new(owner: K) -> Self {
        Self {
            entries: SmallVec::new(),
            owner,
        }
    }

    /// Returns the owner key.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> K {
        self.owner
    }

    /// Returns `true` if no property has a pending value.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of properties with pending values.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |entry| entry.id)
    }

    /// Records a typed write.
    ///
    /// Returns `false`, leaving the store unchanged, when the stored value
    /// came from a newer write.
    pub fn set<T: Clone + Send + Sync + 'static>(
        &mut self,
        property: Property<T>,
        value: T,
        sequence: Sequence,
    ) -> bool {
        self.set_erased(property.id(), ErasedValue::new(value), sequence)
    }

    /// Records an untyped write. See [`set`](Self::set).
    pub fn set_erased(&mut self, id: PropertyId, value: ErasedValue, sequence: Sequence) -> bool {
        match self.find(id) {
            Ok(idx) => {
                let entry = &mut self.entries[idx];
                if sequence < entry.sequence {
                    return false;
                }
                entry.sequence = sequence;
                entry.value = value;
            }
            Err(idx) => self.entries.insert(
                idx,
                PendingEntry {
                    id,
                    sequence,
                    value,
                },
            ),
        }
        true
    }

    /// Returns the pending value, if any.
    #[must_use]
    pub fn get<T: Clone + 'static>(&self, property: Property<T>) -> Option<&T> {
        self.get_erased(property.id())
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns the pending value without a type check.
    #[must_use]
    pub fn get_erased(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.find(id).ok().map(|idx| &self.entries[idx].value)
    }

    /// Returns the sequence of the pending value, if any.
    #[must_use]
    pub fn sequence(&self, id: PropertyId) -> Option<Sequence> {
        self.find(id).ok().map(|idx| self.entries[idx].sequence)
    }

    /// Returns `true` if the property has a pending value.
    #[must_use]
    #[inline]
    pub fn contains(&self, id: PropertyId) -> bool {
        self.find(id).is_ok()
    }

    /// Returns the pending value or the registry default.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered with type `T`.
    #[must_use]
    pub fn get_effective<T: Clone + 'static>(
        &self,
        property: Property<T>,
        registry: &PropertyRegistry,
    ) -> T {
        self.get_effective_ref(property, registry).clone()
    }

    /// Borrowed variant of [`get_effective`](Self::get_effective).
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered with type `T`.
    #[must_use]
    pub fn get_effective_ref<'a, T: Clone + 'static>(
        &'a self,
        property: Property<T>,
        registry: &'a PropertyRegistry,
    ) -> &'a T {
        if let Some(value) = self.get(property) {
            return value;
        }
        match registry.get_metadata::<T>(property) {
            Some(metadata) => metadata.default_value(),
            None => panic!("Property {:?} not found in registry", property.id()),
        }
    }

    /// Forgets the pending value for a property.
    ///
    /// Returns `true` if a value was removed.
    pub fn clear(&mut self, id: PropertyId) -> bool {
        match self.find(id) {
            Ok(idx) => {
                self.entries.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Iterates pending entries in [`PropertyId`] order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingEntry> + '_ {
        self.entries.iter()
    }

    /// Returns the newest sequence recorded in the store.
    #[must_use]
    pub fn latest_sequence(&self) -> Option<Sequence> {
        self.entries.iter().map(|entry| entry.sequence).max()
    }

    /// Removes every pending entry, returning them in flush order.
    ///
    /// Entries are ordered by [`PropertyRegistry::flush_key`]: ascending
    /// flush rank, then ascending id.
    pub fn drain_sorted(&mut self, registry: &PropertyRegistry) -> Vec<PendingEntry> {
        let mut drained: Vec<_> = self.entries.drain(..).collect();
        drained.sort_by_key(|entry| registry.flush_key(entry.id));
        drained
    }
}

impl<K: fmt::Debug> fmt::Debug for PropertyStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStore")
            .field("owner", &self.owner)
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FlushOrder, PropertyMetadataBuilder};
    use alloc::string::String;
    use alloc::vec::Vec;

    struct Fixture {
        registry: PropertyRegistry,
        alpha: Property<f64>,
        name: Property<Option<String>>,
        frame: Property<[f64; 4]>,
    }

    fn fixture() -> Fixture {
        let mut registry = PropertyRegistry::new();
        let frame = registry.register(
            "frame",
            PropertyMetadataBuilder::new([0.0; 4])
                .flush_order(FlushOrder::new(5))
                .build(),
        );
        let alpha = registry.register("alpha", PropertyMetadataBuilder::new(1.0).build());
        let name = registry.register("name", PropertyMetadataBuilder::new(None).build());
        Fixture {
            registry,
            alpha,
            name,
            frame,
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = PropertyStore::new(3_u32);
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.owner(), 3);
        assert_eq!(store.latest_sequence(), None);
    }

    #[test]
    fn unset_properties_read_defaults() {
        let fx = fixture();
        let store = PropertyStore::new(0_u32);
        assert_eq!(store.get(fx.alpha), None);
        assert_eq!(store.get_effective(fx.alpha, &fx.registry), 1.0);
        assert_eq!(store.get_effective(fx.name, &fx.registry), None);
    }

    #[test]
    fn newer_writes_replace_older_ones() {
        let fx = fixture();
        let mut store = PropertyStore::new(0_u32);
        assert!(store.set(fx.alpha, 0.3, Sequence::new(1)));
        assert!(store.set(fx.alpha, 0.6, Sequence::new(4)));
        assert_eq!(store.get(fx.alpha), Some(&0.6));
        assert_eq!(store.sequence(fx.alpha.id()), Some(Sequence::new(4)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stale_writes_are_discarded() {
        let fx = fixture();
        let mut store = PropertyStore::new(0_u32);
        assert!(store.set(fx.name, Some(String::from("new")), Sequence::new(9)));
        assert!(!store.set(fx.name, Some(String::from("old")), Sequence::new(3)));
        assert_eq!(store.get(fx.name), Some(&Some(String::from("new"))));
        assert_eq!(store.sequence(fx.name.id()), Some(Sequence::new(9)));
    }

    #[test]
    fn effective_ref_borrows_pending_or_default() {
        let fx = fixture();
        let mut store = PropertyStore::new(0_u32);

        let default_ref = store.get_effective_ref(fx.alpha, &fx.registry);
        let metadata_default = fx.registry.get_metadata(fx.alpha).unwrap().default_value();
        assert!(core::ptr::eq(default_ref, metadata_default));

        store.set(fx.alpha, 0.1, Sequence::new(1));
        let pending_ref = store.get_effective_ref(fx.alpha, &fx.registry);
        assert!(core::ptr::eq(pending_ref, store.get(fx.alpha).unwrap()));
    }

    #[test]
    #[should_panic(expected = "not found in registry")]
    fn effective_read_of_mistyped_handle_panics() {
        let fx = fixture();
        let store = PropertyStore::new(0_u32);
        let wrong: Property<bool> = Property::from_id(fx.alpha.id());
        let _ = store.get_effective(wrong, &fx.registry);
    }

    #[test]
    fn clear_removes_entries() {
        let fx = fixture();
        let mut store = PropertyStore::new(0_u32);
        store.set(fx.alpha, 0.5, Sequence::new(1));
        assert!(store.contains(fx.alpha.id()));
        assert!(store.clear(fx.alpha.id()));
        assert!(!store.clear(fx.alpha.id()));
        assert!(store.is_empty());
    }

    #[test]
    fn iteration_is_in_id_order() {
        let fx = fixture();
        let mut store = PropertyStore::new(0_u32);
        store.set(fx.name, None, Sequence::new(1));
        store.set(fx.frame, [1.0; 4], Sequence::new(2));
        store.set(fx.alpha, 0.2, Sequence::new(3));

        let ids: Vec<_> = store.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, [fx.frame.id(), fx.alpha.id(), fx.name.id()]);
        assert_eq!(store.latest_sequence(), Some(Sequence::new(3)));
    }

    #[test]
    fn drain_sorted_follows_flush_order_and_empties() {
        let fx = fixture();
        let mut store = PropertyStore::new(0_u32);
        store.set(fx.frame, [0.0, 0.0, 10.0, 10.0], Sequence::new(1));
        store.set(fx.name, Some(String::from("root")), Sequence::new(2));
        store.set(fx.alpha, 0.4, Sequence::new(3));

        let drained = store.drain_sorted(&fx.registry);
        let ids: Vec<_> = drained.iter().map(|entry| entry.id).collect();
        // frame has the highest rank, so it goes last even though its id is lowest.
        assert_eq!(ids, [fx.alpha.id(), fx.name.id(), fx.frame.id()]);
        assert_eq!(drained[0].value.downcast_ref::<f64>(), Some(&0.4));
        assert!(store.is_empty());
    }

    #[test]
    fn clones_are_independent() {
        let fx = fixture();
        let mut store = PropertyStore::new(1_u32);
        store.set(fx.alpha, 0.5, Sequence::new(1));

        let mut cloned = store.clone();
        cloned.set(fx.alpha, 0.7, Sequence::new(2));
        assert_eq!(store.get(fx.alpha), Some(&0.5));
        assert_eq!(cloned.get(fx.alpha), Some(&0.7));
        assert_eq!(cloned.owner(), 1);
    }
}
