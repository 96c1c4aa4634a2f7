// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property identification types.
//!
//! [`PropertyId`] is the untyped key used by registries, stores and backing
//! objects. [`Property<T>`] carries the value type so typed reads and writes
//! are checked at compile time.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime property identifier.
///
/// A `u16` slot index into a [`PropertyRegistry`](crate::PropertyRegistry).
/// Ids are dense and assigned in registration order, which lets tables that
/// are built at startup declare their ids as constants.
///
/// ```rust
/// use understory_property::PropertyId;
///
/// const ALPHA: PropertyId = PropertyId::new(4);
/// assert_eq!(ALPHA.index(), 4);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a property ID from a slot index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the slot index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed property key.
///
/// Wraps a [`PropertyId`] with a phantom value type. Handles are `Copy`,
/// two bytes wide, and can be declared as `const`:
///
/// ```rust
/// use understory_property::{Property, PropertyId};
///
/// const HIDDEN: Property<bool> = Property::from_id(PropertyId::new(3));
/// assert_eq!(HIDDEN.id().index(), 3);
/// ```
///
/// The registry checks that a handle is used with the type it was registered
/// with; a mismatched handle reads as "not registered".
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Creates a typed handle for `id`.
    ///
    /// The caller must register `id` with value type `T`, either through
    /// [`PropertyRegistry::register`](crate::PropertyRegistry::register) or
    /// [`PropertyRegistry::register_as`](crate::PropertyRegistry::register_as).
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped id.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn ids_order_by_slot() {
        let a = PropertyId::new(2);
        let b = PropertyId::new(7);
        assert!(a < b);
        assert_eq!(a, PropertyId::new(2));
    }

    #[test]
    fn id_formatting() {
        let id = PropertyId::new(42);
        assert_eq!(format!("{id:?}"), "PropertyId(42)");
        assert_eq!(format!("{id}"), "#42");
    }

    #[test]
    fn const_handles_share_ids_across_types() {
        const RAW: PropertyId = PropertyId::new(1);
        const AS_F64: Property<f64> = Property::from_id(RAW);
        const AS_BOOL: Property<bool> = Property::from_id(RAW);
        assert_eq!(AS_F64.id(), AS_BOOL.id());
    }

    #[test]
    fn handles_stay_two_bytes() {
        use core::mem::size_of;
        assert_eq!(size_of::<PropertyId>(), 2);
        assert_eq!(size_of::<Property<f64>>(), 2);
        assert_eq!(size_of::<Property<Option<String>>>(), 2);
    }

    #[test]
    fn debug_names_the_value_type() {
        let prop: Property<bool> = Property::from_id(PropertyId::new(9));
        let debug = format!("{prop:?}");
        assert!(debug.contains("bool"), "debug output should name the type");
    }
}
