// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptor table.
//!
//! [`PropertyRegistry`] maps each [`PropertyId`] to its name, value type and
//! [`PropertyMetadata`]. A registry is built once and then only read.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;
use hashbrown::HashMap;

use crate::id::{Property, PropertyId};
use crate::metadata::{FlushOrder, PropertyMetadata};
use crate::value::ErasedValue;

/// A registration entry for a property.
pub struct PropertyRegistration {
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    metadata: Box<dyn ErasedMetadata>,
}

impl PropertyRegistration {
    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the value type.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the flush rank.
    #[must_use]
    #[inline]
    pub fn flush_order(&self) -> FlushOrder {
        self.metadata.flush_order()
    }

    /// Returns whether the default is flushed even when nothing is pending.
    #[must_use]
    #[inline]
    pub fn always_flush(&self) -> bool {
        self.metadata.always_flush()
    }

    /// Returns a copy of the default value.
    #[must_use]
    pub fn default_erased(&self) -> ErasedValue {
        self.metadata.default_erased()
    }
}

impl fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("flush_order", &self.flush_order())
            .field("always_flush", &self.always_flush())
            .finish_non_exhaustive()
    }
}

/// A table of property descriptors.
///
/// ```rust
/// use understory_property::{FlushOrder, PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let bounds = registry.register("bounds", PropertyMetadataBuilder::new([0.0_f64; 4]).build());
/// let frame = registry.register(
///     "frame",
///     PropertyMetadataBuilder::new([0.0_f64; 4])
///         .flush_order(FlushOrder::new(1))
///         .build(),
/// );
///
/// assert_eq!(registry.name(frame.id()), Some("frame"));
/// assert!(registry.flush_key(bounds.id()) < registry.flush_key(frame.id()));
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRegistration>,
    by_name: HashMap<&'static str, PropertyId>,
}

impl PropertyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property and returns its typed handle.
    ///
    /// # Panics
    ///
    /// Panics if the name is already registered or the registry is full.
    pub fn register<T: Clone + Send + Sync + 'static>(
        &mut self,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Property<T> {
        assert!(
            !self.by_name.contains_key(name),
            "Property '{name}' is already registered"
        );
        assert!(
            self.properties.len() < u16::MAX as usize,
            "Too many properties registered (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(self.properties.len() as u16);

        self.properties.push(PropertyRegistration {
            name,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            metadata: Box::new(metadata),
        });
        self.by_name.insert(name, id);

        Property::from_id(id)
    }

    /// Registers a property under a pre-declared handle.
    ///
    /// Tables that publish their handles as constants use this to keep the
    /// constants and the registration order in lockstep.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not the next free slot, or for the reasons
    /// listed on [`register`](Self::register).
    pub fn register_as<T: Clone + Send + Sync + 'static>(
        &mut self,
        property: Property<T>,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) {
        let expected = self.properties.len();
        assert!(
            usize::from(property.id().index()) == expected,
            "Property '{name}' declared as {} but the next free slot is #{expected}",
            property.id()
        );
        self.register(name, metadata);
    }

    /// Returns the number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(PropertyRegistration::name)
    }

    /// Returns the registration for a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(usize::from(id.index()))
    }

    /// Returns the key pending values are flushed by.
    ///
    /// Unregistered ids sort last.
    #[must_use]
    pub fn flush_key(&self, id: PropertyId) -> (FlushOrder, PropertyId) {
        let order = self
            .get(id)
            .map_or(FlushOrder::new(u8::MAX), PropertyRegistration::flush_order);
        (order, id)
    }

    /// Returns ids of properties whose default must always be flushed, in
    /// flush order.
    #[must_use]
    pub fn always_flushed(&self) -> Vec<PropertyId> {
        let mut ids: Vec<_> = self
            .iter()
            .filter(|(_, r)| r.always_flush())
            .map(|(id, _)| id)
            .collect();
        ids.sort_by_key(|id| self.flush_key(*id));
        ids
    }

    /// Returns a copy of a property's default value.
    #[must_use]
    pub fn default_erased(&self, id: PropertyId) -> Option<ErasedValue> {
        self.get(id).map(PropertyRegistration::default_erased)
    }

    /// Returns the metadata for a typed property.
    ///
    /// Returns `None` if the property is not registered or was registered
    /// with a different value type.
    #[must_use]
    pub fn get_metadata<T: Clone + 'static>(
        &self,
        property: Property<T>,
    ) -> Option<&PropertyMetadata<T>> {
        self.get(property.id())
            .and_then(|r| r.metadata.downcast_ref())
    }

    /// Returns an iterator over all registered properties.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            (PropertyId::new(i as u16), r)
        })
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field(
                "properties",
                &self.properties.iter().map(|r| r.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

trait ErasedMetadata: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn flush_order(&self) -> FlushOrder;
    fn always_flush(&self) -> bool;
    fn default_erased(&self) -> ErasedValue;
}

impl<T: Clone + Send + Sync + 'static> ErasedMetadata for PropertyMetadata<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn flush_order(&self) -> FlushOrder {
        Self::flush_order(self)
    }

    fn always_flush(&self) -> bool {
        Self::always_flush(self)
    }

    fn default_erased(&self) -> ErasedValue {
        ErasedValue::new(self.default_value().clone())
    }
}

impl dyn ErasedMetadata {
    fn downcast_ref<T: Clone + 'static>(&self) -> Option<&PropertyMetadata<T>> {
        self.as_any().downcast_ref()
    }
}
