// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptors.
//!
//! [`PropertyMetadata`] is the static description of one property: its
//! default, where it falls in the flush order, whether the default must be
//! written explicitly, and an optional coercion applied to every write.

use alloc::boxed::Box;
use core::fmt;

/// Callback that clamps or normalizes a value before it is stored.
pub type CoerceValueCallback<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Relative position of a property when pending values are flushed.
///
/// Lower ranks are applied first. Properties whose valid value depends on
/// another property (a frame computed from an anchor point, say) take a
/// higher rank than their prerequisites. Ties are broken by
/// [`PropertyId`](crate::PropertyId), so the order is total.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlushOrder(u8);

impl FlushOrder {
    /// Rank for properties without ordering constraints.
    pub const DEFAULT: Self = Self(0);

    /// Creates a rank.
    #[must_use]
    pub const fn new(rank: u8) -> Self {
        Self(rank)
    }

    /// Returns the numeric rank.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0
    }
}

/// Descriptor for a property.
///
/// ```rust
/// use understory_property::{FlushOrder, PropertyMetadataBuilder};
///
/// let alpha = PropertyMetadataBuilder::new(1.0_f64)
///     .coerce(|v| v.clamp(0.0, 1.0))
///     .build();
/// assert_eq!(alpha.default_value(), &1.0);
/// assert_eq!(alpha.coerce(3.0), 1.0);
/// assert_eq!(alpha.flush_order(), FlushOrder::DEFAULT);
/// ```
pub struct PropertyMetadata<T: Clone + 'static> {
    default_value: T,
    flush_order: FlushOrder,
    always_flush: bool,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: Clone + 'static> PropertyMetadata<T> {
    /// Creates a descriptor with the given default and no other settings.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        PropertyMetadataBuilder::new(default_value).build()
    }

    /// Returns the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Returns the flush rank.
    #[must_use]
    #[inline]
    pub fn flush_order(&self) -> FlushOrder {
        self.flush_order
    }

    /// Returns whether the default is written even when no value is pending.
    ///
    /// Set this when the backing object's native default differs from
    /// [`default_value`](Self::default_value).
    #[must_use]
    #[inline]
    pub fn always_flush(&self) -> bool {
        self.always_flush
    }

    /// Runs the coercion callback, if any.
    #[inline]
    pub fn coerce(&self, value: T) -> T {
        match &self.coerce_callback {
            Some(callback) => callback(value),
            None => value,
        }
    }

    /// Returns whether a coercion callback is set.
    #[must_use]
    #[inline]
    pub fn has_coerce_callback(&self) -> bool {
        self.coerce_callback.is_some()
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("flush_order", &self.flush_order)
            .field("always_flush", &self.always_flush)
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
///
/// ```rust
/// use understory_property::{FlushOrder, PropertyMetadataBuilder};
///
/// let frame_after_bounds = PropertyMetadataBuilder::new((0.0_f64, 0.0_f64))
///     .flush_order(FlushOrder::new(4))
///     .build();
/// assert_eq!(frame_after_bounds.flush_order().rank(), 4);
/// ```
pub struct PropertyMetadataBuilder<T: Clone + 'static> {
    default_value: T,
    flush_order: FlushOrder,
    always_flush: bool,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadataBuilder")
            .field("default_value", &self.default_value)
            .field("flush_order", &self.flush_order)
            .field("always_flush", &self.always_flush)
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

impl<T: Clone + 'static> PropertyMetadataBuilder<T> {
    /// Starts a descriptor with the given default.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            flush_order: FlushOrder::DEFAULT,
            always_flush: false,
            coerce_callback: None,
        }
    }

    /// Sets the flush rank.
    #[must_use]
    pub fn flush_order(mut self, order: FlushOrder) -> Self {
        self.flush_order = order;
        self
    }

    /// Writes the default during a flush even when nothing is pending.
    #[must_use]
    pub fn always_flush(mut self, always: bool) -> Self {
        self.always_flush = always;
        self
    }

    /// Sets a coercion applied to every write.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        PropertyMetadata {
            default_value: self.default_value,
            flush_order: self.flush_order,
            always_flush: self.always_flush,
            coerce_callback: self.coerce_callback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn plain_descriptor() {
        let metadata = PropertyMetadata::new(false);
        assert_eq!(metadata.default_value(), &false);
        assert_eq!(metadata.flush_order(), FlushOrder::DEFAULT);
        assert!(!metadata.always_flush());
        assert!(!metadata.has_coerce_callback());
        assert!(metadata.coerce(true), "no callback passes values through");
    }

    #[test]
    fn builder_sets_every_field() {
        let metadata = PropertyMetadataBuilder::new(3.0_f64)
            .flush_order(FlushOrder::new(2))
            .always_flush(true)
            .coerce(f64::abs)
            .build();

        assert_eq!(metadata.flush_order(), FlushOrder::new(2));
        assert!(metadata.always_flush());
        assert_eq!(metadata.coerce(-3.0), 3.0);
    }

    #[test]
    fn flush_orders_compare_by_rank() {
        assert!(FlushOrder::new(1) < FlushOrder::new(5));
        assert_eq!(FlushOrder::default(), FlushOrder::DEFAULT);
    }

    #[test]
    fn debug_output() {
        let metadata = PropertyMetadataBuilder::new(42_i32).always_flush(true).build();
        let debug = format!("{metadata:?}");
        assert!(debug.contains("PropertyMetadata"));
        assert!(debug.contains("42"));
        assert!(debug.contains("always_flush: true"));
    }
}
