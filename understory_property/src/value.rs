// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased, thread-shareable property values.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// A type-erased property value.
///
/// Holds any `Clone + Send + Sync + 'static` value together with its
/// [`TypeId`]. Values cross threads freely: a shadow store written on a
/// worker thread is flushed onto a backing object on the affine thread.
///
/// ```rust
/// use understory_property::ErasedValue;
///
/// let value = ErasedValue::new(0.25_f64);
/// assert!(value.is::<f64>());
/// assert_eq!(value.downcast_ref::<f64>(), Some(&0.25));
/// assert_eq!(value.clone().downcast::<f64>().ok(), Some(0.25));
/// ```
pub struct ErasedValue {
    inner: Box<dyn ErasedValueTrait>,
    type_id: TypeId,
}

impl ErasedValue {
    /// Erases a concrete value.
    #[must_use]
    pub fn new<T: Clone + Send + Sync + 'static>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Box::new(value),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the contained type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// Returns `true` if the contained value is a `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrows the contained value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }

    /// Unwraps the contained value as a `T`, or hands `self` back on a type
    /// mismatch.
    pub fn downcast<T: Clone + 'static>(self) -> Result<T, Self> {
        match self.downcast_ref::<T>() {
            Some(value) => Ok(value.clone()),
            None => Err(self),
        }
    }

    /// Clones the contained value into a new [`ErasedValue`].
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
        }
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        self.clone_value()
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedValue")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

trait ErasedValueTrait: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait>;
    fn type_name(&self) -> &'static str;
}

impl<T: Clone + Send + Sync + 'static> ErasedValueTrait for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait> {
        Box::new(self.clone())
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn downcast_checks_type() {
        let value = ErasedValue::new(true);
        assert!(value.is::<bool>());
        assert_eq!(value.downcast_ref::<bool>(), Some(&true));
        assert_eq!(value.downcast_ref::<f64>(), None);
    }

    #[test]
    fn owned_downcast_returns_value_on_mismatch() {
        let value = ErasedValue::new(String::from("layer"));
        let value = value.downcast::<f64>().unwrap_err();
        assert_eq!(value.downcast::<String>().ok().as_deref(), Some("layer"));
    }

    #[test]
    fn clones_are_independent() {
        let value = ErasedValue::new(Some(String::from("name")));
        let cloned = value.clone();
        drop(value);
        assert_eq!(
            cloned.downcast_ref::<Option<String>>(),
            Some(&Some(String::from("name")))
        );
    }

    #[test]
    fn values_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ErasedValue>();
    }

    #[test]
    fn debug_names_type() {
        let debug = format!("{:?}", ErasedValue::new(1.5_f64));
        assert!(debug.contains("f64"), "debug output should name the type");
    }
}
