// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Property: property descriptors and sequenced sparse storage.
//!
//! This crate holds the data side of a deferred property bridge: the static
//! descriptor table that says what a property is, and the per-object store
//! that collects values written before the object they describe exists.
//! Locking, thread affinity and the hand-off to a live object belong to
//! `understory_node`.
//!
//! ## Core Concepts
//!
//! - [`PropertyRegistry`] maps each [`PropertyId`] to a name, a value type
//!   and a [`PropertyMetadata`] descriptor (default value, [`FlushOrder`],
//!   always-flush flag, coercion).
//! - [`Property<T>`] is a typed, `const`-constructible handle.
//! - [`PropertyStore`] keeps explicitly written values only. Each entry
//!   remembers the [`Sequence`] of its write; older writes never overwrite
//!   newer ones.
//! - [`PropertyStore::drain_sorted`] hands the pending values out in flush
//!   order, prerequisites first.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_property::{
//!     FlushOrder, PropertyMetadataBuilder, PropertyRegistry, PropertyStore, Sequence,
//! };
//!
//! let mut registry = PropertyRegistry::new();
//! let alpha = registry.register(
//!     "alpha",
//!     PropertyMetadataBuilder::new(1.0_f64)
//!         .coerce(|v| v.clamp(0.0, 1.0))
//!         .build(),
//! );
//! let frame = registry.register(
//!     "frame",
//!     PropertyMetadataBuilder::new([0.0_f64; 4])
//!         .flush_order(FlushOrder::new(3))
//!         .build(),
//! );
//!
//! let mut store = PropertyStore::new(1_u64);
//! store.set(frame, [0.0, 0.0, 20.0, 10.0], Sequence::new(1));
//! store.set(alpha, 0.3, Sequence::new(2));
//!
//! assert_eq!(store.get_effective(alpha, &registry), 0.3);
//!
//! let order: Vec<_> = store.drain_sorted(&registry).iter().map(|e| e.id).collect();
//! assert_eq!(order, [alpha.id(), frame.id()]);
//! assert!(store.is_empty());
//! ```
//!
//! ## Memory Optimizations
//!
//! | Optimization | Description |
//! |--------------|-------------|
//! | **Sparse storage** | `PropertyStore` only allocates for written properties |
//! | **Shared defaults** | Defaults live in the registry, not per object |
//! | **Inline storage** | `SmallVec` for small property counts |
//! | **`PropertyId` as u16** | Compact property identification |
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod id;
mod metadata;
mod registry;
mod store;
mod value;

pub use id::{Property, PropertyId};
pub use metadata::{CoerceValueCallback, FlushOrder, PropertyMetadata, PropertyMetadataBuilder};
pub use registry::{PropertyRegistration, PropertyRegistry};
pub use store::{PendingEntry, PropertyStore, Sequence};
pub use value::ErasedValue;
