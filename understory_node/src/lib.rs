// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Node: display nodes that can be configured from any thread
//! before their main-thread backing object exists.
//!
//! A [`Node`] describes a future view or layer. Until the toolkit object is
//! needed, reads and writes go to a lock-protected shadow store and cost
//! next to nothing. When the object is created, on the node's
//! [`AffineContext`](understory_affinity::AffineContext) and exactly once,
//! the shadow state is applied to it in dependency order and sealed. After
//! that the node forwards everything to the object, marshaling calls from
//! other threads onto the affine context.
//!
//! ## Core Concepts
//!
//! - [`props`]: the bridged properties, as typed `const` handles.
//! - [`BackingKind`]: view or layer; each kind has its own descriptor table
//!   ([`BackingKind::properties`]) with defaults, flush order and coercion.
//! - [`Backing`]: the interface a toolkit object implements.
//!   [`HeadlessLayer`] and [`HeadlessView`] are in-memory implementations.
//! - [`Lifecycle`]: `Uninitialized`, then `Creating`, then `Created`. A
//!   failed factory returns the node to `Uninitialized`.
//! - [`WritePolicy`]: whether off-context writes to a created node wait for
//!   the affine context or are queued.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kurbo::{Point, Rect};
//! use understory_affinity::AffineThread;
//! use understory_node::{HeadlessLayer, Node, NodeConfig, props};
//!
//! let main = AffineThread::spawn("main").unwrap();
//! let node = Node::with_config(
//!     NodeConfig::new().with_label("badge"),
//!     Arc::new(main.handle()),
//!     || Ok::<_, &'static str>(HeadlessLayer::new()),
//! );
//!
//! // Any thread, before the layer exists.
//! let worker = node.clone();
//! std::thread::spawn(move || {
//!     worker.set(props::FRAME, Rect::new(10.0, 10.0, 50.0, 30.0));
//!     worker.set(props::ANCHOR_POINT, Point::ZERO);
//!     worker.set_needs_display();
//! })
//! .join()
//! .unwrap();
//! assert_eq!(node.pending_writes(), 2);
//!
//! // The frame is applied after the anchor point, so it survives.
//! let layer = node.ensure_created().unwrap();
//! let (frame, redraws) = layer
//!     .run(|layer| (layer.frame(), layer.needs_display_count()))
//!     .unwrap();
//! assert_eq!(frame, Rect::new(10.0, 10.0, 50.0, 30.0));
//! assert_eq!(redraws, 1);
//! assert_eq!(node.pending_writes(), 0);
//! ```
//!
//! ## Logging
//!
//! Events are emitted through `tracing`: shadow writes and marshaled calls
//! at `trace`, creation at `debug`, dropped writes at `warn` and a factory
//! that re-enters its own node at `error`.

mod backing;
mod config;
mod dispatch;
mod error;
mod flush;
mod gate;
mod headless;
mod node;
pub mod props;
mod shadow;
mod table;
mod transform;
mod types;

pub use backing::{Backing, BackingExt, BackingRef};
pub use config::{NodeConfig, WritePolicy};
pub use error::{BoxError, CreateError};
pub use gate::Lifecycle;
pub use headless::{HeadlessLayer, HeadlessView};
pub use node::Node;
pub use transform::Transform3d;
pub use types::{
    AccessibilityTraits, AutoresizingMask, BackingKind, ContentMode, Contents,
    EdgeAntialiasingMask, NodeId,
};
