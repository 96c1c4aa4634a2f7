// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for nodes: identifiers, backing kinds and the value types of
//! the bridged properties that are not plain numbers or geometry.

use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier for a node.
///
/// Allocated from a process-wide counter when the node is constructed, so
/// ids are unique and increase in construction order. Used to correlate log
/// events.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The kind of toolkit object backing a node.
///
/// Each kind has its own property table; see
/// [`properties`](Self::properties).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackingKind {
    /// An interactive view. Every bridged property is meaningful.
    #[default]
    View,
    /// A bare compositing layer. View-only properties are stored but inert,
    /// and user interaction is off by default.
    Layer,
}

/// How content is fitted into a node's bounds.
///
/// There is no mode that redraws on resize; set
/// [`NEEDS_DISPLAY_ON_BOUNDS_CHANGE`](crate::props::NEEDS_DISPLAY_ON_BOUNDS_CHANGE)
/// instead.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentMode {
    /// Stretch to fill, ignoring aspect ratio.
    #[default]
    ScaleToFill,
    /// Scale to fit inside, preserving aspect ratio.
    ScaleAspectFit,
    /// Scale to cover, preserving aspect ratio.
    ScaleAspectFill,
    /// Center without scaling.
    Center,
    /// Align to the top edge.
    Top,
    /// Align to the bottom edge.
    Bottom,
    /// Align to the left edge.
    Left,
    /// Align to the right edge.
    Right,
    /// Align to the top-left corner.
    TopLeft,
    /// Align to the top-right corner.
    TopRight,
    /// Align to the bottom-left corner.
    BottomLeft,
    /// Align to the bottom-right corner.
    BottomRight,
}

/// Opaque, shared layer contents (a decoded image, a surface handle).
///
/// Equality is identity: two `Contents` are equal when they share the same
/// allocation.
///
/// ```rust
/// use understory_node::Contents;
///
/// let image = Contents::new(vec![0_u8; 16]);
/// assert_eq!(image.downcast_ref::<Vec<u8>>().map(Vec::len), Some(16));
/// assert_eq!(image, image.clone());
/// assert_ne!(image, Contents::new(vec![0_u8; 16]));
/// ```
#[derive(Clone)]
pub struct Contents(Arc<dyn Any + Send + Sync>);

impl Contents {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrows the wrapped value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Returns `true` if both refer to the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Contents {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Contents {}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Contents")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

bitflags::bitflags! {
    /// Which margins and dimensions follow the parent's size.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AutoresizingMask: u8 {
        /// The left margin stretches.
        const FLEXIBLE_LEFT_MARGIN   = 1 << 0;
        /// The width stretches.
        const FLEXIBLE_WIDTH         = 1 << 1;
        /// The right margin stretches.
        const FLEXIBLE_RIGHT_MARGIN  = 1 << 2;
        /// The top margin stretches.
        const FLEXIBLE_TOP_MARGIN    = 1 << 3;
        /// The height stretches.
        const FLEXIBLE_HEIGHT        = 1 << 4;
        /// The bottom margin stretches.
        const FLEXIBLE_BOTTOM_MARGIN = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Which edges are antialiased when edge antialiasing is allowed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EdgeAntialiasingMask: u8 {
        /// The left edge.
        const LEFT   = 1 << 0;
        /// The right edge.
        const RIGHT  = 1 << 1;
        /// The bottom edge.
        const BOTTOM = 1 << 2;
        /// The top edge.
        const TOP    = 1 << 3;
    }
}

impl Default for EdgeAntialiasingMask {
    fn default() -> Self {
        Self::all()
    }
}

bitflags::bitflags! {
    /// Accessibility traits describing what an element is and does.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AccessibilityTraits: u32 {
        /// Behaves like a button.
        const BUTTON              = 1 << 0;
        /// Behaves like a link.
        const LINK                = 1 << 1;
        /// Is an image.
        const IMAGE               = 1 << 2;
        /// Is currently selected.
        const SELECTED            = 1 << 3;
        /// Plays a sound when activated.
        const PLAYS_SOUND         = 1 << 4;
        /// Behaves like a keyboard key.
        const KEYBOARD_KEY        = 1 << 5;
        /// Static text that cannot change.
        const STATIC_TEXT         = 1 << 6;
        /// Summarizes the current state of the interface.
        const SUMMARY_ELEMENT     = 1 << 7;
        /// Is disabled.
        const NOT_ENABLED         = 1 << 8;
        /// Updates its label or value frequently.
        const UPDATES_FREQUENTLY  = 1 << 9;
        /// Is a search field.
        const SEARCH_FIELD        = 1 << 10;
        /// Starts a media session when activated.
        const STARTS_MEDIA        = 1 << 11;
        /// Can be continuously adjusted.
        const ADJUSTABLE          = 1 << 12;
        /// Allows direct touch interaction.
        const ALLOWS_DIRECT_INTERACTION = 1 << 13;
        /// Causes a page turn when reading reaches the end.
        const CAUSES_PAGE_TURN    = 1 << 14;
        /// Is a section header.
        const HEADER              = 1 << 15;
    }
}

bitflags::bitflags! {
    /// Deferred requests recorded before a node's backing object exists.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct Signals: u8 {
        const NEEDS_DISPLAY = 1 << 0;
        const NEEDS_LAYOUT  = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_increase() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert!(b > a);
        assert_eq!(format!("{a}"), format!("node#{}", a.get()));
    }

    #[test]
    fn defaults() {
        assert_eq!(BackingKind::default(), BackingKind::View);
        assert_eq!(ContentMode::default(), ContentMode::ScaleToFill);
        assert_eq!(EdgeAntialiasingMask::default(), EdgeAntialiasingMask::all());
        assert!(AutoresizingMask::default().is_empty());
        assert!(AccessibilityTraits::default().is_empty());
    }

    #[test]
    fn contents_compare_by_identity() {
        let a = Contents::new(1_u32);
        let b = a.clone();
        let c = Contents::new(1_u32);
        assert!(a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(c.downcast_ref::<u32>(), Some(&1));
        assert_eq!(c.downcast_ref::<u64>(), None);
    }
}
