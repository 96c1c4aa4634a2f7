// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The bridged properties.
//!
//! Every node kind shares these handles; only defaults differ per
//! [`BackingKind`](crate::BackingKind). The [`id`] module repeats the ids
//! untyped so backing objects can `match` on them.
//!
//! ```rust
//! use understory_node::props::{self, id};
//! use understory_property::PropertyId;
//!
//! fn describe(property: PropertyId) -> &'static str {
//!     match property {
//!         id::FRAME | id::BOUNDS | id::POSITION => "geometry",
//!         id::ALPHA | id::HIDDEN => "visibility",
//!         _ => "other",
//!     }
//! }
//!
//! assert_eq!(describe(props::FRAME.id()), "geometry");
//! ```

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use understory_property::{Property, PropertyId};

use crate::{
    AccessibilityTraits, AutoresizingMask, ContentMode, Contents, EdgeAntialiasingMask,
    Transform3d,
};

macro_rules! bridged_properties {
    ($( $(#[$meta:meta])* $index:literal => $konst:ident: $ty:ty; )*) => {
        $(
            $(#[$meta])*
            pub const $konst: Property<$ty> = Property::from_id(PropertyId::new($index));
        )*

        /// Untyped ids of the bridged properties.
        pub mod id {
            use understory_property::PropertyId;
            $(
                #[doc = concat!("Id of [`", stringify!($konst), "`](super::", stringify!($konst), ").")]
                pub const $konst: PropertyId = PropertyId::new($index);
            )*
        }

        /// Number of bridged properties.
        pub const COUNT: usize = [$($index),*].len();
    };
}

bridged_properties! {
    /// Shared content drawn into the node.
    0 => CONTENTS: Option<Contents>;
    /// Whether sublayers are clipped to the bounds.
    1 => CLIPS_TO_BOUNDS: bool;
    /// Whether the node promises to fill its bounds with opaque content.
    2 => OPAQUE: bool;
    /// Whether the node is hidden.
    3 => HIDDEN: bool;
    /// Opacity, clamped to `[0, 1]`.
    4 => ALPHA: f64;
    /// Bounds in the node's own coordinate space.
    5 => BOUNDS: Rect;
    /// Frame in the parent's coordinate space.
    ///
    /// Derived by the backing object from bounds, position and anchor point,
    /// so it flushes after all three. Before creation this ordering is
    /// fixed, not the order of the writes: if both the frame and the bounds
    /// are set, the frame's size wins even when the bounds were written
    /// last. On a created node the later write wins as usual.
    6 => FRAME: Rect;
    /// Anchor point in unit coordinates of the bounds.
    7 => ANCHOR_POINT: Point;
    /// Position of the anchor point in the parent.
    8 => POSITION: Point;
    /// Depth along the Z axis.
    9 => Z_POSITION: f64;
    /// Pixels per point for the contents.
    10 => CONTENTS_SCALE: f64;
    /// Transform applied around the anchor point.
    11 => TRANSFORM: Transform3d;
    /// Transform applied to subnodes.
    12 => SUBNODE_TRANSFORM: Transform3d;
    /// Debug name.
    13 => NAME: Option<String>;
    /// Background fill.
    14 => BACKGROUND_COLOR: Option<Color>;
    /// How contents fit the bounds.
    15 => CONTENT_MODE: ContentMode;
    /// Whether the node receives touches and gestures.
    16 => USER_INTERACTION_ENABLED: bool;
    /// Shadow color.
    17 => SHADOW_COLOR: Color;
    /// Shadow opacity, clamped to `[0, 1]`.
    18 => SHADOW_OPACITY: f64;
    /// Shadow offset.
    19 => SHADOW_OFFSET: Vec2;
    /// Shadow blur radius.
    20 => SHADOW_RADIUS: f64;
    /// Border width.
    21 => BORDER_WIDTH: f64;
    /// Border color.
    22 => BORDER_COLOR: Color;
    /// Whether edges selected by the antialiasing mask are antialiased.
    23 => ALLOWS_EDGE_ANTIALIASING: bool;
    /// Edges antialiased when allowed.
    24 => EDGE_ANTIALIASING_MASK: EdgeAntialiasingMask;
    /// Whether a bounds size change requests a redraw.
    25 => NEEDS_DISPLAY_ON_BOUNDS_CHANGE: bool;
    /// Whether subnodes resize with this node.
    26 => AUTORESIZES_SUBVIEWS: bool;
    /// How this node resizes with its parent.
    27 => AUTORESIZING_MASK: AutoresizingMask;
    /// Whether the node claims touches exclusively.
    28 => EXCLUSIVE_TOUCH: bool;
    /// Whether assistive technologies see this node.
    29 => IS_ACCESSIBILITY_ELEMENT: bool;
    /// Accessibility label.
    30 => ACCESSIBILITY_LABEL: Option<String>;
    /// Accessibility hint.
    31 => ACCESSIBILITY_HINT: Option<String>;
    /// Accessibility value.
    32 => ACCESSIBILITY_VALUE: Option<String>;
    /// Language of the accessibility strings.
    33 => ACCESSIBILITY_LANGUAGE: Option<String>;
    /// Accessibility traits.
    34 => ACCESSIBILITY_TRAITS: AccessibilityTraits;
    /// Accessibility frame in screen coordinates.
    35 => ACCESSIBILITY_FRAME: Rect;
    /// Whether the subtree is hidden from assistive technologies.
    36 => ACCESSIBILITY_ELEMENTS_HIDDEN: bool;
    /// Whether sibling elements are ignored by assistive technologies.
    37 => ACCESSIBILITY_VIEW_IS_MODAL: bool;
    /// Whether children are read as a group.
    38 => SHOULD_GROUP_ACCESSIBILITY_CHILDREN: bool;
}
