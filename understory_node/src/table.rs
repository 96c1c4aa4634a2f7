// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static descriptor tables, one per backing kind.

use std::sync::LazyLock;

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use understory_property::{FlushOrder, PropertyMetadata, PropertyMetadataBuilder, PropertyRegistry};

use crate::props::*;
use crate::{
    AccessibilityTraits, AutoresizingMask, BackingKind, ContentMode, EdgeAntialiasingMask,
    Transform3d,
};

// Geometry flushes prerequisites first: the frame is derived from the
// anchor point, bounds and position, and the transforms act on the frame.
const ANCHOR_RANK: FlushOrder = FlushOrder::new(1);
const BOUNDS_RANK: FlushOrder = FlushOrder::new(2);
const POSITION_RANK: FlushOrder = FlushOrder::new(3);
const FRAME_RANK: FlushOrder = FlushOrder::new(4);
const TRANSFORM_RANK: FlushOrder = FlushOrder::new(5);
const SUBNODE_TRANSFORM_RANK: FlushOrder = FlushOrder::new(6);
// Contents are decoded at the scale in effect when they arrive.
const CONTENTS_SCALE_RANK: FlushOrder = FlushOrder::new(1);
const CONTENTS_RANK: FlushOrder = FlushOrder::new(2);

static VIEW_PROPERTIES: LazyLock<PropertyRegistry> = LazyLock::new(|| build(BackingKind::View));
static LAYER_PROPERTIES: LazyLock<PropertyRegistry> = LazyLock::new(|| build(BackingKind::Layer));

impl BackingKind {
    /// Returns the descriptor table for this kind.
    ///
    /// ```rust
    /// use understory_node::{BackingKind, props};
    ///
    /// let layer = BackingKind::Layer.properties();
    /// let interaction = layer.get_metadata(props::USER_INTERACTION_ENABLED).unwrap();
    /// assert_eq!(interaction.default_value(), &false);
    /// assert!(interaction.always_flush());
    /// ```
    #[must_use]
    pub fn properties(self) -> &'static PropertyRegistry {
        match self {
            Self::View => &VIEW_PROPERTIES,
            Self::Layer => &LAYER_PROPERTIES,
        }
    }
}

fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn ranked<T: Clone + Send + Sync + 'static>(default: T, rank: FlushOrder) -> PropertyMetadata<T> {
    PropertyMetadataBuilder::new(default).flush_order(rank).build()
}

fn build(kind: BackingKind) -> PropertyRegistry {
    let mut r = PropertyRegistry::new();

    r.register_as(CONTENTS, "contents", ranked(None, CONTENTS_RANK));
    r.register_as(CLIPS_TO_BOUNDS, "clipsToBounds", PropertyMetadata::new(false));
    r.register_as(OPAQUE, "opaque", PropertyMetadata::new(true));
    r.register_as(HIDDEN, "hidden", PropertyMetadata::new(false));
    r.register_as(
        ALPHA,
        "alpha",
        PropertyMetadataBuilder::new(1.0).coerce(unit_interval).build(),
    );
    r.register_as(BOUNDS, "bounds", ranked(Rect::ZERO, BOUNDS_RANK));
    r.register_as(FRAME, "frame", ranked(Rect::ZERO, FRAME_RANK));
    r.register_as(
        ANCHOR_POINT,
        "anchorPoint",
        ranked(Point::new(0.5, 0.5), ANCHOR_RANK),
    );
    r.register_as(POSITION, "position", ranked(Point::ZERO, POSITION_RANK));
    r.register_as(Z_POSITION, "zPosition", PropertyMetadata::new(0.0));
    r.register_as(
        CONTENTS_SCALE,
        "contentsScale",
        ranked(1.0, CONTENTS_SCALE_RANK),
    );
    r.register_as(
        TRANSFORM,
        "transform",
        ranked(Transform3d::IDENTITY, TRANSFORM_RANK),
    );
    r.register_as(
        SUBNODE_TRANSFORM,
        "subnodeTransform",
        ranked(Transform3d::IDENTITY, SUBNODE_TRANSFORM_RANK),
    );
    r.register_as(NAME, "name", PropertyMetadata::new(None));
    r.register_as(BACKGROUND_COLOR, "backgroundColor", PropertyMetadata::new(None));
    r.register_as(
        CONTENT_MODE,
        "contentMode",
        PropertyMetadata::new(ContentMode::ScaleToFill),
    );
    r.register_as(
        USER_INTERACTION_ENABLED,
        "userInteractionEnabled",
        match kind {
            BackingKind::View => PropertyMetadata::new(true),
            // Layer-backed wrappers start out interactive natively.
            BackingKind::Layer => PropertyMetadataBuilder::new(false)
                .always_flush(true)
                .build(),
        },
    );
    r.register_as(SHADOW_COLOR, "shadowColor", PropertyMetadata::new(Color::BLACK));
    r.register_as(
        SHADOW_OPACITY,
        "shadowOpacity",
        PropertyMetadataBuilder::new(0.0).coerce(unit_interval).build(),
    );
    r.register_as(
        SHADOW_OFFSET,
        "shadowOffset",
        PropertyMetadata::new(Vec2::new(0.0, -3.0)),
    );
    r.register_as(SHADOW_RADIUS, "shadowRadius", PropertyMetadata::new(3.0));
    r.register_as(BORDER_WIDTH, "borderWidth", PropertyMetadata::new(0.0));
    r.register_as(BORDER_COLOR, "borderColor", PropertyMetadata::new(Color::BLACK));
    r.register_as(
        ALLOWS_EDGE_ANTIALIASING,
        "allowsEdgeAntialiasing",
        PropertyMetadata::new(false),
    );
    r.register_as(
        EDGE_ANTIALIASING_MASK,
        "edgeAntialiasingMask",
        PropertyMetadata::new(EdgeAntialiasingMask::all()),
    );
    r.register_as(
        NEEDS_DISPLAY_ON_BOUNDS_CHANGE,
        "needsDisplayOnBoundsChange",
        PropertyMetadata::new(false),
    );
    r.register_as(
        AUTORESIZES_SUBVIEWS,
        "autoresizesSubviews",
        PropertyMetadata::new(true),
    );
    r.register_as(
        AUTORESIZING_MASK,
        "autoresizingMask",
        PropertyMetadata::new(AutoresizingMask::empty()),
    );
    r.register_as(EXCLUSIVE_TOUCH, "exclusiveTouch", PropertyMetadata::new(false));
    r.register_as(
        IS_ACCESSIBILITY_ELEMENT,
        "isAccessibilityElement",
        PropertyMetadata::new(false),
    );
    r.register_as(ACCESSIBILITY_LABEL, "accessibilityLabel", PropertyMetadata::new(None));
    r.register_as(ACCESSIBILITY_HINT, "accessibilityHint", PropertyMetadata::new(None));
    r.register_as(ACCESSIBILITY_VALUE, "accessibilityValue", PropertyMetadata::new(None));
    r.register_as(
        ACCESSIBILITY_LANGUAGE,
        "accessibilityLanguage",
        PropertyMetadata::new(None),
    );
    r.register_as(
        ACCESSIBILITY_TRAITS,
        "accessibilityTraits",
        PropertyMetadata::new(AccessibilityTraits::empty()),
    );
    r.register_as(
        ACCESSIBILITY_FRAME,
        "accessibilityFrame",
        PropertyMetadata::new(Rect::ZERO),
    );
    r.register_as(
        ACCESSIBILITY_ELEMENTS_HIDDEN,
        "accessibilityElementsHidden",
        PropertyMetadata::new(false),
    );
    r.register_as(
        ACCESSIBILITY_VIEW_IS_MODAL,
        "accessibilityViewIsModal",
        PropertyMetadata::new(false),
    );
    r.register_as(
        SHOULD_GROUP_ACCESSIBILITY_CHILDREN,
        "shouldGroupAccessibilityChildren",
        PropertyMetadata::new(false),
    );

    debug_assert_eq!(r.len(), COUNT, "every bridged property is registered");
    r
}
