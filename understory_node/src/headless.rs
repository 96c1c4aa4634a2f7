// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory backing objects.
//!
//! [`HeadlessLayer`] and [`HeadlessView`] behave like the toolkit objects
//! they stand in for as far as the bridge can tell: they start from the
//! toolkit's native defaults, derive the frame from bounds, position and
//! anchor point, and count redraw and layout requests. They back headless
//! node trees and tests.

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use tracing::debug;
use understory_property::{ErasedValue, Property, PropertyId};

use crate::props::id;
use crate::{
    AccessibilityTraits, AutoresizingMask, Backing, BackingKind, ContentMode, Contents,
    EdgeAntialiasingMask, Transform3d,
};

macro_rules! surface_fields {
    ($( $konst:ident => $field:ident: $ty:ty, )*) => {
        /// Every stored property. The frame is derived and has no field.
        #[derive(Clone, Debug)]
        struct Surface {
            $( $field: $ty, )*
        }

        impl Surface {
            /// Stores a value; `false` if the id is unknown or the type is wrong.
            fn store(&mut self, property: PropertyId, value: &ErasedValue) -> bool {
                match property {
                    $(
                        id::$konst => match value.downcast_ref::<$ty>() {
                            Some(value) => {
                                self.$field = value.clone();
                                true
                            }
                            None => false,
                        },
                    )*
                    _ => false,
                }
            }

            fn load(&self, property: PropertyId) -> Option<ErasedValue> {
                match property {
                    $( id::$konst => Some(ErasedValue::new(self.$field.clone())), )*
                    _ => None,
                }
            }
        }
    };
}

surface_fields! {
    CONTENTS => contents: Option<Contents>,
    CLIPS_TO_BOUNDS => clips_to_bounds: bool,
    OPAQUE => opaque: bool,
    HIDDEN => hidden: bool,
    ALPHA => alpha: f64,
    BOUNDS => bounds: Rect,
    ANCHOR_POINT => anchor_point: Point,
    POSITION => position: Point,
    Z_POSITION => z_position: f64,
    CONTENTS_SCALE => contents_scale: f64,
    TRANSFORM => transform: Transform3d,
    SUBNODE_TRANSFORM => subnode_transform: Transform3d,
    NAME => name: Option<String>,
    BACKGROUND_COLOR => background_color: Option<Color>,
    CONTENT_MODE => content_mode: ContentMode,
    USER_INTERACTION_ENABLED => user_interaction_enabled: bool,
    SHADOW_COLOR => shadow_color: Color,
    SHADOW_OPACITY => shadow_opacity: f64,
    SHADOW_OFFSET => shadow_offset: Vec2,
    SHADOW_RADIUS => shadow_radius: f64,
    BORDER_WIDTH => border_width: f64,
    BORDER_COLOR => border_color: Color,
    ALLOWS_EDGE_ANTIALIASING => allows_edge_antialiasing: bool,
    EDGE_ANTIALIASING_MASK => edge_antialiasing_mask: EdgeAntialiasingMask,
    NEEDS_DISPLAY_ON_BOUNDS_CHANGE => needs_display_on_bounds_change: bool,
    AUTORESIZES_SUBVIEWS => autoresizes_subviews: bool,
    AUTORESIZING_MASK => autoresizing_mask: AutoresizingMask,
    EXCLUSIVE_TOUCH => exclusive_touch: bool,
    IS_ACCESSIBILITY_ELEMENT => is_accessibility_element: bool,
    ACCESSIBILITY_LABEL => accessibility_label: Option<String>,
    ACCESSIBILITY_HINT => accessibility_hint: Option<String>,
    ACCESSIBILITY_VALUE => accessibility_value: Option<String>,
    ACCESSIBILITY_LANGUAGE => accessibility_language: Option<String>,
    ACCESSIBILITY_TRAITS => accessibility_traits: AccessibilityTraits,
    ACCESSIBILITY_FRAME => accessibility_frame: Rect,
    ACCESSIBILITY_ELEMENTS_HIDDEN => accessibility_elements_hidden: bool,
    ACCESSIBILITY_VIEW_IS_MODAL => accessibility_view_is_modal: bool,
    SHOULD_GROUP_ACCESSIBILITY_CHILDREN => should_group_accessibility_children: bool,
}

impl Surface {
    /// The toolkit's defaults. Both kinds start out interactive.
    fn native() -> Self {
        Self {
            contents: None,
            clips_to_bounds: false,
            opaque: true,
            hidden: false,
            alpha: 1.0,
            bounds: Rect::ZERO,
            anchor_point: Point::new(0.5, 0.5),
            position: Point::ZERO,
            z_position: 0.0,
            contents_scale: 1.0,
            transform: Transform3d::IDENTITY,
            subnode_transform: Transform3d::IDENTITY,
            name: None,
            background_color: None,
            content_mode: ContentMode::ScaleToFill,
            user_interaction_enabled: true,
            shadow_color: Color::BLACK,
            shadow_opacity: 0.0,
            shadow_offset: Vec2::new(0.0, -3.0),
            shadow_radius: 3.0,
            border_width: 0.0,
            border_color: Color::BLACK,
            allows_edge_antialiasing: false,
            edge_antialiasing_mask: EdgeAntialiasingMask::all(),
            needs_display_on_bounds_change: false,
            autoresizes_subviews: true,
            autoresizing_mask: AutoresizingMask::empty(),
            exclusive_touch: false,
            is_accessibility_element: false,
            accessibility_label: None,
            accessibility_hint: None,
            accessibility_value: None,
            accessibility_language: None,
            accessibility_traits: AccessibilityTraits::empty(),
            accessibility_frame: Rect::ZERO,
            accessibility_elements_hidden: false,
            accessibility_view_is_modal: false,
            should_group_accessibility_children: false,
        }
    }

    fn frame(&self) -> Rect {
        let size = self.bounds.size();
        let origin = Point::new(
            self.position.x - self.anchor_point.x * size.width,
            self.position.y - self.anchor_point.y * size.height,
        );
        Rect::from_origin_size(origin, size)
    }

    /// Rewrites bounds size and position so that [`frame`](Self::frame)
    /// returns `frame`.
    fn set_frame(&mut self, frame: Rect) {
        let frame = frame.abs();
        let size = frame.size();
        self.bounds = Rect::from_origin_size(self.bounds.origin(), size);
        self.position = Point::new(
            frame.x0 + self.anchor_point.x * size.width,
            frame.y0 + self.anchor_point.y * size.height,
        );
    }
}

/// State shared by both headless kinds.
#[derive(Clone, Debug)]
struct Headless {
    surface: Surface,
    applied: Vec<PropertyId>,
    needs_display: usize,
    needs_layout: usize,
}

impl Headless {
    fn new() -> Self {
        Self {
            surface: Surface::native(),
            applied: Vec::new(),
            needs_display: 0,
            needs_layout: 0,
        }
    }

    fn apply(&mut self, property: PropertyId, value: &ErasedValue) {
        let size_before = self.surface.bounds.size();
        let stored = if property == id::FRAME {
            match value.downcast_ref::<Rect>() {
                Some(frame) => {
                    self.surface.set_frame(*frame);
                    true
                }
                None => false,
            }
        } else {
            self.surface.store(property, value)
        };
        if !stored {
            debug!(%property, value_type = value.type_name(), "headless backing ignored write");
            return;
        }
        self.applied.push(property);
        if self.surface.needs_display_on_bounds_change && self.surface.bounds.size() != size_before {
            self.needs_display += 1;
        }
    }

    fn read(&self, property: PropertyId) -> Option<ErasedValue> {
        if property == id::FRAME {
            Some(ErasedValue::new(self.surface.frame()))
        } else {
            self.surface.load(property)
        }
    }

    fn get<T: Clone + 'static>(&self, kind: BackingKind, property: Property<T>) -> T {
        if let Some(value) = self.read(property.id()).and_then(|v| v.downcast().ok()) {
            return value;
        }
        match kind.properties().get_metadata(property) {
            Some(metadata) => metadata.default_value().clone(),
            None => panic!("{} is not a {kind:?} property", property.id()),
        }
    }
}

macro_rules! headless_backing {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            state: Headless,
        }

        impl $name {
            /// Creates an object with native defaults.
            #[must_use]
            pub fn new() -> Self {
                Self {
                    state: Headless::new(),
                }
            }

            /// Reads a property.
            ///
            /// # Panics
            ///
            /// Panics if `property` is not a bridged property of type `T`.
            #[must_use]
            pub fn get<T: Clone + 'static>(&self, property: Property<T>) -> T {
                self.state.get(<Self as Backing>::KIND, property)
            }

            /// Returns the frame derived from bounds, position and anchor
            /// point.
            #[must_use]
            pub fn frame(&self) -> Rect {
                self.state.surface.frame()
            }

            /// Returns the bounds size.
            #[must_use]
            pub fn size(&self) -> Size {
                self.state.surface.bounds.size()
            }

            /// Returns every property written so far, in order.
            #[must_use]
            pub fn applied(&self) -> &[PropertyId] {
                &self.state.applied
            }

            /// Returns how many redraws were requested.
            #[must_use]
            pub fn needs_display_count(&self) -> usize {
                self.state.needs_display
            }

            /// Returns how many layout passes were requested.
            #[must_use]
            pub fn needs_layout_count(&self) -> usize {
                self.state.needs_layout
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Backing for $name {
            const KIND: BackingKind = $kind;

            fn apply(&mut self, property: PropertyId, value: &ErasedValue) {
                self.state.apply(property, value);
            }

            fn read(&self, property: PropertyId) -> Option<ErasedValue> {
                self.state.read(property)
            }

            fn set_needs_display(&mut self) {
                self.state.needs_display += 1;
            }

            fn set_needs_layout(&mut self) {
                self.state.needs_layout += 1;
            }
        }
    };
}

headless_backing!(
    /// A headless compositing layer.
    ///
    /// Like a layer-backed toolkit wrapper it starts out accepting user
    /// interaction; the layer table flushes `false` over that.
    HeadlessLayer,
    BackingKind::Layer
);

headless_backing!(
    /// A headless interactive view.
    HeadlessView,
    BackingKind::View
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackingExt, props};

    #[test]
    fn frame_follows_bounds_position_and_anchor() {
        let mut layer = HeadlessLayer::new();
        layer.apply_typed(props::BOUNDS, Rect::new(0.0, 0.0, 100.0, 50.0));
        layer.apply_typed(props::POSITION, Point::new(100.0, 100.0));
        assert_eq!(layer.frame(), Rect::new(50.0, 75.0, 150.0, 125.0));

        layer.apply_typed(props::ANCHOR_POINT, Point::ZERO);
        assert_eq!(layer.get(props::FRAME), Rect::new(100.0, 100.0, 200.0, 150.0));
    }

    #[test]
    fn setting_frame_rewrites_bounds_and_position() {
        let mut view = HeadlessView::new();
        view.apply_typed(props::FRAME, Rect::new(10.0, 20.0, 30.0, 60.0));
        assert_eq!(view.size(), Size::new(20.0, 40.0));
        assert_eq!(view.get(props::POSITION), Point::new(20.0, 40.0));
        assert_eq!(view.frame(), Rect::new(10.0, 20.0, 30.0, 60.0));
        assert_eq!(view.applied(), [id::FRAME]);
    }

    #[test]
    fn wrong_type_is_ignored() {
        let mut view = HeadlessView::new();
        view.apply(id::ALPHA, &ErasedValue::new("opaque"));
        assert_eq!(view.get(props::ALPHA), 1.0);
        assert!(view.applied().is_empty());
    }

    #[test]
    fn bounds_change_can_request_display() {
        let mut layer = HeadlessLayer::new();
        layer.apply_typed(props::BOUNDS, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(layer.needs_display_count(), 0);

        layer.apply_typed(props::NEEDS_DISPLAY_ON_BOUNDS_CHANGE, true);
        layer.apply_typed(props::BOUNDS, Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(layer.needs_display_count(), 1);
        // Same size, different origin.
        layer.apply_typed(props::BOUNDS, Rect::new(5.0, 5.0, 25.0, 15.0));
        assert_eq!(layer.needs_display_count(), 1);
    }

    #[test]
    fn native_interaction_differs_from_layer_table() {
        let layer = HeadlessLayer::new();
        assert!(layer.get(props::USER_INTERACTION_ENABLED));
        let table = BackingKind::Layer.properties();
        assert_eq!(
            table
                .get_metadata(props::USER_INTERACTION_ENABLED)
                .map(|m| *m.default_value()),
            Some(false)
        );
    }

    #[test]
    fn signals_are_counted() {
        let mut view = HeadlessView::new();
        view.set_needs_display();
        view.set_needs_layout();
        view.set_needs_layout();
        assert_eq!(view.needs_display_count(), 1);
        assert_eq!(view.needs_layout_count(), 2);
    }
}
