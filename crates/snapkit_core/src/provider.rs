//! Style and geometry capability
//!
//! Everything the engine knows about the document comes through
//! [`StyleAndGeometryProvider`]. A host wires it to its real style and
//! layout engine; tests and the CLI use [`SnapTree`](crate::tree::SnapTree).

use smallvec::SmallVec;

use crate::geometry::{Point, Rect};
use crate::style::SnapStyle;
use crate::tree::ElementId;

/// Scroll position and extent of a scroll container
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_left: f32,
    pub scroll_top: f32,
    /// Total scrollable content width
    pub scroll_width: f32,
    /// Total scrollable content height
    pub scroll_height: f32,
    /// Viewport width inside borders
    pub client_width: f32,
    /// Viewport height inside borders
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn offset(&self) -> Point {
        Point::new(self.scroll_left, self.scroll_top)
    }

    pub fn max_scroll_left(&self) -> f32 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    pub fn max_scroll_top(&self) -> f32 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// Read-only access to computed style and layout
///
/// All queries about a dead element return `None` (or an empty list).
pub trait StyleAndGeometryProvider {
    /// Whether `id` still refers to a live element
    fn is_alive(&self, id: ElementId) -> bool;

    fn parent(&self, id: ElementId) -> Option<ElementId>;

    /// All descendants of `id` in document (pre-)order, excluding `id`
    fn descendants(&self, id: ElementId) -> Vec<ElementId>;

    fn style(&self, id: ElementId) -> Option<SnapStyle>;

    /// Border-box rect in the shared viewport space
    fn bounding_rect(&self, id: ElementId) -> Option<Rect>;

    fn scroll_metrics(&self, id: ElementId) -> Option<ScrollMetrics>;

    /// The element that scrolls the document, if any
    fn scrolling_element(&self) -> Option<ElementId>;

    /// Ancestors from the immediate parent up to the root
    fn ancestors(&self, id: ElementId) -> SmallVec<[ElementId; 8]> {
        let mut result = SmallVec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            result.push(parent);
            current = parent;
        }
        result
    }
}
