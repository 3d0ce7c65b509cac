//! Boundary traits between the engine and the page it animates.
//!
//! The engine reads geometry and scroll position through these traits and writes
//! visual states through [`RenderSink`]. Nothing else crosses the boundary.

pub(crate) mod memory;

use crate::foundation::core::{ElementId, ElementRect, Viewport, VisualState};

/// Write surface of the rendering layer.
pub trait RenderSink {
    /// Apply a visual state to one element.
    fn set_visual_state(&mut self, element: &ElementId, state: VisualState);
}

/// Live layout measurements.
///
/// Rects are in document coordinates. `None` means the element is not mounted or
/// cannot be measured right now; callers must degrade gracefully.
pub trait GeometrySource {
    /// Measure one element.
    fn measure(&self, element: &ElementId) -> Option<ElementRect>;

    /// Total document height, if known.
    fn document_height(&self) -> Option<f64>;
}

/// Scroll position and viewport size.
pub trait ScrollSource {
    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> f64;

    /// Current viewport size.
    fn viewport(&self) -> Viewport;
}

impl<T: RenderSink + ?Sized> RenderSink for &mut T {
    fn set_visual_state(&mut self, element: &ElementId, state: VisualState) {
        (**self).set_visual_state(element, state);
    }
}

impl<T: GeometrySource + ?Sized> GeometrySource for &T {
    fn measure(&self, element: &ElementId) -> Option<ElementRect> {
        (**self).measure(element)
    }

    fn document_height(&self) -> Option<f64> {
        (**self).document_height()
    }
}
