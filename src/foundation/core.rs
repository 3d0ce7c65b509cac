use crate::foundation::error::{OrbflowError, OrbflowResult};

pub use kurbo::{Point, Vec2};

/// Identifier of a page element, used both for geometry anchors and render targets.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Build an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visible viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Build a viewport, rejecting non-finite or non-positive sizes.
    pub fn new(width: f64, height: f64) -> OrbflowResult<Self> {
        if !(width.is_finite() && height.is_finite()) {
            return Err(OrbflowError::validation("viewport size must be finite"));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(OrbflowError::validation("viewport size must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Point at fractional viewport coordinates (viewport space).
    pub fn point_at(self, fx: f64, fy: f64) -> Point {
        Point::new(self.width * fx, self.height * fy)
    }

    /// Viewport centre (viewport space).
    pub fn center(self) -> Point {
        self.point_at(0.5, 0.5)
    }
}

/// Element bounds in document coordinates, as reported by a geometry source.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementRect {
    /// Distance from the document top to the element's top edge.
    pub top: f64,
    /// Distance from the document left to the element's left edge.
    pub left: f64,
    /// Element width.
    pub width: f64,
    /// Element height.
    pub height: f64,
}

impl ElementRect {
    /// Build a rect from its top-left corner and size.
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Bottom edge (document space).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge (document space).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Point at fractional coordinates inside the rect.
    pub fn point_at(&self, fx: f64, fy: f64) -> Point {
        Point::new(self.left + self.width * fx, self.top + self.height * fy)
    }

    /// Rect centre.
    pub fn center(&self) -> Point {
        self.point_at(0.5, 0.5)
    }

    /// Whether every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.top.is_finite()
            && self.left.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// The only channels the engine controls for an animated element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualState {
    /// Horizontal offset from the element's home position.
    pub offset_x: f64,
    /// Vertical offset from the element's home position.
    pub offset_y: f64,
    /// Uniform scale (1 = identity).
    pub scale: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for VisualState {
    fn default() -> Self {
        Self::HIDDEN
    }
}

impl VisualState {
    /// Reset state: no offset, identity scale, fully transparent.
    pub const HIDDEN: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
        opacity: 0.0,
    };

    /// Build a state from an offset vector.
    pub fn new(offset: Vec2, scale: f64, opacity: f64) -> Self {
        Self {
            offset_x: offset.x,
            offset_y: offset.y,
            scale,
            opacity,
        }
    }

    /// Offset as a vector.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    /// Whether the element would be drawn at all.
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// Copy with a different opacity.
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self { opacity, ..self }
    }

    /// Whether every channel is a finite number.
    pub fn is_finite(&self) -> bool {
        self.offset_x.is_finite()
            && self.offset_y.is_finite()
            && self.scale.is_finite()
            && self.opacity.is_finite()
    }

    /// Replace non-finite channels with `fallback`'s and clamp scale/opacity ranges.
    pub fn sanitized(self, fallback: VisualState) -> Self {
        fn pick(v: f64, fb: f64) -> f64 {
            if v.is_finite() { v } else { fb }
        }

        Self {
            offset_x: pick(self.offset_x, fallback.offset_x),
            offset_y: pick(self.offset_y, fallback.offset_y),
            scale: pick(self.scale, fallback.scale).max(0.0),
            opacity: pick(self.opacity, fallback.opacity).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
