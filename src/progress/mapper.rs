//! Scroll position → normalized progress.

use crate::foundation::core::{ElementId, ElementRect, Viewport};
use crate::foundation::error::{OrbflowError, OrbflowResult};
use crate::foundation::math::clamp01;
use crate::platform::GeometrySource;

/// `clamp((start - position) / (start - end), 0, 1)`.
///
/// Works in either direction. A degenerate window (`start == end`) is a step in the
/// scroll-increasing direction: complete once `position` has reached the threshold,
/// not started before it.
pub fn normalized_progress(start_threshold: f64, end_threshold: f64, position: f64) -> f64 {
    let span = start_threshold - end_threshold;
    if span == 0.0 {
        return if position >= start_threshold { 1.0 } else { 0.0 };
    }
    clamp01((start_threshold - position) / span)
}

/// Which edge of an element an anchor tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Top edge.
    #[default]
    Top,
    /// Vertical centre.
    Center,
    /// Bottom edge.
    Bottom,
}

impl Edge {
    fn of(self, rect: &ElementRect) -> f64 {
        match self {
            Self::Top => rect.top,
            Self::Center => rect.top + rect.height / 2.0,
            Self::Bottom => rect.bottom(),
        }
    }
}

/// What an anchor is measured against.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorTarget {
    /// An element edge crossing a horizontal line of the viewport.
    Element {
        /// Measured element.
        id: ElementId,
        /// Tracked edge.
        #[serde(default)]
        edge: Edge,
    },
    /// A fixed distance above the end of the scrollable range.
    DocumentEnd {
        /// Pixels of scroll still remaining when the anchor is reached.
        remaining: f64,
    },
}

/// One end of a trigger window.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Anchor {
    /// Measured target.
    pub target: AnchorTarget,
    /// Viewport line as a fraction of viewport height (0 = top, 1 = bottom).
    #[serde(default)]
    pub viewport: f64,
}

impl Anchor {
    /// "`edge` of `id` reaches `viewport` × viewport height".
    pub fn element(id: impl Into<ElementId>, edge: Edge, viewport: f64) -> Self {
        Self {
            target: AnchorTarget::Element {
                id: id.into(),
                edge,
            },
            viewport,
        }
    }

    /// "`remaining` pixels of scroll are left".
    pub fn document_end(remaining: f64) -> Self {
        Self {
            target: AnchorTarget::DocumentEnd { remaining },
            viewport: 0.0,
        }
    }

    /// Element this anchor measures, if any.
    pub fn element_id(&self) -> Option<&ElementId> {
        match &self.target {
            AnchorTarget::Element { id, .. } => Some(id),
            AnchorTarget::DocumentEnd { .. } => None,
        }
    }

    /// Scroll offset at which the anchor is reached.
    pub fn resolve(
        &self,
        geometry: &dyn GeometrySource,
        viewport: Viewport,
    ) -> Result<f64, Unmeasurable> {
        match &self.target {
            AnchorTarget::Element { id, edge } => {
                let rect = geometry
                    .measure(id)
                    .ok_or_else(|| Unmeasurable(Some(id.clone())))?;
                Ok(edge.of(&rect) - self.viewport * viewport.height)
            }
            AnchorTarget::DocumentEnd { remaining } => {
                let doc = geometry.document_height().ok_or(Unmeasurable(None))?;
                let scrollable = (doc - viewport.height).max(0.0);
                Ok(scrollable - remaining)
            }
        }
    }

    fn validate(&self) -> OrbflowResult<()> {
        if !self.viewport.is_finite() {
            return Err(OrbflowError::validation(
                "anchor viewport fraction must be finite",
            ));
        }
        match &self.target {
            AnchorTarget::Element { id, .. } if id.as_str().trim().is_empty() => Err(
                OrbflowError::validation("anchor element id must be non-empty"),
            ),
            AnchorTarget::DocumentEnd { remaining } if !remaining.is_finite() => Err(
                OrbflowError::validation("anchor remaining distance must be finite"),
            ),
            _ => Ok(()),
        }
    }
}

/// An anchor could not be measured. Holds the element id, or `None` for the
/// document height.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unmeasurable(pub Option<ElementId>);

/// Scroll range over which a controller's progress runs from 0 to 1.
///
/// Start and end may reference different elements (cross-section windows).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TriggerWindow {
    /// Where progress leaves 0.
    pub start: Anchor,
    /// Where progress reaches 1.
    pub end: Anchor,
}

impl TriggerWindow {
    /// Build a window.
    pub fn new(start: Anchor, end: Anchor) -> Self {
        Self { start, end }
    }

    /// Reject malformed anchors.
    pub fn validate(&self) -> OrbflowResult<()> {
        self.start.validate()?;
        self.end.validate()
    }

    /// Measure both anchors now.
    pub fn resolve(
        &self,
        geometry: &dyn GeometrySource,
        viewport: Viewport,
    ) -> Result<ResolvedWindow, Unmeasurable> {
        Ok(ResolvedWindow {
            start: self.start.resolve(geometry, viewport)?,
            end: self.end.resolve(geometry, viewport)?,
        })
    }
}

/// A window measured against live layout, in scroll offsets.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedWindow {
    /// Scroll offset where progress leaves 0.
    pub start: f64,
    /// Scroll offset where progress reaches 1.
    pub end: f64,
}

impl ResolvedWindow {
    /// Progress at `scroll`.
    pub fn progress(&self, scroll: f64) -> f64 {
        normalized_progress(self.start, self.end, scroll)
    }

    /// Scroll offset at which the window reads `progress`.
    pub fn scroll_at(&self, progress: f64) -> f64 {
        self.start + (self.end - self.start) * progress
    }
}

/// Stateful mapper: re-measures every call and degrades to the last known value.
#[derive(Clone, Debug)]
pub struct ProgressMapper {
    window: TriggerWindow,
    last: f64,
    missing: Option<Unmeasurable>,
}

impl ProgressMapper {
    /// Mapper over `window`, starting at progress 0.
    pub fn new(window: TriggerWindow) -> Self {
        Self {
            window,
            last: 0.0,
            missing: None,
        }
    }

    /// The window being mapped.
    pub fn window(&self) -> &TriggerWindow {
        &self.window
    }

    /// Last progress produced.
    pub fn last(&self) -> f64 {
        self.last
    }

    /// The anchor that failed to measure on the latest call, if any.
    pub fn missing(&self) -> Option<&Unmeasurable> {
        self.missing.as_ref()
    }

    /// Map `scroll` to progress. Never fails: an unmeasurable anchor yields the
    /// last known progress.
    pub fn map(&mut self, scroll: f64, viewport: Viewport, geometry: &dyn GeometrySource) -> f64 {
        match self.window.resolve(geometry, viewport) {
            Ok(resolved) => {
                self.missing = None;
                let p = resolved.progress(scroll);
                if p.is_finite() {
                    self.last = p;
                }
            }
            Err(missing) => {
                if self.missing.as_ref() != Some(&missing) {
                    tracing::debug!(?missing, "trigger window anchor unmeasurable");
                }
                self.missing = Some(missing);
            }
        }
        self.last
    }

    /// Measure the window without touching mapper state.
    pub fn resolve(
        &self,
        viewport: Viewport,
        geometry: &dyn GeometrySource,
    ) -> Option<ResolvedWindow> {
        self.window.resolve(geometry, viewport).ok()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/progress/mapper.rs"]
mod tests;
