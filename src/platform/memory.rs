//! In-memory geometry, scroll and sink implementations for headless runs and tests.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::{ElementId, ElementRect, Viewport, VisualState};
use crate::foundation::error::{OrbflowError, OrbflowResult};
use crate::platform::{GeometrySource, RenderSink, ScrollSource};

/// Fixed layout snapshot, for headless sampling and tests.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StaticLayout {
    /// Element rects in document coordinates.
    #[serde(default)]
    pub elements: BTreeMap<ElementId, ElementRect>,
    /// Total document height.
    #[serde(default)]
    pub document_height: Option<f64>,
}

impl StaticLayout {
    /// Empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, id: impl Into<ElementId>, rect: ElementRect) -> Self {
        self.elements.insert(id.into(), rect);
        self
    }

    /// Builder-style document height.
    pub fn with_document_height(mut self, height: f64) -> Self {
        self.document_height = Some(height);
        self
    }

    /// Insert or move an element.
    pub fn insert(&mut self, id: impl Into<ElementId>, rect: ElementRect) {
        self.elements.insert(id.into(), rect);
    }

    /// Unmount an element.
    pub fn remove(&mut self, id: &ElementId) -> Option<ElementRect> {
        self.elements.remove(id)
    }

    /// Parse a layout from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> OrbflowResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| OrbflowError::validation(format!("parse layout JSON: {e}")))
    }

    /// Parse a layout from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> OrbflowResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OrbflowError::validation(format!("open layout JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

impl GeometrySource for StaticLayout {
    fn measure(&self, element: &ElementId) -> Option<ElementRect> {
        self.elements.get(element).copied().filter(|r| r.is_finite())
    }

    fn document_height(&self) -> Option<f64> {
        self.document_height.filter(|h| h.is_finite())
    }
}

/// Sink that keeps the last state written per element.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    states: BTreeMap<ElementId, VisualState>,
    writes: u64,
}

impl RecordingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last state written for `element`.
    pub fn get(&self, element: &ElementId) -> Option<VisualState> {
        self.states.get(element).copied()
    }

    /// All last-written states, ordered by element id.
    pub fn states(&self) -> &BTreeMap<ElementId, VisualState> {
        &self.states
    }

    /// Elements whose last state is visible.
    pub fn visible(&self) -> Vec<&ElementId> {
        self.states
            .iter()
            .filter(|(_, s)| s.is_visible())
            .map(|(id, _)| id)
            .collect()
    }

    /// Total number of writes received.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl RenderSink for RecordingSink {
    fn set_visual_state(&mut self, element: &ElementId, state: VisualState) {
        self.writes += 1;
        self.states.insert(element.clone(), state);
    }
}

/// Scroll source with a settable offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedScroll {
    /// Current scroll offset.
    pub offset: f64,
    /// Current viewport.
    pub viewport: Viewport,
}

impl FixedScroll {
    /// Scroll source at `offset`.
    pub fn new(offset: f64, viewport: Viewport) -> Self {
        Self { offset, viewport }
    }
}

impl ScrollSource for FixedScroll {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
#[path = "../../tests/unit/platform/memory.rs"]
mod tests;
