//! The per-group animation controller.

use smallvec::SmallVec;

use crate::animation::decor::LoopLayer;
use crate::controller::phase::{Located, PhaseDef, PhaseTable, PointSpec, validate_ranges};
use crate::controller::resolve::{ResolveCtx, Space};
use crate::foundation::core::{ElementId, Point, Vec2, Viewport, VisualState};
use crate::foundation::error::{Fault, OrbflowError, OrbflowResult};
use crate::foundation::math::clamp01;
use crate::platform::GeometrySource;
use crate::progress::mapper::{ProgressMapper, ResolvedWindow, TriggerWindow, Unmeasurable};

/// How a controller takes part in a handoff chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Activates only while the preceding controller rests.
    #[default]
    Chained,
    /// Activates on its own progress alone.
    Independent,
}

/// What drives a controller's progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// Progress follows the trigger window directly.
    #[default]
    Scroll,
    /// The window only triggers; progress then follows elapsed time.
    Timed {
        /// Tween length in milliseconds.
        duration_ms: f64,
    },
}

/// One animated element owned by a controller.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementDef {
    /// Render target.
    pub id: ElementId,
    /// State written while the controller is hidden.
    #[serde(default)]
    pub idle: VisualState,
    /// Phase table.
    pub phases: Vec<PhaseDef>,
    /// Decorative loop layered on top.
    #[serde(default)]
    pub decor: Option<LoopLayer>,
}

impl ElementDef {
    /// Element with a hidden idle state and no decor.
    pub fn new(id: impl Into<ElementId>, phases: Vec<PhaseDef>) -> Self {
        Self {
            id: id.into(),
            idle: VisualState::HIDDEN,
            phases,
            decor: None,
        }
    }

    /// Builder-style decorative loop.
    pub fn with_decor(mut self, decor: LoopLayer) -> Self {
        self.decor = Some(decor);
        self
    }
}

/// Declarative controller.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ControllerDef {
    /// Unique name, used in logs and faults.
    pub name: String,
    /// Scroll range mapped to progress.
    pub window: TriggerWindow,
    /// Natural position of the elements; offsets are measured from here.
    #[serde(default = "default_origin")]
    pub origin: PointSpec,
    /// Positioning space.
    #[serde(default)]
    pub space: Space,
    /// Participation in the handoff chain.
    #[serde(default)]
    pub activation: Activation,
    /// Explicit arbitration priority; higher wins.
    #[serde(default)]
    pub priority: i32,
    /// Progress at which the controller rests.
    #[serde(default = "default_rest_at")]
    pub rest_at: f64,
    /// Progress source.
    #[serde(default)]
    pub driver: Driver,
    /// Animated elements.
    pub elements: Vec<ElementDef>,
}

fn default_origin() -> PointSpec {
    PointSpec::fixed(0.0, 0.0)
}

fn default_rest_at() -> f64 {
    1.0
}

impl ControllerDef {
    /// Scroll-driven, chained controller with default origin.
    pub fn new(name: impl Into<String>, window: TriggerWindow, elements: Vec<ElementDef>) -> Self {
        Self {
            name: name.into(),
            window,
            origin: default_origin(),
            space: Space::Document,
            activation: Activation::Chained,
            priority: 0,
            rest_at: 1.0,
            driver: Driver::Scroll,
            elements,
        }
    }

    /// Check every invariant a controller relies on.
    pub fn validate(&self) -> OrbflowResult<()> {
        let ctx = |e: OrbflowError| {
            OrbflowError::validation(format!("controller '{}': {e}", self.name))
        };
        if self.name.trim().is_empty() {
            return Err(OrbflowError::validation("controller name must be non-empty"));
        }
        self.window.validate().map_err(ctx)?;
        self.origin.validate().map_err(ctx)?;
        if !(self.rest_at.is_finite() && self.rest_at > 0.0 && self.rest_at <= 1.0) {
            return Err(ctx(OrbflowError::validation("rest_at must be in (0, 1]")));
        }
        if let Driver::Timed { duration_ms } = self.driver
            && !(duration_ms.is_finite() && duration_ms > 0.0)
        {
            return Err(ctx(OrbflowError::validation("timed duration_ms must be > 0")));
        }
        if self.elements.is_empty() {
            return Err(ctx(OrbflowError::validation("at least one element is required")));
        }
        for el in &self.elements {
            let ctx = |e: OrbflowError| {
                OrbflowError::validation(format!(
                    "controller '{}', element '{}': {e}",
                    self.name, el.id
                ))
            };
            if el.id.as_str().trim().is_empty() {
                return Err(ctx(OrbflowError::validation("element id must be non-empty")));
            }
            if !el.idle.is_finite() {
                return Err(ctx(OrbflowError::validation("idle state must be finite")));
            }
            validate_ranges(el.phases.iter().map(|p| (p.start, p.end))).map_err(ctx)?;
            for ph in &el.phases {
                ph.validate().map_err(ctx)?;
            }
            if let Some(decor) = &el.decor {
                decor.validate().map_err(ctx)?;
            }
        }
        Ok(())
    }
}

/// Controller lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// Progress is 0.
    #[default]
    Hidden,
    /// Capturing geometry on the rising edge.
    Entering,
    /// Inside (or holding after) the given phase of the lead element.
    Active {
        /// Phase index.
        phase: usize,
    },
    /// At or beyond the rest threshold.
    Resting,
}

/// Everything a controller reads during one frame.
#[derive(Clone, Copy)]
pub struct FrameEnv<'a> {
    /// Current scroll offset.
    pub scroll: f64,
    /// Current viewport.
    pub viewport: Viewport,
    /// Wall-clock time in milliseconds.
    pub now_ms: f64,
    /// Live layout.
    pub geometry: &'a dyn GeometrySource,
}

impl std::fmt::Debug for FrameEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameEnv")
            .field("scroll", &self.scroll)
            .field("viewport", &self.viewport)
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}

/// Geometry frozen at activation.
#[derive(Clone, Debug, PartialEq)]
struct Snapshot {
    capture_scroll: f64,
    origin: Point,
    window: Option<ResolvedWindow>,
    tables: Vec<Option<PhaseTable>>,
}

/// Element states produced by one update, in element order.
pub type ElementStates = SmallVec<[(ElementId, VisualState); 2]>;

/// Stateful owner of one element group's visual-state computation.
#[derive(Clone, Debug)]
pub struct Controller {
    def: ControllerDef,
    mapper: ProgressMapper,
    state: ControllerState,
    entered: bool,
    resting: bool,
    predecessor_resting: bool,
    progress: f64,
    snapshot: Option<Snapshot>,
    timer_start_ms: Option<f64>,
    window_missing: bool,
    captures: u64,
    states: ElementStates,
}

impl Controller {
    /// Validate `def` and build a hidden controller.
    pub fn new(def: ControllerDef) -> OrbflowResult<Self> {
        def.validate()?;
        let states = def.elements.iter().map(|e| (e.id.clone(), e.idle)).collect();
        Ok(Self {
            mapper: ProgressMapper::new(def.window.clone()),
            def,
            state: ControllerState::Hidden,
            entered: false,
            resting: false,
            predecessor_resting: true,
            progress: 0.0,
            snapshot: None,
            timer_start_ms: None,
            window_missing: false,
            captures: 0,
            states,
        })
    }

    /// Definition this controller was built from.
    pub fn def(&self) -> &ControllerDef {
        &self.def
    }

    /// Controller name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Whether progress has left 0 since the last reset.
    pub fn is_entered(&self) -> bool {
        self.entered
    }

    /// Whether the rest threshold has been reached.
    pub fn is_resting(&self) -> bool {
        self.resting
    }

    /// Progress applied by the latest update.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Number of geometry captures so far.
    pub fn captures(&self) -> u64 {
        self.captures
    }

    /// States from the latest update.
    pub fn states(&self) -> &ElementStates {
        &self.states
    }

    /// Whether any element is currently visible.
    pub fn claims_visibility(&self) -> bool {
        self.states.iter().any(|(_, s)| s.is_visible())
    }

    /// Whether a timed tween is mid-flight and needs further frames.
    pub fn in_flight(&self) -> bool {
        matches!(self.def.driver, Driver::Timed { .. })
            && self.timer_start_ms.is_some()
            && !self.resting
    }

    /// Iterate the declared phase ranges of every element.
    pub fn phase_ranges(&self) -> impl Iterator<Item = (&ElementId, f64, f64)> + '_ {
        self.def
            .elements
            .iter()
            .flat_map(|e| e.phases.iter().map(move |p| (&e.id, p.start, p.end)))
    }

    /// Message from the coordinator: may this controller activate?
    pub fn notify_predecessor_resting(&mut self, resting: bool) {
        if self.predecessor_resting != resting {
            tracing::trace!(controller = %self.def.name, resting, "predecessor resting changed");
        }
        self.predecessor_resting = resting;
    }

    /// Whether the controller is currently allowed to activate.
    pub fn is_eligible(&self) -> bool {
        match self.def.activation {
            Activation::Independent => true,
            Activation::Chained => self.predecessor_resting,
        }
    }

    /// Map the environment to this frame's progress, honouring the driver and
    /// activation eligibility. A missing window anchor holds the last value and is
    /// reported once per outage.
    pub fn map_progress(&mut self, env: &FrameEnv<'_>, faults: &mut Vec<Fault>) -> f64 {
        let window_p = self.mapper.map(env.scroll, env.viewport, env.geometry);
        match self.mapper.missing() {
            Some(Unmeasurable(id)) if !self.window_missing => {
                self.window_missing = true;
                let fault = Fault::MissingAnchor {
                    controller: self.def.name.clone(),
                    anchor: id.clone().unwrap_or_else(|| ElementId::new("<document>")),
                };
                tracing::warn!(%fault, "holding last progress");
                faults.push(fault);
            }
            Some(_) => {}
            None => self.window_missing = false,
        }

        if !self.is_eligible() {
            return 0.0;
        }
        match self.def.driver {
            Driver::Scroll => window_p,
            Driver::Timed { duration_ms } => {
                if window_p <= 0.0 {
                    return 0.0;
                }
                let start = *self.timer_start_ms.get_or_insert(env.now_ms);
                let elapsed = (env.now_ms - start).max(0.0);
                clamp01(elapsed / duration_ms).max(f64::EPSILON)
            }
        }
    }

    /// Apply `progress`: flip entry/rest flags, capture or discard geometry, select
    /// the phase and compute every element state.
    pub fn update(
        &mut self,
        progress: f64,
        env: &FrameEnv<'_>,
        faults: &mut Vec<Fault>,
    ) -> &ElementStates {
        let p = clamp01(progress);
        self.progress = p;

        if p <= 0.0 {
            if self.entered {
                self.reset();
            }
            return &self.states;
        }

        if !self.entered {
            self.entered = true;
            self.state = ControllerState::Entering;
            tracing::debug!(controller = %self.def.name, progress = p, "entering");
            self.on_first_activation(env, faults);
        }

        let was_resting = self.resting;
        self.resting = p >= self.def.rest_at;
        if self.resting != was_resting {
            tracing::debug!(controller = %self.def.name, resting = self.resting, "resting changed");
        }

        self.states = self.compute_visual_state(p);
        self.state = if self.resting {
            ControllerState::Resting
        } else {
            ControllerState::Active {
                phase: self.lead_phase(p).map_or(0, |at| at.index),
            }
        };
        &self.states
    }

    /// Pure function of progress and the frozen snapshot.
    ///
    /// Before the first capture (or at progress 0) every element is at its idle state.
    pub fn compute_visual_state(&self, progress: f64) -> ElementStates {
        let p = clamp01(progress);
        let Some(snap) = self.snapshot.as_ref().filter(|_| p > 0.0) else {
            return self.idle_states();
        };
        let resting = p >= self.def.rest_at;
        self.def
            .elements
            .iter()
            .zip(&snap.tables)
            .map(|(el, table)| {
                let Some(table) = table else {
                    return (el.id.clone(), el.idle);
                };
                let (at, s) = if resting {
                    table.end_sample()
                } else {
                    table.sample(p)
                };
                let mut offset = s.position.to_vec2();
                if self.def.space == Space::Viewport
                    && table.phases()[at.index].pinned
                    && let Some(w) = snap.window.filter(|_| self.def.driver == Driver::Scroll)
                {
                    let scroll = w.scroll_at(if resting { 1.0 } else { p });
                    offset -= Vec2::new(0.0, scroll - snap.capture_scroll);
                }
                let state = VisualState::new(offset, s.scale, s.opacity).sanitized(el.idle);
                (el.id.clone(), state)
            })
            .collect()
    }

    /// Measure anchors and freeze every control point. Missing anchors fall back to
    /// their declared fallback (or the viewport centre) and are reported.
    #[tracing::instrument(level = "debug", skip(self, env, faults), fields(controller = %self.def.name))]
    pub fn on_first_activation(&mut self, env: &FrameEnv<'_>, faults: &mut Vec<Fault>) {
        let snap = self.capture(env, env.scroll, faults);
        self.snapshot = Some(snap);
        self.captures += 1;
    }

    /// Re-measure an existing snapshot after a resize or the delayed revalidation.
    /// Reports `StaleGeometry` when the layout had moved.
    pub fn refresh_geometry(&mut self, env: &FrameEnv<'_>, faults: &mut Vec<Fault>) {
        let Some(old) = self.snapshot.as_ref() else {
            return;
        };
        let capture_scroll = old.capture_scroll;
        let mut scratch = Vec::new();
        let fresh = self.capture(env, capture_scroll, &mut scratch);
        if self.snapshot.as_ref() == Some(&fresh) {
            return;
        }
        for f in scratch {
            if !faults.contains(&f) {
                faults.push(f);
            }
        }
        let fault = Fault::StaleGeometry {
            controller: self.def.name.clone(),
        };
        tracing::warn!(%fault, "replacing geometry snapshot");
        faults.push(fault);
        self.snapshot = Some(fresh);
        self.captures += 1;
        if self.entered {
            self.states = self.compute_visual_state(self.progress);
        }
    }

    /// Document-space position of an element displaced by `offset` from the frozen
    /// origin, with the page scrolled to `scroll`. `None` before the first capture.
    pub fn document_position(&self, offset: Vec2, scroll: f64) -> Option<Point> {
        let snap = self.snapshot.as_ref()?;
        let p = snap.origin + offset;
        Some(match self.def.space {
            Space::Document => p,
            Space::Viewport => Point::new(p.x, p.y + scroll),
        })
    }

    /// Falling edge: back to hidden, snapshot and timer discarded.
    pub fn reset(&mut self) {
        tracing::debug!(controller = %self.def.name, "reset to hidden");
        self.entered = false;
        self.resting = false;
        self.progress = 0.0;
        self.snapshot = None;
        self.timer_start_ms = None;
        self.state = ControllerState::Hidden;
        self.states = self.idle_states();
    }

    fn capture(&self, env: &FrameEnv<'_>, capture_scroll: f64, faults: &mut Vec<Fault>) -> Snapshot {
        let mut ctx = ResolveCtx::new(
            &self.def.name,
            env.geometry,
            env.viewport,
            self.def.space,
            capture_scroll,
        );
        ctx.set_origin(&self.def.origin);
        let tables = self
            .def
            .elements
            .iter()
            .map(|el| match ctx.table(&el.phases) {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::warn!(controller = %self.def.name, element = %el.id, error = %e, "unusable geometry, holding idle state");
                    None
                }
            })
            .collect();
        let origin = ctx.origin();
        for f in ctx.into_faults() {
            tracing::warn!(fault = %f, "geometry fallback");
            faults.push(f);
        }
        Snapshot {
            capture_scroll,
            origin,
            window: self.mapper.resolve(env.viewport, env.geometry),
            tables,
        }
    }

    fn lead_phase(&self, p: f64) -> Option<Located> {
        let table = self.snapshot.as_ref()?.tables.first()?.as_ref()?;
        Some(table.locate(p))
    }

    fn idle_states(&self) -> ElementStates {
        self.def
            .elements
            .iter()
            .map(|e| (e.id.clone(), e.idle))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controller/machine.rs"]
mod tests;
