//! Orbflow is a scroll-driven animation sequencing engine.
//!
//! It maps a continuous scroll position (or elapsed time, for triggered tweens) to a
//! deterministic, reversible sequence of visual states for animated element groups,
//! and hands a single travelling object off between controllers as the page scrolls
//! through its sections.
//!
//! # Pipeline overview
//!
//! 1. **Map**: `scroll + TriggerWindow -> progress` ([`ProgressMapper`]), re-measured live
//! 2. **Evaluate**: `progress -> VisualState` per element ([`Controller`]), over a phase
//!    table whose control points were frozen once at activation
//! 3. **Arbitrate**: at most one controller renders visibly ([`Coordinator`])
//! 4. **Write**: decorate, sanitize and push changed states to a [`RenderSink`] ([`Stage`])
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Never fails mid-scroll**: per-frame paths return values, not errors. Recoverable
//!   conditions surface as [`Fault`]s in the [`FrameReport`].
//! - **Pure evaluation**: [`Controller::compute_visual_state`] depends only on progress
//!   and the frozen geometry snapshot.
//! - **Platform at the edges**: geometry, scroll and rendering cross the boundary only
//!   through [`GeometrySource`], [`ScrollSource`] and [`RenderSink`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod controller;
mod foundation;
mod handoff;
mod platform;
mod progress;
mod scene;

/// Page-facing contract of the waitlist signup endpoint.
pub mod waitlist;

pub use animation::curve::{
    CONTINUITY_EPSILON, CompositePath, Orbit, PathCurve, ScalarCurve, evaluate_composite,
    evaluate_cubic,
};
pub use animation::decor::{Breathe, Drift, LoopLayer};
pub use animation::ease::Ease;
pub use controller::machine::{
    Activation, Controller, ControllerDef, ControllerState, Driver, ElementDef, ElementStates,
    FrameEnv,
};
pub use controller::phase::{
    Axis, Located, Measure, PathSpec, Phase, PhaseDef, PhaseTable, PointSpec, Sample,
    ScalarCurveSpec, ScalarSpec, validate_ranges,
};
pub use controller::resolve::Space;
pub use foundation::core::{ElementId, ElementRect, Point, Vec2, Viewport, VisualState};
pub use foundation::error::{Fault, OrbflowError, OrbflowResult};
pub use handoff::coordinator::{
    Arbitration, Coordinator, CoordinatorConfig, Handoff, Rendered, TieBreak, arbitrate,
};
pub use kurbo::CubicBez;
pub use platform::memory::{FixedScroll, RecordingSink, StaticLayout};
pub use platform::{GeometrySource, RenderSink, ScrollSource};
pub use progress::mapper::{
    Anchor, AnchorTarget, Edge, ProgressMapper, ResolvedWindow, TriggerWindow, Unmeasurable,
    normalized_progress,
};
pub use scene::model::{Scene, SceneDef};
pub use scene::scheduler::{FrameScheduler, FrameTicket, SchedulerConfig};
pub use scene::stage::{FrameReport, Stage};
