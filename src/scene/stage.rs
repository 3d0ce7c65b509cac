//! The thin adapter between a scene and the page: input events in, sink writes out.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::controller::machine::FrameEnv;
use crate::foundation::core::{ElementId, VisualState};
use crate::foundation::error::{Fault, OrbflowResult};
use crate::handoff::coordinator::{Coordinator, Handoff};
use crate::platform::{GeometrySource, RenderSink, ScrollSource};
use crate::scene::model::Scene;
use crate::scene::scheduler::FrameScheduler;

/// What happened during one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Frame sequence number.
    pub frame: u64,
    /// Scroll offset the frame was evaluated at.
    pub scroll: f64,
    /// Controller allowed to render visibly.
    pub winner: Option<String>,
    /// Set when visibility moved to another controller.
    pub handoff: Option<Handoff>,
    /// Geometry was re-measured in this frame.
    pub revalidated: bool,
    /// Recoverable conditions met in this frame.
    pub faults: Vec<Fault>,
    /// Number of sink writes issued.
    pub writes: usize,
    /// Final per-element states, in section order.
    pub states: Vec<(ElementId, VisualState)>,
}

/// Mounted scene driving a render sink.
#[derive(Debug, Clone)]
pub struct Stage {
    coordinator: Coordinator,
    scheduler: FrameScheduler,
    mounted_at_ms: Option<f64>,
    resize_pending: bool,
    written: BTreeMap<ElementId, VisualState>,
}

impl Stage {
    /// Build an unmounted stage for `scene`.
    pub fn new(scene: &Scene) -> OrbflowResult<Self> {
        Ok(Self {
            coordinator: scene.coordinator()?,
            scheduler: FrameScheduler::new(scene.def().scheduler),
            mounted_at_ms: None,
            resize_pending: false,
            written: BTreeMap::new(),
        })
    }

    /// The coordinator and its controllers.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Whether the stage is mounted and not yet torn down.
    pub fn is_live(&self) -> bool {
        self.mounted_at_ms.is_some() && self.scheduler.is_alive()
    }

    /// Start listening: arm the delayed revalidation and schedule the first frame.
    pub fn mount(&mut self, now_ms: f64) {
        if !self.scheduler.is_alive() || self.mounted_at_ms.is_some() {
            return;
        }
        tracing::debug!(now_ms, "stage mounted");
        self.mounted_at_ms = Some(now_ms);
        self.scheduler.arm_revalidation(now_ms);
        self.scheduler.request();
    }

    /// A scroll event arrived. Returns `true` if it scheduled a new frame.
    pub fn on_scroll(&mut self) -> bool {
        self.is_live() && self.scheduler.request()
    }

    /// A resize event arrived: the next frame re-measures geometry.
    pub fn on_resize(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        self.resize_pending = true;
        self.scheduler.request()
    }

    /// Run the pending frame, if any.
    ///
    /// Controllers are evaluated in section order, arbitrated, decorated, sanitized
    /// and written. Only states that changed since the previous write reach the sink.
    /// Returns `None` when nothing was scheduled or the stage is torn down.
    #[tracing::instrument(level = "trace", skip(self, scroll, geometry, sink))]
    pub fn on_frame(
        &mut self,
        now_ms: f64,
        scroll: &dyn ScrollSource,
        geometry: &dyn GeometrySource,
        sink: &mut dyn RenderSink,
    ) -> Option<FrameReport> {
        let mounted_at = self.mounted_at_ms?;
        let ticket = self.scheduler.begin_frame(now_ms)?;
        let env = FrameEnv {
            scroll: scroll.scroll_offset(),
            viewport: scroll.viewport(),
            now_ms,
            geometry,
        };
        let mut faults = Vec::new();

        let revalidated = ticket.revalidate || self.resize_pending;
        if revalidated {
            tracing::debug!(resize = self.resize_pending, "revalidating geometry");
            self.coordinator.refresh_geometry(&env, &mut faults);
            self.resize_pending = false;
        }

        let handoff = self.coordinator.step(&env, &mut faults).handoff.clone();

        let time_s = (now_ms - mounted_at).max(0.0) / 1000.0;
        let controllers = self.coordinator.controllers();
        let mut decor_running = false;
        let mut states = Vec::with_capacity(self.coordinator.rendered().len());
        let mut writes = 0;
        for r in self.coordinator.rendered() {
            let el = &controllers[r.controller].def().elements[r.element];
            let mut state = r.state;
            if let Some(decor) = &el.decor {
                state = decor.apply(state, time_s);
                decor_running |= state.is_visible();
            }
            let state = state.sanitized(el.idle);
            if self.written.get(&r.id) != Some(&state) {
                sink.set_visual_state(&r.id, state);
                self.written.insert(r.id.clone(), state);
                writes += 1;
            }
            states.push((r.id.clone(), state));
        }

        if decor_running || self.coordinator.in_flight() {
            self.scheduler.request();
        }

        let report = FrameReport {
            frame: ticket.index,
            scroll: env.scroll,
            winner: self.coordinator.winner_name().map(str::to_owned),
            handoff,
            revalidated,
            faults,
            writes,
            states,
        };
        tracing::trace!(frame = report.frame, writes, "frame done");
        Some(report)
    }

    /// Teardown: cancel pending frames and refuse all later events.
    pub fn unmount(&mut self) {
        tracing::debug!("stage unmounted");
        self.scheduler.cancel();
        self.resize_pending = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stage.rs"]
mod tests;
