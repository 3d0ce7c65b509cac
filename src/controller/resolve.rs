//! Freezing declarative specs against live geometry.

use kurbo::CubicBez;

use crate::animation::curve::{CompositePath, Orbit, PathCurve, ScalarCurve};
use crate::controller::phase::{
    Axis, Measure, Phase, PhaseDef, PhaseTable, PathSpec, PointSpec, ScalarCurveSpec, ScalarSpec,
};
use crate::foundation::core::{ElementId, ElementRect, Point, Vec2, Viewport};
use crate::foundation::error::{Fault, OrbflowResult};
use crate::platform::GeometrySource;

/// Coordinate space an element is positioned in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    /// Absolutely positioned within the document; scrolls with content.
    #[default]
    Document,
    /// Fixed to the viewport.
    Viewport,
}

/// Measurement context for one geometry capture.
pub(crate) struct ResolveCtx<'a> {
    pub(crate) controller: &'a str,
    pub(crate) geometry: &'a dyn GeometrySource,
    pub(crate) viewport: Viewport,
    pub(crate) space: Space,
    pub(crate) capture_scroll: f64,
    origin: Point,
    faults: Vec<Fault>,
}

impl<'a> ResolveCtx<'a> {
    pub(crate) fn new(
        controller: &'a str,
        geometry: &'a dyn GeometrySource,
        viewport: Viewport,
        space: Space,
        capture_scroll: f64,
    ) -> Self {
        Self {
            controller,
            geometry,
            viewport,
            space,
            capture_scroll,
            origin: Point::ORIGIN,
            faults: Vec::new(),
        }
    }

    /// Resolve the controller origin; later `Fixed` points are relative to it.
    pub(crate) fn set_origin(&mut self, origin: &PointSpec) {
        self.origin = Point::ORIGIN;
        self.origin = self.point(origin);
    }

    /// The resolved origin, in this context's space.
    pub(crate) fn origin(&self) -> Point {
        self.origin
    }

    pub(crate) fn into_faults(self) -> Vec<Fault> {
        self.faults
    }

    fn measure(&mut self, id: &ElementId) -> Option<ElementRect> {
        let rect = self.geometry.measure(id);
        if rect.is_none() {
            let fault = Fault::MissingAnchor {
                controller: self.controller.to_owned(),
                anchor: id.clone(),
            };
            if !self.faults.contains(&fault) {
                self.faults.push(fault);
            }
        }
        rect
    }

    /// Scroll-space y of a document-space y.
    fn from_document_y(&self, y: f64) -> f64 {
        match self.space {
            Space::Document => y,
            Space::Viewport => y - self.capture_scroll,
        }
    }

    /// Space point of a viewport-relative point.
    fn from_viewport(&self, p: Point) -> Point {
        match self.space {
            Space::Document => Point::new(p.x, p.y + self.capture_scroll),
            Space::Viewport => p,
        }
    }

    /// Resolve a point in the controller's space.
    pub(crate) fn point(&mut self, spec: &PointSpec) -> Point {
        match spec {
            PointSpec::Fixed { x, y } => self.origin + Vec2::new(*x, *y),
            PointSpec::Viewport { fx, fy } => self.from_viewport(self.viewport.point_at(*fx, *fy)),
            PointSpec::Anchor {
                anchor,
                fx,
                fy,
                dx,
                dy,
                fallback,
            } => match self.measure(anchor) {
                Some(rect) => {
                    let p = rect.point_at(*fx, *fy);
                    Point::new(p.x + dx, self.from_document_y(p.y) + dy)
                }
                None => match fallback {
                    Some(f) => self.point(f),
                    None => self.from_viewport(self.viewport.center()),
                },
            },
            PointSpec::Between { from, to, tx, ty } => {
                let a = self.point(from);
                let b = self.point(to);
                Point::new(a.x + (b.x - a.x) * tx, a.y + (b.y - a.y) * ty)
            }
            PointSpec::Offset {
                base,
                dx,
                dy,
                vx,
                vy,
            } => {
                let b = self.point(base);
                Point::new(
                    b.x + dx + vx * self.viewport.width,
                    b.y + dy + vy * self.viewport.height,
                )
            }
        }
    }

    /// Resolve a point as an offset from the origin.
    pub(crate) fn offset(&mut self, spec: &PointSpec) -> Point {
        (self.point(spec) - self.origin).to_point()
    }

    fn scalar(&mut self, spec: &ScalarSpec) -> f64 {
        match spec {
            ScalarSpec::Literal(v) => *v,
            ScalarSpec::Measured(Measure::AnchorExtent {
                anchor,
                axis,
                factor,
                fallback,
            }) => match self.measure(anchor) {
                Some(r) => factor * extent(*axis, r.width, r.height),
                None => *fallback,
            },
            ScalarSpec::Measured(Measure::ViewportExtent { axis, factor }) => {
                factor * extent(*axis, self.viewport.width, self.viewport.height)
            }
        }
    }

    pub(crate) fn scalar_curve(&mut self, spec: &ScalarCurveSpec) -> ScalarCurve {
        match spec {
            ScalarCurveSpec::Hold(v) => ScalarCurve::Hold(self.scalar(v)),
            ScalarCurveSpec::Linear { from, to } => ScalarCurve::Linear {
                from: self.scalar(from),
                to: self.scalar(to),
            },
            ScalarCurveSpec::Geometric { from, to } => ScalarCurve::Geometric {
                from: self.scalar(from),
                to: self.scalar(to),
            },
            ScalarCurveSpec::Cubic { p0, p1, p2, p3 } => ScalarCurve::Cubic {
                p0: self.scalar(p0),
                p1: self.scalar(p1),
                p2: self.scalar(p2),
                p3: self.scalar(p3),
            },
            ScalarCurveSpec::Wave {
                base,
                amplitude,
                cycles,
                phase,
            } => ScalarCurve::Wave {
                base: self.scalar(base),
                amplitude: *amplitude,
                cycles: *cycles,
                phase: *phase,
            },
        }
    }

    pub(crate) fn path(&mut self, spec: &PathSpec) -> OrbflowResult<PathCurve> {
        Ok(match spec {
            PathSpec::Hold(p) => PathCurve::Hold(self.offset(p)),
            PathSpec::Line { from, to } => PathCurve::Line {
                from: self.offset(from),
                to: self.offset(to),
            },
            PathSpec::Cubic { p0, p1, p2, p3 } => PathCurve::Cubic(CubicBez::new(
                self.offset(p0),
                self.offset(p1),
                self.offset(p2),
                self.offset(p3),
            )),
            PathSpec::Composite {
                points,
                steps_per_segment,
            } => {
                let pts: Vec<Point> = points.iter().map(|p| self.offset(p)).collect();
                PathCurve::Composite(CompositePath::from_points(&pts, *steps_per_segment)?)
            }
            PathSpec::Orbit {
                center,
                radius,
                angle,
                squash,
            } => PathCurve::Orbit(Box::new(Orbit {
                center: self.path(center)?,
                radius: self.scalar_curve(radius),
                angle: self.scalar_curve(angle),
                squash: *squash,
            })),
        })
    }

    pub(crate) fn phase(&mut self, def: &PhaseDef) -> OrbflowResult<Phase> {
        Ok(Phase {
            start: def.start,
            end: def.end,
            position: self.path(&def.position)?,
            scale: self.scalar_curve(&def.scale),
            opacity: self.scalar_curve(&def.opacity),
            ease: def.ease,
            pinned: def.pinned,
        })
    }

    pub(crate) fn table(&mut self, defs: &[PhaseDef]) -> OrbflowResult<PhaseTable> {
        let phases = defs
            .iter()
            .map(|d| self.phase(d))
            .collect::<OrbflowResult<Vec<_>>>()?;
        PhaseTable::new(phases)
    }
}

fn extent(axis: Axis, width: f64, height: f64) -> f64 {
    match axis {
        Axis::Width => width,
        Axis::Height => height,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controller/resolve.rs"]
mod tests;
