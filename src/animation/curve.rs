//! Curve evaluation: cubic Béziers, joined composites and scalar channel curves.
//!
//! Everything here is a pure function of a normalized parameter. Callers clamp
//! `t` to `[0, 1]` before evaluating.

use kurbo::{CubicBez, ParamCurve};
use smallvec::SmallVec;

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{OrbflowError, OrbflowResult};
use crate::foundation::math::{cubic_scalar, geometric, lerp};

/// Maximum distance between joined segment endpoints still treated as continuous.
pub const CONTINUITY_EPSILON: f64 = 1e-6;

/// Evaluate `B(t) = (1-t)³p0 + 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³p3`.
pub fn evaluate_cubic(t: f64, p0: Point, p1: Point, p2: Point, p3: Point) -> Point {
    CubicBez::new(p0, p1, p2, p3).eval(t)
}

/// Evaluate a chain of cubic segments, each owning an equal share of `[0, 1]`.
///
/// Continuity between segments is the caller's responsibility. An empty chain
/// evaluates to the origin.
pub fn evaluate_composite(t: f64, segments: &[CubicBez]) -> Point {
    let Some(last) = segments.len().checked_sub(1) else {
        return Point::ORIGIN;
    };
    let scaled = t * segments.len() as f64;
    let idx = (scaled.floor().max(0.0) as usize).min(last);
    let local = scaled - idx as f64;
    segments[idx].eval(local)
}

/// Joined cubic segments, optionally flattened into evenly spaced waypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositePath {
    segments: SmallVec<[CubicBez; 4]>,
    steps_per_segment: Option<u32>,
}

impl CompositePath {
    /// Build a composite path, checking that consecutive segments touch.
    ///
    /// With `steps_per_segment = Some(k)`, each segment is sampled at `k` evenly spaced
    /// parameters and the path runs straight between those waypoints.
    pub fn new(
        segments: impl IntoIterator<Item = CubicBez>,
        steps_per_segment: Option<u32>,
    ) -> OrbflowResult<Self> {
        let segments: SmallVec<[CubicBez; 4]> = segments.into_iter().collect();
        if segments.is_empty() {
            return Err(OrbflowError::animation(
                "composite path needs at least one segment",
            ));
        }
        if steps_per_segment == Some(0) {
            return Err(OrbflowError::animation(
                "composite path steps_per_segment must be > 0",
            ));
        }
        for (i, w) in segments.windows(2).enumerate() {
            let gap = w[0].p3.distance(w[1].p0);
            if gap.is_nan() || gap > CONTINUITY_EPSILON {
                return Err(OrbflowError::animation(format!(
                    "composite path is discontinuous between segments {i} and {} (gap {gap})",
                    i + 1
                )));
            }
        }
        Ok(Self {
            segments,
            steps_per_segment,
        })
    }

    /// Build from a flat point list `p0, c1, c2, p1, c1, c2, p2, ...` (3n+1 points).
    pub fn from_points(points: &[Point], steps_per_segment: Option<u32>) -> OrbflowResult<Self> {
        if points.len() < 4 || (points.len() - 1) % 3 != 0 {
            return Err(OrbflowError::animation(format!(
                "composite path needs 3n+1 points, got {}",
                points.len()
            )));
        }
        let segments = points
            .windows(4)
            .step_by(3)
            .map(|w| CubicBez::new(w[0], w[1], w[2], w[3]));
        Self::new(segments, steps_per_segment)
    }

    /// The underlying segments.
    pub fn segments(&self) -> &[CubicBez] {
        &self.segments
    }

    /// Evaluate at `t` in `[0, 1]`.
    pub fn eval(&self, t: f64) -> Point {
        match self.steps_per_segment {
            None => evaluate_composite(t, &self.segments),
            Some(steps) => {
                let steps = steps as usize;
                let total = steps * self.segments.len();
                let scaled = t * total as f64;
                let i = (scaled.floor().max(0.0) as usize).min(total - 1);
                let a = self.waypoint(i, steps);
                let b = self.waypoint(i + 1, steps);
                a.lerp(b, scaled - i as f64)
            }
        }
    }

    fn waypoint(&self, index: usize, steps: usize) -> Point {
        let seg = (index / steps).min(self.segments.len() - 1);
        let local = (index - seg * steps) as f64 / steps as f64;
        self.segments[seg].eval(local)
    }
}

/// Scalar channel curve (scale, opacity, orbit radius/angle).
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarCurve {
    /// Constant value.
    Hold(f64),
    /// Straight interpolation.
    Linear {
        /// Value at `t = 0`.
        from: f64,
        /// Value at `t = 1`.
        to: f64,
    },
    /// Exponential interpolation (`from · (to/from)^t`).
    Geometric {
        /// Value at `t = 0`.
        from: f64,
        /// Value at `t = 1`.
        to: f64,
    },
    /// 1-D cubic Bézier in Bernstein form.
    Cubic {
        /// Value at `t = 0`.
        p0: f64,
        /// First control value.
        p1: f64,
        /// Second control value.
        p2: f64,
        /// Value at `t = 1`.
        p3: f64,
    },
    /// `base + amplitude · sin(2π · cycles · t + phase)`.
    Wave {
        /// Centre value.
        base: f64,
        /// Peak deviation from `base`.
        amplitude: f64,
        /// Full periods across `[0, 1]`.
        cycles: f64,
        /// Phase offset in radians.
        phase: f64,
    },
}

impl ScalarCurve {
    /// Evaluate at `t`.
    pub fn eval(&self, t: f64) -> f64 {
        match *self {
            Self::Hold(v) => v,
            Self::Linear { from, to } => lerp(from, to, t),
            Self::Geometric { from, to } => geometric(from, to, t),
            Self::Cubic { p0, p1, p2, p3 } => cubic_scalar(t, p0, p1, p2, p3),
            Self::Wave {
                base,
                amplitude,
                cycles,
                phase,
            } => base + amplitude * (std::f64::consts::TAU * cycles * t + phase).sin(),
        }
    }
}

/// Elliptical motion around a moving centre.
#[derive(Clone, Debug, PartialEq)]
pub struct Orbit {
    /// Path followed by the orbit centre.
    pub center: PathCurve,
    /// Orbit radius over `t`.
    pub radius: ScalarCurve,
    /// Angle in radians over `t`.
    pub angle: ScalarCurve,
    /// Vertical radius factor (1 = circle).
    pub squash: f64,
}

/// Position curve in offset space.
#[derive(Clone, Debug, PartialEq)]
pub enum PathCurve {
    /// Stationary point.
    Hold(Point),
    /// Straight segment.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
    },
    /// Single cubic Bézier.
    Cubic(CubicBez),
    /// Joined cubic segments.
    Composite(CompositePath),
    /// Ellipse around a moving centre.
    Orbit(Box<Orbit>),
}

impl PathCurve {
    /// Evaluate at `t`.
    pub fn eval(&self, t: f64) -> Point {
        match self {
            Self::Hold(p) => *p,
            Self::Line { from, to } => from.lerp(*to, t),
            Self::Cubic(c) => c.eval(t),
            Self::Composite(c) => c.eval(t),
            Self::Orbit(o) => {
                let c = o.center.eval(t);
                let r = o.radius.eval(t);
                let a = o.angle.eval(t);
                c + Vec2::new(r * a.cos(), r * a.sin() * o.squash)
            }
        }
    }

    /// Start point of the path.
    pub fn start(&self) -> Point {
        self.eval(0.0)
    }

    /// End point of the path.
    pub fn end(&self) -> Point {
        self.eval(1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
