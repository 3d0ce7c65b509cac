//! Phase tables: declarative definitions and their resolved, geometry-frozen form.

use crate::animation::curve::{PathCurve, ScalarCurve};
use crate::animation::ease::Ease;
use crate::foundation::core::{ElementId, Point};
use crate::foundation::error::{OrbflowError, OrbflowResult};

/// A 2D point declared relative to live layout, resolved once per activation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSpec {
    /// Literal offset from the controller origin.
    Fixed {
        /// Horizontal offset.
        x: f64,
        /// Vertical offset.
        y: f64,
    },
    /// Fraction of the viewport.
    Viewport {
        /// Horizontal fraction.
        fx: f64,
        /// Vertical fraction.
        fy: f64,
    },
    /// Fraction of a measured element's box, plus a pixel nudge.
    Anchor {
        /// Measured element.
        anchor: ElementId,
        /// Horizontal fraction of the box (0.5 = centre).
        #[serde(default = "half")]
        fx: f64,
        /// Vertical fraction of the box (0.5 = centre).
        #[serde(default = "half")]
        fy: f64,
        /// Horizontal nudge in pixels.
        #[serde(default)]
        dx: f64,
        /// Vertical nudge in pixels.
        #[serde(default)]
        dy: f64,
        /// Used when the anchor cannot be measured. Defaults to the viewport centre.
        #[serde(default)]
        fallback: Option<Box<PointSpec>>,
    },
    /// Per-axis interpolation between two points.
    Between {
        /// Point at `t = 0`.
        from: Box<PointSpec>,
        /// Point at `t = 1`.
        to: Box<PointSpec>,
        /// Horizontal blend.
        #[serde(default = "half")]
        tx: f64,
        /// Vertical blend.
        #[serde(default = "half")]
        ty: f64,
    },
    /// Another point moved by pixels and viewport fractions.
    Offset {
        /// Point being moved.
        base: Box<PointSpec>,
        /// Horizontal pixels.
        #[serde(default)]
        dx: f64,
        /// Vertical pixels.
        #[serde(default)]
        dy: f64,
        /// Horizontal viewport fraction.
        #[serde(default)]
        vx: f64,
        /// Vertical viewport fraction.
        #[serde(default)]
        vy: f64,
    },
}

fn half() -> f64 {
    0.5
}

impl PointSpec {
    /// Literal offset.
    pub fn fixed(x: f64, y: f64) -> Self {
        Self::Fixed { x, y }
    }

    /// Centre of `anchor`, falling back to the viewport centre.
    pub fn anchor(anchor: impl Into<ElementId>) -> Self {
        Self::Anchor {
            anchor: anchor.into(),
            fx: 0.5,
            fy: 0.5,
            dx: 0.0,
            dy: 0.0,
            fallback: None,
        }
    }

    pub(crate) fn validate(&self) -> OrbflowResult<()> {
        let finite = |vals: &[f64]| vals.iter().all(|v| v.is_finite());
        let ok = match self {
            Self::Fixed { x, y } => finite(&[*x, *y]),
            Self::Viewport { fx, fy } => finite(&[*fx, *fy]),
            Self::Anchor {
                anchor,
                fx,
                fy,
                dx,
                dy,
                fallback,
            } => {
                if anchor.as_str().trim().is_empty() {
                    return Err(OrbflowError::validation(
                        "point anchor id must be non-empty",
                    ));
                }
                if let Some(f) = fallback {
                    f.validate()?;
                }
                finite(&[*fx, *fy, *dx, *dy])
            }
            Self::Between { from, to, tx, ty } => {
                from.validate()?;
                to.validate()?;
                finite(&[*tx, *ty])
            }
            Self::Offset {
                base,
                dx,
                dy,
                vx,
                vy,
            } => {
                base.validate()?;
                finite(&[*dx, *dy, *vx, *vy])
            }
        };
        if ok {
            Ok(())
        } else {
            Err(OrbflowError::validation("point literals must be finite"))
        }
    }
}

/// Axis of a measured extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Horizontal.
    Width,
    /// Vertical.
    Height,
}

/// A scalar measured from layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// `factor × extent` of an element, or `fallback` when unmeasurable.
    AnchorExtent {
        /// Measured element.
        anchor: ElementId,
        /// Measured axis.
        axis: Axis,
        /// Multiplier.
        #[serde(default = "one")]
        factor: f64,
        /// Value used when the element cannot be measured.
        fallback: f64,
    },
    /// `factor × extent` of the viewport.
    ViewportExtent {
        /// Measured axis.
        axis: Axis,
        /// Multiplier.
        #[serde(default = "one")]
        factor: f64,
    },
}

fn one() -> f64 {
    1.0
}

/// A scalar control value: a literal, or something measured at activation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ScalarSpec {
    /// Literal value.
    Literal(f64),
    /// Measured value.
    Measured(Measure),
}

impl From<f64> for ScalarSpec {
    fn from(v: f64) -> Self {
        Self::Literal(v)
    }
}

impl ScalarSpec {
    fn validate(&self) -> OrbflowResult<()> {
        let ok = match self {
            Self::Literal(v) => v.is_finite(),
            Self::Measured(Measure::AnchorExtent {
                anchor,
                factor,
                fallback,
                ..
            }) => !anchor.as_str().trim().is_empty() && factor.is_finite() && fallback.is_finite(),
            Self::Measured(Measure::ViewportExtent { factor, .. }) => factor.is_finite(),
        };
        if ok {
            Ok(())
        } else {
            Err(OrbflowError::validation(
                "scalar values must be finite and anchors non-empty",
            ))
        }
    }
}

/// Scalar channel curve with possibly measured control values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarCurveSpec {
    /// Constant.
    Hold(ScalarSpec),
    /// Straight interpolation.
    Linear {
        /// Value at `t = 0`.
        from: ScalarSpec,
        /// Value at `t = 1`.
        to: ScalarSpec,
    },
    /// Exponential interpolation.
    Geometric {
        /// Value at `t = 0`.
        from: ScalarSpec,
        /// Value at `t = 1`.
        to: ScalarSpec,
    },
    /// 1-D cubic Bézier.
    Cubic {
        /// Value at `t = 0`.
        p0: ScalarSpec,
        /// First control value.
        p1: ScalarSpec,
        /// Second control value.
        p2: ScalarSpec,
        /// Value at `t = 1`.
        p3: ScalarSpec,
    },
    /// Sine wave over `t`.
    Wave {
        /// Centre value.
        base: ScalarSpec,
        /// Peak deviation.
        amplitude: f64,
        /// Full periods across the phase.
        cycles: f64,
        /// Phase offset in radians.
        #[serde(default)]
        phase: f64,
    },
}

impl ScalarCurveSpec {
    /// Constant literal.
    pub fn hold(v: f64) -> Self {
        Self::Hold(ScalarSpec::Literal(v))
    }

    /// Straight literal interpolation.
    pub fn linear(from: f64, to: f64) -> Self {
        Self::Linear {
            from: from.into(),
            to: to.into(),
        }
    }

    fn validate(&self) -> OrbflowResult<()> {
        match self {
            Self::Hold(v) => v.validate(),
            Self::Linear { from, to } | Self::Geometric { from, to } => {
                from.validate()?;
                to.validate()
            }
            Self::Cubic { p0, p1, p2, p3 } => [p0, p1, p2, p3].iter().try_for_each(|p| p.validate()),
            Self::Wave {
                base,
                amplitude,
                cycles,
                phase,
            } => {
                base.validate()?;
                if !(amplitude.is_finite() && cycles.is_finite() && phase.is_finite()) {
                    return Err(OrbflowError::validation("wave parameters must be finite"));
                }
                Ok(())
            }
        }
    }
}

/// Position curve with possibly measured control points.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSpec {
    /// Stationary.
    Hold(PointSpec),
    /// Straight segment.
    Line {
        /// Start.
        from: PointSpec,
        /// End.
        to: PointSpec,
    },
    /// Single cubic Bézier.
    Cubic {
        /// Start.
        p0: PointSpec,
        /// First control point.
        p1: PointSpec,
        /// Second control point.
        p2: PointSpec,
        /// End.
        p3: PointSpec,
    },
    /// Joined cubics, given as `3n + 1` points sharing endpoints.
    Composite {
        /// Flat point list.
        points: Vec<PointSpec>,
        /// Optional waypoint sampling per segment.
        #[serde(default)]
        steps_per_segment: Option<u32>,
    },
    /// Ellipse around a moving centre.
    Orbit {
        /// Path of the centre.
        center: Box<PathSpec>,
        /// Radius over `t`.
        radius: ScalarCurveSpec,
        /// Angle in radians over `t`.
        angle: ScalarCurveSpec,
        /// Vertical radius factor.
        #[serde(default = "one")]
        squash: f64,
    },
}

impl PathSpec {
    /// Reject malformed literals and point counts.
    pub fn validate(&self) -> OrbflowResult<()> {
        match self {
            Self::Hold(p) => p.validate(),
            Self::Line { from, to } => {
                from.validate()?;
                to.validate()
            }
            Self::Cubic { p0, p1, p2, p3 } => [p0, p1, p2, p3].iter().try_for_each(|p| p.validate()),
            Self::Composite {
                points,
                steps_per_segment,
            } => {
                if points.len() < 4 || (points.len() - 1) % 3 != 0 {
                    return Err(OrbflowError::validation(format!(
                        "composite path needs 3n+1 points, got {}",
                        points.len()
                    )));
                }
                if *steps_per_segment == Some(0) {
                    return Err(OrbflowError::validation(
                        "composite path steps_per_segment must be > 0",
                    ));
                }
                points.iter().try_for_each(PointSpec::validate)
            }
            Self::Orbit {
                center,
                radius,
                angle,
                squash,
            } => {
                center.validate()?;
                radius.validate()?;
                angle.validate()?;
                if !squash.is_finite() {
                    return Err(OrbflowError::validation("orbit squash must be finite"));
                }
                Ok(())
            }
        }
    }
}

/// Declarative phase.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseDef {
    /// Progress where the phase begins.
    pub start: f64,
    /// Progress where the phase ends.
    pub end: f64,
    /// Position curve in offset space.
    pub position: PathSpec,
    /// Scale curve.
    #[serde(default = "unit_scale")]
    pub scale: ScalarCurveSpec,
    /// Opacity curve.
    #[serde(default = "unit_scale")]
    pub opacity: ScalarCurveSpec,
    /// Easing applied to phase-local `t`.
    #[serde(default)]
    pub ease: Ease,
    /// Track document content while the element is viewport-fixed.
    #[serde(default)]
    pub pinned: bool,
}

fn unit_scale() -> ScalarCurveSpec {
    ScalarCurveSpec::hold(1.0)
}

impl PhaseDef {
    /// Phase over `[start, end]` following `position`, fully visible at scale 1.
    pub fn new(start: f64, end: f64, position: PathSpec) -> Self {
        Self {
            start,
            end,
            position,
            scale: unit_scale(),
            opacity: unit_scale(),
            ease: Ease::Linear,
            pinned: false,
        }
    }

    /// Builder-style scale curve.
    pub fn with_scale(mut self, scale: ScalarCurveSpec) -> Self {
        self.scale = scale;
        self
    }

    /// Builder-style opacity curve.
    pub fn with_opacity(mut self, opacity: ScalarCurveSpec) -> Self {
        self.opacity = opacity;
        self
    }

    /// Builder-style easing.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Builder-style pinning.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub(crate) fn validate(&self) -> OrbflowResult<()> {
        self.position.validate()?;
        self.scale.validate()?;
        self.opacity.validate()?;
        self.ease.validate()
    }
}

/// Reject unsorted, overlapping or out-of-range phase ranges.
pub fn validate_ranges(ranges: impl IntoIterator<Item = (f64, f64)>) -> OrbflowResult<()> {
    let mut prev_end: Option<f64> = None;
    let mut count = 0usize;
    for (i, (start, end)) in ranges.into_iter().enumerate() {
        count += 1;
        if !(start.is_finite() && end.is_finite()) {
            return Err(OrbflowError::validation(format!(
                "phase {i} bounds must be finite"
            )));
        }
        if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&end) || start > end {
            return Err(OrbflowError::validation(format!(
                "phase {i} range [{start}, {end}] must satisfy 0 <= start <= end <= 1"
            )));
        }
        if let Some(pe) = prev_end.filter(|pe| start < *pe) {
            return Err(OrbflowError::validation(format!(
                "phase {i} starts at {start} before the previous phase ends at {pe}"
            )));
        }
        prev_end = Some(end);
    }
    if count == 0 {
        return Err(OrbflowError::validation("phase table must not be empty"));
    }
    Ok(())
}

/// A phase with every control value frozen.
#[derive(Clone, Debug, PartialEq)]
pub struct Phase {
    /// Progress where the phase begins.
    pub start: f64,
    /// Progress where the phase ends.
    pub end: f64,
    /// Position curve.
    pub position: PathCurve,
    /// Scale curve.
    pub scale: ScalarCurve,
    /// Opacity curve.
    pub opacity: ScalarCurve,
    /// Easing.
    pub ease: Ease,
    /// Tracks document content in viewport space.
    pub pinned: bool,
}

/// Channels sampled from a phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Offset-space position.
    pub position: Point,
    /// Scale.
    pub scale: f64,
    /// Opacity.
    pub opacity: f64,
}

impl Phase {
    /// Sample at raw phase-local `t` (easing is applied here).
    pub fn sample(&self, t: f64) -> Sample {
        let e = self.ease.apply(t);
        Sample {
            position: self.position.eval(e),
            scale: self.scale.eval(e),
            opacity: self.opacity.eval(e),
        }
    }
}

/// Where a progress value falls in a table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Located {
    /// Phase index.
    pub index: usize,
    /// Phase-local `t` in `[0, 1]`.
    pub t: f64,
    /// Whether `progress` lies inside the phase rather than in a gap after it.
    pub inside: bool,
}

/// Sorted, non-overlapping resolved phases.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseTable {
    phases: Vec<Phase>,
}

impl PhaseTable {
    /// Build a table, enforcing the ordering invariant.
    pub fn new(phases: Vec<Phase>) -> OrbflowResult<Self> {
        validate_ranges(phases.iter().map(|p| (p.start, p.end)))?;
        Ok(Self { phases })
    }

    /// Phases in order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Locate `progress`. Gaps hold the end of the nearest preceding phase; progress
    /// before the first phase holds its start.
    pub fn locate(&self, progress: f64) -> Located {
        let idx = self.phases.partition_point(|p| p.start <= progress);
        if idx == 0 {
            return Located {
                index: 0,
                t: 0.0,
                inside: false,
            };
        }
        let index = idx - 1;
        let ph = &self.phases[index];
        if progress <= ph.end {
            let span = ph.end - ph.start;
            let t = if span > 0.0 {
                (progress - ph.start) / span
            } else {
                1.0
            };
            Located {
                index,
                t: t.clamp(0.0, 1.0),
                inside: true,
            }
        } else {
            Located {
                index,
                t: 1.0,
                inside: false,
            }
        }
    }

    /// Sample at `progress`.
    pub fn sample(&self, progress: f64) -> (Located, Sample) {
        let at = self.locate(progress);
        (at, self.phases[at.index].sample(at.t))
    }

    /// Exact end state of the final phase.
    pub fn end_sample(&self) -> (Located, Sample) {
        let index = self.phases.len() - 1;
        let at = Located {
            index,
            t: 1.0,
            inside: true,
        };
        (at, self.phases[index].sample(1.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controller/phase.rs"]
mod tests;
