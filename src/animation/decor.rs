//! Time-based decorative loops layered on top of scroll-driven state.
//!
//! Loops are functions of wall-clock seconds only. They never read progress and
//! never feed back into controller state.

use crate::foundation::core::{Vec2, VisualState};
use crate::foundation::error::{OrbflowError, OrbflowResult};

/// Periodic scale swell.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Breathe {
    /// Seconds per full cycle.
    pub period_s: f64,
    /// Peak relative scale increase (0.04 = +4%).
    pub amplitude: f64,
}

/// Periodic positional drift.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Drift {
    /// Seconds per full cycle.
    pub period_s: f64,
    /// Peak horizontal displacement in pixels.
    pub dx: f64,
    /// Peak vertical displacement in pixels.
    pub dy: f64,
}

/// A decorative loop attached to one element.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoopLayer {
    /// Optional breathing.
    #[serde(default)]
    pub breathe: Option<Breathe>,
    /// Optional drift.
    #[serde(default)]
    pub drift: Option<Drift>,
    /// Time offset so sibling elements do not pulse in sync.
    #[serde(default)]
    pub phase_s: f64,
}

impl LoopLayer {
    /// Reject non-positive periods and non-finite parameters.
    pub fn validate(&self) -> OrbflowResult<()> {
        if !self.phase_s.is_finite() {
            return Err(OrbflowError::animation("loop phase_s must be finite"));
        }
        if let Some(b) = self.breathe {
            check_period(b.period_s)?;
            if !b.amplitude.is_finite() || b.amplitude <= -1.0 {
                return Err(OrbflowError::animation(
                    "breathe amplitude must be finite and > -1",
                ));
            }
        }
        if let Some(d) = self.drift {
            check_period(d.period_s)?;
            if !(d.dx.is_finite() && d.dy.is_finite()) {
                return Err(OrbflowError::animation("drift extent must be finite"));
            }
        }
        Ok(())
    }

    /// Multiplicative scale factor at `time_s`.
    pub fn scale_factor(&self, time_s: f64) -> f64 {
        match self.breathe {
            Some(b) => 1.0 + b.amplitude * swell(self.phase_s + time_s, b.period_s),
            None => 1.0,
        }
    }

    /// Additive offset at `time_s`.
    pub fn offset(&self, time_s: f64) -> Vec2 {
        match self.drift {
            Some(d) => {
                let a = std::f64::consts::TAU * (self.phase_s + time_s) / d.period_s;
                Vec2::new(d.dx * a.sin(), d.dy * (2.0 * a).sin() * 0.5)
            }
            None => Vec2::ZERO,
        }
    }

    /// Compose the loop with a scroll-driven state. Opacity is left untouched.
    pub fn apply(&self, state: VisualState, time_s: f64) -> VisualState {
        let off = self.offset(time_s);
        VisualState {
            offset_x: state.offset_x + off.x,
            offset_y: state.offset_y + off.y,
            scale: state.scale * self.scale_factor(time_s),
            opacity: state.opacity,
        }
    }
}

fn check_period(period_s: f64) -> OrbflowResult<()> {
    if !period_s.is_finite() || period_s <= 0.0 {
        return Err(OrbflowError::animation("loop period_s must be > 0"));
    }
    Ok(())
}

/// 0 → 1 → 0 over one period, eased at both ends.
fn swell(time_s: f64, period_s: f64) -> f64 {
    0.5 - 0.5 * (std::f64::consts::TAU * time_s / period_s).cos()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/decor.rs"]
mod tests;
