use crate::foundation::core::ElementId;

/// Convenience result type used across orbflow.
pub type OrbflowResult<T> = Result<T, OrbflowError>;

/// Top-level error taxonomy used by construction and loading APIs.
///
/// Per-frame evaluation never returns these; see [`Fault`] for the recoverable
/// conditions that can occur while scrolling.
#[derive(thiserror::Error, Debug)]
pub enum OrbflowError {
    /// Invalid user-provided or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while validating curves, phases or easing parameters.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OrbflowError {
    /// Build an [`OrbflowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`OrbflowError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build an [`OrbflowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Recoverable conditions hit while evaluating a frame.
///
/// Faults degrade the visuals but never interrupt scrolling: they are collected
/// into the frame report and logged.
#[derive(thiserror::Error, Clone, Debug, PartialEq, serde::Serialize)]
pub enum Fault {
    /// A referenced element could not be measured; a fallback was used.
    #[error("{controller}: anchor '{anchor}' is not measurable, using fallback")]
    MissingAnchor {
        /// Controller that referenced the anchor.
        controller: String,
        /// The missing element.
        anchor: ElementId,
    },

    /// A geometry snapshot no longer matched live layout and was re-measured.
    #[error("{controller}: cached geometry was stale and has been re-measured")]
    StaleGeometry {
        /// Controller whose snapshot moved.
        controller: String,
    },

    /// Several controllers claimed visibility outside the handoff chain.
    #[error("visibility race resolved in favour of {winner} over {losers:?}")]
    RaceOnHandoff {
        /// Controller kept visible.
        winner: String,
        /// Controllers forced hidden.
        losers: Vec<String>,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
