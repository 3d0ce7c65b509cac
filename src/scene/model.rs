//! Serialized scene description and its loaders.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::controller::machine::{Controller, ControllerDef};
use crate::foundation::error::{OrbflowError, OrbflowResult};
use crate::handoff::coordinator::{Coordinator, CoordinatorConfig};
use crate::scene::scheduler::SchedulerConfig;

/// Serialized page description: every controller in section order plus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    /// Arbitration settings.
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    /// Frame scheduling settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Controllers, top of the page first.
    pub controllers: Vec<ControllerDef>,
}

impl SceneDef {
    /// Check the whole scene.
    pub fn validate(&self) -> OrbflowResult<()> {
        if self.controllers.is_empty() {
            return Err(OrbflowError::validation(
                "scene must declare at least one controller",
            ));
        }
        if !(self.scheduler.revalidate_after_ms.is_finite()
            && self.scheduler.revalidate_after_ms >= 0.0)
        {
            return Err(OrbflowError::validation(
                "scheduler.revalidate_after_ms must be finite and >= 0",
            ));
        }
        let mut names = BTreeSet::new();
        let mut elements = BTreeSet::new();
        for c in &self.controllers {
            c.validate()?;
            if !names.insert(c.name.as_str()) {
                return Err(OrbflowError::validation(format!(
                    "duplicate controller name '{}'",
                    c.name
                )));
            }
            for el in &c.elements {
                if !elements.insert(&el.id) {
                    return Err(OrbflowError::validation(format!(
                        "element '{}' is animated by more than one controller",
                        el.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A validated scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    def: SceneDef,
}

impl Scene {
    /// Validate `def`.
    pub fn from_def(def: SceneDef) -> OrbflowResult<Self> {
        def.validate()?;
        Ok(Self { def })
    }

    /// Parse and validate a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> OrbflowResult<Self> {
        let def: SceneDef = serde_json::from_reader(r)
            .map_err(|e| OrbflowError::validation(format!("parse scene JSON: {e}")))?;
        Self::from_def(def)
    }

    /// Parse and validate a scene from a JSON file on disk.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> OrbflowResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OrbflowError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        let scene = Self::from_reader(BufReader::new(f))?;
        tracing::debug!(controllers = scene.def.controllers.len(), "scene loaded");
        Ok(scene)
    }

    /// Re-run validation.
    pub fn validate(&self) -> OrbflowResult<()> {
        self.def.validate()
    }

    /// The underlying definition.
    pub fn def(&self) -> &SceneDef {
        &self.def
    }

    /// Serialize back to pretty JSON.
    pub fn to_json_pretty(&self) -> OrbflowResult<String> {
        serde_json::to_string_pretty(&self.def).map_err(|e| OrbflowError::serde(e.to_string()))
    }

    /// Build fresh controllers and their coordinator.
    pub fn coordinator(&self) -> OrbflowResult<Coordinator> {
        let controllers = self
            .def
            .controllers
            .iter()
            .cloned()
            .map(Controller::new)
            .collect::<OrbflowResult<Vec<_>>>()?;
        Coordinator::new(controllers, self.def.coordinator)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
