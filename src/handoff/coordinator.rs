//! Visibility arbitration across controllers that render one travelling object.

use smallvec::SmallVec;

use crate::controller::machine::{Activation, Controller, FrameEnv};
use crate::foundation::core::{ElementId, VisualState};
use crate::foundation::error::{Fault, OrbflowError, OrbflowResult};

/// Ordering rule for claimants with equal priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The controller later in section order wins.
    #[default]
    LaterWins,
    /// The controller earlier in section order wins.
    EarlierWins,
}

/// Coordinator settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CoordinatorConfig {
    /// Tie-break among equal-priority claimants.
    #[serde(default)]
    pub tie_break: TieBreak,
}

/// Visibility passed from one controller to another.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Handoff {
    /// Previous winner.
    pub from: Option<String>,
    /// New winner.
    pub to: Option<String>,
}

/// Outcome of one arbitration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arbitration {
    /// Index of the controller allowed to render visibly.
    pub winner: Option<usize>,
    /// Controllers whose own state was visible this frame.
    pub claimants: SmallVec<[usize; 4]>,
    /// Set when the winner changed since the previous frame.
    pub handoff: Option<Handoff>,
}

/// One element state after arbitration.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
    /// Owning controller index.
    pub controller: usize,
    /// Element index within the controller.
    pub element: usize,
    /// Render target.
    pub id: ElementId,
    /// State to draw.
    pub state: VisualState,
}

/// Pick the winner among `controllers` and report unexplained double claims.
///
/// Claimants are controllers with any visible element. A claimant is explained when
/// a later claimant's run of chained predecessors covers it (a resting predecessor
/// that has not faded yet); it always yields to that successor. Among the remaining
/// chain heads higher `priority` wins and ties follow `tie_break`. Every loser the
/// winner's chain does not explain is a race.
pub fn arbitrate(controllers: &[Controller], tie_break: TieBreak) -> (Arbitration, Option<Fault>) {
    let claimants: SmallVec<[usize; 4]> = controllers
        .iter()
        .enumerate()
        .filter(|(_, c)| c.claims_visibility())
        .map(|(i, _)| i)
        .collect();

    let explained =
        |j: usize| claimants.iter().any(|&k| k > j && chain_floor(controllers, k) <= j);
    let winner = claimants
        .iter()
        .copied()
        .filter(|&i| !explained(i))
        .max_by(|&a, &b| {
            let pa = controllers[a].def().priority;
            let pb = controllers[b].def().priority;
            pa.cmp(&pb).then_with(|| match tie_break {
                TieBreak::LaterWins => a.cmp(&b),
                TieBreak::EarlierWins => b.cmp(&a),
            })
        });

    let fault = winner.and_then(|w| {
        let floor = chain_floor(controllers, w);
        let losers: Vec<String> = claimants
            .iter()
            .copied()
            .filter(|&i| i != w && !(floor <= i && i < w))
            .map(|i| controllers[i].name().to_owned())
            .collect();
        (!losers.is_empty()).then(|| Fault::RaceOnHandoff {
            winner: controllers[w].name().to_owned(),
            losers,
        })
    });

    (
        Arbitration {
            winner,
            claimants,
            handoff: None,
        },
        fault,
    )
}

/// First index of the chained run ending at `w`.
fn chain_floor(controllers: &[Controller], w: usize) -> usize {
    let mut floor = w;
    while floor > 0 && controllers[floor].def().activation == Activation::Chained {
        floor -= 1;
    }
    floor
}

/// Owns the ordered controllers of a page and arbitrates them every frame.
#[derive(Clone, Debug)]
pub struct Coordinator {
    controllers: Vec<Controller>,
    config: CoordinatorConfig,
    last: Arbitration,
    last_race: Option<Fault>,
    rendered: Vec<Rendered>,
}

impl Coordinator {
    /// Coordinate `controllers`, given in section order.
    pub fn new(controllers: Vec<Controller>, config: CoordinatorConfig) -> OrbflowResult<Self> {
        let mut seen = std::collections::BTreeSet::new();
        for c in &controllers {
            if !seen.insert(c.name()) {
                return Err(OrbflowError::validation(format!(
                    "duplicate controller name '{}'",
                    c.name()
                )));
            }
        }
        Ok(Self {
            controllers,
            config,
            last: Arbitration::default(),
            last_race: None,
            rendered: Vec::new(),
        })
    }

    /// Controllers in section order.
    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    /// Look a controller up by name.
    pub fn controller(&self, name: &str) -> Option<&Controller> {
        self.controllers.iter().find(|c| c.name() == name)
    }

    /// Active configuration.
    pub fn config(&self) -> CoordinatorConfig {
        self.config
    }

    /// Latest arbitration.
    pub fn arbitration(&self) -> &Arbitration {
        &self.last
    }

    /// Name of the current winner.
    pub fn winner_name(&self) -> Option<&str> {
        self.last.winner.map(|i| self.controllers[i].name())
    }

    /// Element states after the latest arbitration.
    pub fn rendered(&self) -> &[Rendered] {
        &self.rendered
    }

    /// Whether any controller still needs frames without further input.
    pub fn in_flight(&self) -> bool {
        self.controllers.iter().any(Controller::in_flight)
    }

    /// Evaluate every controller top-to-bottom, then arbitrate.
    ///
    /// Each controller is told whether its predecessor rests in the current frame
    /// before it maps progress, so a successor never reads a stale flag.
    pub fn step(&mut self, env: &FrameEnv<'_>, faults: &mut Vec<Fault>) -> &Arbitration {
        let mut predecessor_resting = true;
        for c in &mut self.controllers {
            c.notify_predecessor_resting(predecessor_resting);
            let p = c.map_progress(env, faults);
            c.update(p, env, faults);
            predecessor_resting = c.is_resting();
        }
        tracing::trace!(
            progress = ?self.controllers.iter().map(Controller::progress).collect::<Vec<_>>(),
            "controllers stepped"
        );
        self.arbitrate(faults)
    }

    /// Arbitrate the controllers' current states and rebuild the rendered output.
    /// Losers are forced to opacity 0 in the output only.
    pub fn arbitrate(&mut self, faults: &mut Vec<Fault>) -> &Arbitration {
        let (mut arb, race) = arbitrate(&self.controllers, self.config.tie_break);

        if race != self.last_race {
            if let Some(f) = &race {
                tracing::warn!(fault = %f, "visibility race");
            }
            self.last_race = race.clone();
        }
        if let Some(f) = race {
            faults.push(f);
        }

        if arb.winner != self.last.winner {
            let name = |i: Option<usize>| i.map(|i| self.controllers[i].name().to_owned());
            let handoff = Handoff {
                from: name(self.last.winner),
                to: name(arb.winner),
            };
            tracing::debug!(from = ?handoff.from, to = ?handoff.to, "handoff");
            arb.handoff = Some(handoff);
        }

        self.rendered.clear();
        for (ci, c) in self.controllers.iter().enumerate() {
            let forced_hidden = arb.winner.is_some_and(|w| w != ci);
            for (ei, (id, state)) in c.states().iter().enumerate() {
                let state = if forced_hidden {
                    state.with_opacity(0.0)
                } else {
                    *state
                };
                self.rendered.push(Rendered {
                    controller: ci,
                    element: ei,
                    id: id.clone(),
                    state,
                });
            }
        }

        self.last = arb;
        &self.last
    }

    /// Re-measure every captured snapshot.
    pub fn refresh_geometry(&mut self, env: &FrameEnv<'_>, faults: &mut Vec<Fault>) {
        for c in &mut self.controllers {
            c.refresh_geometry(env, faults);
        }
    }

    /// Reset every controller to hidden.
    pub fn reset(&mut self) {
        for c in &mut self.controllers {
            c.reset();
        }
        self.last = Arbitration::default();
        self.last_race = None;
        self.rendered.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handoff/coordinator.rs"]
mod tests;
