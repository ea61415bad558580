//! Verification Scripts
//!
//! Replays a scripted play session against a [`GameState`] and checks the
//! resulting world after each step. Scripts are TOML:
//!
//! ```toml
//! name = "accept_quest"
//!
//! [[steps]]
//! walk = "north"
//! steps = 8
//!
//! [[steps]]
//! action = "talk"
//!
//! [[steps]]
//! expect = "stage"
//! quest = "orb_quest"
//! stage = 1
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ScriptError;
use crate::game::{Action, GameState, MoveOutcome};
use crate::player::Direction;

// ============================================================================
// Script Definitions
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One script step. Variants are tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Walk several tiles in one direction, failing if anything blocks
    Walk {
        walk: Direction,
        #[serde(default = "default_walk_steps")]
        steps: u32,
    },
    Act(Action),
    Check(Expectation),
}

fn default_walk_steps() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "expect", rename_all = "snake_case")]
pub enum Expectation {
    Stage {
        quest: String,
        stage: u32,
    },
    Object {
        map: String,
        object: String,
        present: bool,
    },
    Position {
        x: i32,
        y: i32,
        #[serde(default)]
        facing: Option<Direction>,
    },
    Map {
        map: String,
    },
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse a script held in memory
    pub fn from_toml(src: &str) -> Result<Self, ScriptError> {
        Self::parse(src, Path::new("<inline>"))
    }

    fn parse(src: &str, path: &Path) -> Result<Self, ScriptError> {
        toml::from_str(src).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ============================================================================
// Runner
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub name: String,
    pub steps: usize,
    /// Actions applied, counting each tile of a walk
    pub actions: usize,
    pub checks: usize,
}

/// Run every step in order, stopping at the first failure.
///
/// Step numbers in errors start at 1.
pub fn run_script(game: &mut GameState, script: &Script) -> Result<ScriptReport, ScriptError> {
    info!("Running script '{}' ({} steps)", script.name, script.steps.len());

    let mut report = ScriptReport {
        name: script.name.clone(),
        ..Default::default()
    };

    for (idx, step) in script.steps.iter().enumerate() {
        let step_no = idx + 1;
        match step {
            Step::Walk { walk, steps } => {
                for _ in 0..*steps {
                    let outcome = game
                        .step(*walk)
                        .map_err(|source| ScriptError::Action { step: step_no, source })?;
                    if let MoveOutcome::Blocked { reason } = outcome {
                        return Err(ScriptError::Expectation {
                            step: step_no,
                            detail: format!(
                                "walking {} from {} blocked: {:?}",
                                walk.as_str(),
                                game.player().position(),
                                reason
                            ),
                        });
                    }
                    report.actions += 1;
                }
            }
            Step::Act(action) => {
                let outcome = game
                    .apply(action.clone())
                    .map_err(|source| ScriptError::Action { step: step_no, source })?;
                debug!("Step {}: {:?}", step_no, outcome);
                report.actions += 1;
            }
            Step::Check(expectation) => {
                check(game, expectation).map_err(|detail| ScriptError::Expectation { step: step_no, detail })?;
                report.checks += 1;
            }
        }
        report.steps += 1;
    }

    info!(
        "Script '{}' passed: {} actions, {} checks",
        report.name, report.actions, report.checks
    );
    Ok(report)
}

fn check(game: &GameState, expectation: &Expectation) -> Result<(), String> {
    match expectation {
        Expectation::Stage { quest, stage } => {
            let actual = game.quest_stage(quest);
            if actual == *stage {
                Ok(())
            } else {
                Err(format!("quest '{}' is at stage {}, expected {}", quest, actual, stage))
            }
        }
        Expectation::Object { map, object, present } => {
            let target = game.world().get(map).ok_or_else(|| format!("unknown map '{}'", map))?;
            let actual = target.object(object).is_some();
            if actual == *present {
                Ok(())
            } else if *present {
                Err(format!("'{}' is missing from {}", object, map))
            } else {
                Err(format!("'{}' is still on {}", object, map))
            }
        }
        Expectation::Position { x, y, facing } => {
            let player = game.player();
            let position = player.position();
            if (position.x, position.y) != (*x, *y) {
                return Err(format!("player is at {}, expected ({}, {})", position, x, y));
            }
            match facing {
                Some(facing) if *facing != player.facing() => Err(format!(
                    "player faces {}, expected {}",
                    player.facing().as_str(),
                    facing.as_str()
                )),
                _ => Ok(()),
            }
        }
        Expectation::Map { map } => {
            let actual = game.player().map();
            if actual.as_str() == map {
                Ok(())
            } else {
                Err(format!("player is on {}, expected {}", actual, map))
            }
        }
    }
}
