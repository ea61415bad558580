//! Error types for the quest core.
//!
//! No-op results (`NoTarget`, `Idle`, `NotAvailable`, ...) are not errors and
//! never appear here; they are ordinary outcome values.

use std::path::PathBuf;
use thiserror::Error;

/// The ledger refused to move a quest to a stage that is not strictly ahead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid transition for quest '{quest_id}': stage {current} -> {requested}")]
    InvalidTransition {
        quest_id: String,
        current: u32,
        requested: u32,
    },
}

/// A map transition named something the world does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("unknown map '{0}'")]
    UnknownMap(String),

    #[error("map '{map}' has no entry point '{entry}'")]
    UnknownEntryPoint { map: String, entry: String },
}

/// Failures while reading the game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failures while loading or validating world data.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate {kind} id '{id}'")]
    Duplicate { kind: &'static str, id: String },

    #[error("invalid map '{map}': {reason}")]
    InvalidMap { map: String, reason: String },

    #[error("invalid quest '{quest}': {reason}")]
    InvalidQuest { quest: String, reason: String },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Failure of a single player action against the game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("position ({x}, {y}) is outside map '{map}'")]
    OutOfBounds { map: String, x: i32, y: i32 },

    #[error("game task has shut down")]
    Closed,
}

/// Failures while persisting or restoring a save.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save references a missing world element: {0}")]
    Transition(#[from] TransitionError),

    #[error("save places the player at ({x}, {y}) outside map '{map}'")]
    OutOfBounds { map: String, x: i32, y: i32 },
}

/// Failures while loading or replaying a verification script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse script {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("step {step}: action failed: {source}")]
    Action {
        step: usize,
        #[source]
        source: GameError,
    },

    #[error("step {step}: expectation failed: {detail}")]
    Expectation { step: usize, detail: String },
}
