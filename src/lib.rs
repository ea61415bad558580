//! Quest progression and map transitions for a tile-based adventure.
//!
//! [`GameState`] owns the loaded world, the quest ledger and the player.
//! Talk and get actions are resolved by the dialogue and pickup engines,
//! which are the only code allowed to advance a quest.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod game;
pub mod item;
pub mod npc;
pub mod pickup;
pub mod player;
pub mod queue;
pub mod quest;
pub mod save;
pub mod script;
pub mod tilemap;
pub mod world;

#[cfg(test)]
mod testing;

pub use config::GameConfig;
pub use dialogue::DialogueOutcome;
pub use error::{ConfigError, GameError, LedgerError, SaveError, ScriptError, TransitionError, WorldError};
pub use game::{Action, ActionOutcome, BlockReason, GameState, MoveOutcome};
pub use pickup::PickupOutcome;
pub use player::{Direction, Player, TilePos};
pub use queue::{GameHandle, spawn_game};
pub use quest::{Journal, QuestLedger, QuestRegistry};
pub use save::{SaveData, SaveStore};
pub use script::{Script, ScriptReport, run_script};
pub use world::{MapId, WorldRegistry};
