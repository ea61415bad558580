//! Shared fixtures for unit tests, built from the shipped game data.

use crate::config::GameConfig;
use crate::game::GameState;
use crate::item::Inventory;
use crate::npc::Npc;
use crate::player::{Direction, Player, TilePos};
use crate::quest::QuestRegistry;
use crate::world::{MapId, WorldRegistry};

const CASTLE: &str = include_str!("../data/maps/castle.toml");
const VILLAGE: &str = include_str!("../data/maps/village.toml");
const DUNGEON: &str = include_str!("../data/maps/dungeon_1.toml");
const ORB_QUEST: &str = include_str!("../data/quests/orb_quest.toml");

pub fn world() -> WorldRegistry {
    WorldRegistry::from_toml_strs([CASTLE, VILLAGE, DUNGEON]).unwrap()
}

pub fn quests() -> QuestRegistry {
    QuestRegistry::from_toml_strs([ORB_QUEST]).unwrap()
}

pub fn config() -> GameConfig {
    GameConfig::default()
}

/// Fresh game at the castle entrance
pub fn game() -> GameState {
    GameState::new(world(), quests(), &config()).unwrap()
}

pub fn lord_british() -> Npc {
    world().get("castle").unwrap().npc("lord_british").unwrap().clone()
}

pub fn player_on(map: &str, x: i32, y: i32, facing: Direction) -> Player {
    Player::new(MapId::new(map), TilePos::new(x, y), facing, Inventory::default())
}

pub fn player_with_capacity(map: &str, x: i32, y: i32, facing: Direction, capacity: usize) -> Player {
    Player::new(MapId::new(map), TilePos::new(x, y), facing, Inventory::new(capacity))
}
