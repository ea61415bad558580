//! Map Definition Structures
//!
//! Raw structures are deserialized from TOML map files. A [`Map`] is the
//! resolved form, built only after every reference in the file checks out.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::warn;

use super::registry::MapId;
use crate::error::{TransitionError, WorldError};
use crate::item::{QuestGate, WorldObject};
use crate::npc::{DialogueEntry, DialogueTable, Npc};
use crate::player::{Direction, TilePos};
use crate::tilemap::{Terrain, Tilemap};

/// A map definition file
#[derive(Debug, Clone, Deserialize)]
pub struct RawMapFile {
    pub map: RawMap,
}

/// Raw map data as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawMap {
    pub id: String,
    pub name: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default = "default_tile")]
    pub default_tile: Terrain,
    /// ASCII rows, one symbol per tile
    #[serde(default)]
    pub layout: Vec<String>,
    /// Layout symbol -> terrain
    #[serde(default)]
    pub legend: HashMap<String, Terrain>,
    #[serde(default)]
    pub entry_points: HashMap<String, RawEntryPoint>,
    #[serde(default)]
    pub npcs: Vec<RawNpc>,
    #[serde(default)]
    pub objects: Vec<RawObject>,
    #[serde(default)]
    pub transitions: Vec<RawTransition>,
}

fn default_tile() -> Terrain {
    Terrain::Grass
}

fn default_facing() -> Direction {
    Direction::South
}

fn default_greeting() -> String {
    "Greetings.".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntryPoint {
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_facing")]
    pub facing: Direction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNpc {
    pub id: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Quest this NPC drives, if any
    pub quest: Option<String>,
    #[serde(default)]
    pub dialogue: Vec<RawDialogue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDialogue {
    pub stage: u32,
    pub text: String,
    pub advance_to: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawObject {
    pub id: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub quest: Option<String>,
    #[serde(default)]
    pub required_stage: u32,
    pub advance_to: Option<u32>,
}

/// A tile that moves the player to another map when stepped on
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransition {
    pub x: i32,
    pub y: i32,
    pub map: String,
    pub entry: String,
}

// ============================================================================
// Resolved Map Structures
// ============================================================================

/// Named landing spot used by map transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    pub position: TilePos,
    pub facing: Direction,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub position: TilePos,
    pub target_map: MapId,
    pub target_entry: String,
}

/// A fully resolved map
#[derive(Debug, Clone)]
pub struct Map {
    pub id: MapId,
    pub name: String,
    pub tiles: Tilemap,
    entry_points: HashMap<String, EntryPoint>,
    npcs: Vec<Npc>,
    objects: Vec<WorldObject>,
    transitions: Vec<Transition>,
}

impl Map {
    /// Resolve a raw map. `resolve_target` checks transition targets
    /// against the rest of the world being loaded.
    pub fn from_raw<F>(raw: &RawMap, id: MapId, resolve_target: F) -> Result<Self, WorldError>
    where
        F: Fn(&str, &str) -> Result<MapId, TransitionError>,
    {
        let invalid = |reason: String| WorldError::InvalidMap {
            map: raw.id.clone(),
            reason,
        };

        let mut legend = HashMap::new();
        for (symbol, terrain) in &raw.legend {
            let mut chars = symbol.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => {
                    legend.insert(ch, *terrain);
                }
                _ => return Err(invalid(format!("legend key '{}' must be a single character", symbol))),
            }
        }

        let tiles = if raw.layout.is_empty() {
            match (raw.width, raw.height) {
                (Some(w), Some(h)) => Tilemap::filled(w, h, raw.default_tile).map_err(invalid)?,
                _ => return Err(invalid("map without a layout needs width and height".to_string())),
            }
        } else {
            Tilemap::from_layout(&raw.layout, &legend, raw.default_tile, raw.width, raw.height)
                .map_err(invalid)?
        };

        let entry_points: HashMap<String, EntryPoint> = raw
            .entry_points
            .iter()
            .map(|(name, entry)| {
                let point = EntryPoint {
                    position: TilePos::new(entry.x, entry.y),
                    facing: entry.facing,
                };
                (name.clone(), point)
            })
            .collect();

        let mut npcs: Vec<Npc> = Vec::with_capacity(raw.npcs.len());
        for raw_npc in &raw.npcs {
            let position = TilePos::new(raw_npc.x, raw_npc.y);
            if !tiles.in_bounds(position) {
                return Err(invalid(format!("npc '{}' at {} is out of bounds", raw_npc.id, position)));
            }
            if npcs.iter().any(|n| n.id == raw_npc.id) {
                return Err(WorldError::Duplicate {
                    kind: "npc",
                    id: raw_npc.id.clone(),
                });
            }
            if npcs.iter().any(|n| n.position == position) {
                return Err(invalid(format!("two npcs share tile {}", position)));
            }
            if !tiles.is_tile_walkable(position) {
                warn!("NPC '{}' on map '{}' stands on impassable terrain", raw_npc.id, raw.id);
            }

            let dialogue = resolve_dialogue(raw_npc).map_err(invalid)?;

            npcs.push(Npc {
                id: raw_npc.id.clone(),
                name: raw_npc.name.clone(),
                home_map: id.clone(),
                position,
                greeting: raw_npc.greeting.clone(),
                quest_id: raw_npc.quest.clone(),
                dialogue,
            });
        }

        let mut object_ids = HashSet::new();
        let mut objects = Vec::with_capacity(raw.objects.len());
        for raw_obj in &raw.objects {
            let position = TilePos::new(raw_obj.x, raw_obj.y);
            if !tiles.in_bounds(position) {
                return Err(invalid(format!("object '{}' at {} is out of bounds", raw_obj.id, position)));
            }
            if !object_ids.insert(raw_obj.id.as_str()) {
                return Err(WorldError::Duplicate {
                    kind: "object",
                    id: raw_obj.id.clone(),
                });
            }
            if npcs.iter().any(|n| n.position == position) {
                return Err(invalid(format!("object '{}' is under an npc at {}", raw_obj.id, position)));
            }

            let quest = match (&raw_obj.quest, raw_obj.advance_to) {
                (Some(quest_id), Some(advance_to)) => {
                    if advance_to <= raw_obj.required_stage {
                        return Err(invalid(format!(
                            "object '{}' advances quest '{}' from stage {} to {}",
                            raw_obj.id, quest_id, raw_obj.required_stage, advance_to
                        )));
                    }
                    Some(QuestGate {
                        quest_id: quest_id.clone(),
                        required_stage: raw_obj.required_stage,
                        advance_to,
                    })
                }
                (Some(quest_id), None) => {
                    return Err(invalid(format!(
                        "object '{}' names quest '{}' but no advance_to stage",
                        raw_obj.id, quest_id
                    )));
                }
                (None, Some(_)) => {
                    return Err(invalid(format!("object '{}' has advance_to but no quest", raw_obj.id)));
                }
                (None, None) => None,
            };

            objects.push(WorldObject {
                id: raw_obj.id.clone(),
                name: raw_obj.name.clone(),
                home_map: id.clone(),
                position,
                quest,
            });
        }

        let mut transitions = Vec::with_capacity(raw.transitions.len());
        for raw_tr in &raw.transitions {
            let position = TilePos::new(raw_tr.x, raw_tr.y);
            if !tiles.in_bounds(position) {
                return Err(invalid(format!("transition at {} is out of bounds", position)));
            }
            let target_map = resolve_target(&raw_tr.map, &raw_tr.entry)?;
            transitions.push(Transition {
                position,
                target_map,
                target_entry: raw_tr.entry.clone(),
            });
        }

        let map = Self {
            id,
            name: raw.name.clone(),
            tiles,
            entry_points,
            npcs,
            objects,
            transitions,
        };
        map.check_landing_tiles().map_err(invalid)?;
        Ok(map)
    }

    /// Entry points and transition tiles must be tiles the player can stand on
    fn check_landing_tiles(&self) -> Result<(), String> {
        for (name, entry) in &self.entry_points {
            if !self.is_walkable(entry.position) {
                return Err(format!("entry point '{}' at {} is not walkable", name, entry.position));
            }
        }
        for transition in &self.transitions {
            if !self.is_walkable(transition.position) {
                return Err(format!("transition at {} is not walkable", transition.position));
            }
        }
        Ok(())
    }

    pub fn entry_point(&self, name: &str) -> Option<&EntryPoint> {
        self.entry_points.get(name)
    }

    pub fn entry_point_names(&self) -> impl Iterator<Item = &str> {
        self.entry_points.keys().map(String::as_str)
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn npc(&self, npc_id: &str) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == npc_id)
    }

    pub fn npc_at(&self, pos: TilePos) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.position == pos)
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    pub fn object(&self, object_id: &str) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.id == object_id)
    }

    pub fn object_at(&self, pos: TilePos) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.position == pos)
    }

    pub fn transition_at(&self, pos: TilePos) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.position == pos)
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        self.tiles.in_bounds(pos)
    }

    /// Passable terrain with no NPC standing on it
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.tiles.is_tile_walkable(pos) && self.npc_at(pos).is_none()
    }

    /// Remove an object for good. There is no way to put it back.
    pub(crate) fn take_object(&mut self, object_id: &str) -> Option<WorldObject> {
        let idx = self.objects.iter().position(|o| o.id == object_id)?;
        Some(self.objects.remove(idx))
    }
}

fn resolve_dialogue(raw: &RawNpc) -> Result<DialogueTable, String> {
    let mut table = DialogueTable::new();

    if raw.dialogue.is_empty() {
        return Ok(table);
    }

    let quest_id = raw
        .quest
        .as_deref()
        .ok_or_else(|| format!("npc '{}' has stage dialogue but no quest", raw.id))?;

    for line in &raw.dialogue {
        if let Some(advance_to) = line.advance_to {
            if advance_to <= line.stage {
                return Err(format!(
                    "npc '{}' dialogue at stage {} of quest '{}' advances to {}",
                    raw.id, line.stage, quest_id, advance_to
                ));
            }
        }
        let entry = DialogueEntry {
            text: line.text.clone(),
            advance_to: line.advance_to,
        };
        if table.insert(line.stage, entry).is_some() {
            return Err(format!("npc '{}' has two dialogue entries for stage {}", raw.id, line.stage));
        }
    }

    Ok(table)
}
