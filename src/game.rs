//! Game State
//!
//! The one aggregate that owns the world, the quest ledger and the player.
//! Callers hold a `GameState` and route every action through it; nothing
//! else can write to the ledger.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::GameConfig;
use crate::dialogue::{self, DialogueOutcome};
use crate::error::{GameError, LedgerError, SaveError, TransitionError};
use crate::item::Inventory;
use crate::pickup::{self, PickupOutcome};
use crate::player::{Direction, Player, TilePos};
use crate::quest::{Journal, QuestLedger, QuestRegistry};
use crate::save::SaveData;
use crate::world::{Map, MapId, WorldRegistry};

// ============================================================================
// Actions
// ============================================================================

/// A discrete player action, as issued by an input layer or a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Move {
        direction: Direction,
    },
    Face {
        direction: Direction,
    },
    Teleport {
        x: i32,
        y: i32,
        #[serde(default)]
        facing: Option<Direction>,
    },
    Talk,
    Get,
    Transition {
        map: String,
        entry: String,
    },
    Journal,
}

/// Why a step did not move the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// Edge of the map
    Edge,
    Npc { name: String },
    Terrain { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        position: TilePos,
        /// Object lying on the tile the player stepped onto
        object_here: Option<String>,
    },
    Blocked {
        reason: BlockReason,
    },
    /// Stepped onto a transition tile and landed on another map
    Transitioned {
        map: MapId,
        entry: String,
        position: TilePos,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Move(MoveOutcome),
    Faced(Direction),
    Teleported(TilePos),
    Talk(DialogueOutcome),
    Get(PickupOutcome),
    Transitioned { map: MapId, position: TilePos },
    Journal(Journal),
}

// ============================================================================
// Game State
// ============================================================================

#[derive(Debug, Clone)]
pub struct GameState {
    world: WorldRegistry,
    quests: QuestRegistry,
    ledger: QuestLedger,
    player: Player,
    /// Map id -> objects collected there, kept for saves
    removed_objects: BTreeMap<String, BTreeSet<String>>,
}

impl GameState {
    /// Start a new game at the configured entry point
    pub fn new(world: WorldRegistry, quests: QuestRegistry, config: &GameConfig) -> Result<Self, TransitionError> {
        let (map, entry) = world.entry_point(&config.world.start_map, &config.world.start_entry)?;
        warn_unknown_quests(&world, &quests);

        info!(
            "New game on {} at {} facing {}",
            map,
            entry.position,
            entry.facing.as_str()
        );
        let player = Player::new(
            map,
            entry.position,
            entry.facing,
            Inventory::new(config.player.inventory_capacity),
        );

        Ok(Self {
            world,
            quests,
            ledger: QuestLedger::new(),
            player,
            removed_objects: BTreeMap::new(),
        })
    }

    pub fn world(&self) -> &WorldRegistry {
        &self.world
    }

    pub fn quests(&self) -> &QuestRegistry {
        &self.quests
    }

    pub fn ledger(&self) -> &QuestLedger {
        &self.ledger
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Read-only stage query for journal and UI code
    pub fn quest_stage(&self, quest_id: &str) -> u32 {
        self.ledger.stage(quest_id)
    }

    pub fn current_map(&self) -> Result<&Map, TransitionError> {
        map_of(&self.world, self.player.map())
    }

    pub fn journal(&self) -> Journal {
        Journal::build(&self.ledger, &self.quests)
    }

    // ------------------------------------------------------------------------
    // Dialogue and pickup
    // ------------------------------------------------------------------------

    /// Talk to whoever stands on the tile the player faces
    pub fn talk(&mut self) -> Result<DialogueOutcome, GameError> {
        let map = map_of(&self.world, self.player.map())?;
        let Some(npc) = map.npc_at(self.player.facing_tile()) else {
            debug!("Talk at {} found nobody", self.player.facing_tile());
            return Ok(DialogueOutcome::NoTarget);
        };

        dialogue::resolve_talk(&mut self.ledger, &self.player, npc).map_err(ledger_failure)
    }

    /// Talk to a specific NPC on the current map
    pub fn talk_to(&mut self, npc_id: &str) -> Result<DialogueOutcome, GameError> {
        let map = map_of(&self.world, self.player.map())?;
        let Some(npc) = map.npc(npc_id) else {
            debug!("No NPC {} on {}", npc_id, map.id);
            return Ok(DialogueOutcome::NoTarget);
        };

        dialogue::resolve_talk(&mut self.ledger, &self.player, npc).map_err(ledger_failure)
    }

    /// Pick up whatever lies at the player's feet
    pub fn get(&mut self) -> Result<PickupOutcome, GameError> {
        let map = map_of(&self.world, self.player.map())?;
        let Some(object_id) = map.object_at(self.player.position()).map(|o| o.id.clone()) else {
            debug!("Nothing to pick up at {}", self.player.position());
            return Ok(PickupOutcome::NothingHere);
        };

        self.pick_up(&object_id)
    }

    /// Pick up a specific object on the current map
    pub fn pick_up(&mut self, object_id: &str) -> Result<PickupOutcome, GameError> {
        let map_id = self.player.map().clone();
        let map = self
            .world
            .get_mut(map_id.as_str())
            .ok_or_else(|| TransitionError::UnknownMap(map_id.to_string()))?;

        let outcome =
            pickup::resolve_get(&mut self.ledger, &mut self.player, map, object_id).map_err(ledger_failure)?;

        if let PickupOutcome::Collected { object_id, .. } = &outcome {
            self.removed_objects
                .entry(map_id.to_string())
                .or_default()
                .insert(object_id.clone());
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    /// Move the player to a named entry point on another map.
    ///
    /// Both lookups happen before the player is touched, so a failure leaves
    /// map, position and facing exactly as they were.
    pub fn transition_to(&mut self, map_id: &str, entry: &str) -> Result<(), TransitionError> {
        let (map, point) = self.world.entry_point(map_id, entry)?;

        info!(
            "Transition {} -> {}:{} at {}",
            self.player.map(),
            map,
            entry,
            point.position
        );
        self.player.place(map, point.position, point.facing);
        Ok(())
    }

    /// Turn toward `direction` and try to walk one tile
    pub fn step(&mut self, direction: Direction) -> Result<MoveOutcome, GameError> {
        self.player.face(direction);

        let target = self.player.position().step(direction);
        let map = map_of(&self.world, self.player.map())?;

        if !map.in_bounds(target) {
            return Ok(blocked(BlockReason::Edge));
        }
        if !map.is_walkable(target) {
            let reason = match (map.npc_at(target), map.tiles.terrain_at(target)) {
                (Some(npc), _) => BlockReason::Npc { name: npc.name.clone() },
                (None, Some(terrain)) => BlockReason::Terrain {
                    name: terrain.name().to_string(),
                },
                (None, None) => BlockReason::Edge,
            };
            return Ok(blocked(reason));
        }

        let transition = map
            .transition_at(target)
            .map(|t| (t.target_map.clone(), t.target_entry.clone()));
        let object_here = map.object_at(target).map(|o| o.id.clone());

        if let Some((target_map, entry)) = transition {
            self.transition_to(target_map.as_str(), &entry)?;
            return Ok(MoveOutcome::Transitioned {
                map: target_map,
                entry,
                position: self.player.position(),
            });
        }

        self.player.set_position(target);
        Ok(MoveOutcome::Moved {
            position: target,
            object_here,
        })
    }

    pub fn face(&mut self, direction: Direction) {
        self.player.face(direction);
    }

    /// Place the player on any in-bounds tile of the current map
    pub fn teleport(&mut self, position: TilePos, facing: Option<Direction>) -> Result<(), GameError> {
        let map = map_of(&self.world, self.player.map())?;
        if !map.in_bounds(position) {
            return Err(GameError::OutOfBounds {
                map: map.id.to_string(),
                x: position.x,
                y: position.y,
            });
        }

        debug!("Teleport to {} on {}", position, map.id);
        self.player.set_position(position);
        if let Some(facing) = facing {
            self.player.face(facing);
        }
        Ok(())
    }

    /// Run one action to completion
    pub fn apply(&mut self, action: Action) -> Result<ActionOutcome, GameError> {
        match action {
            Action::Move { direction } => self.step(direction).map(ActionOutcome::Move),
            Action::Face { direction } => {
                self.face(direction);
                Ok(ActionOutcome::Faced(direction))
            }
            Action::Teleport { x, y, facing } => {
                let position = TilePos::new(x, y);
                self.teleport(position, facing)?;
                Ok(ActionOutcome::Teleported(position))
            }
            Action::Talk => self.talk().map(ActionOutcome::Talk),
            Action::Get => self.get().map(ActionOutcome::Get),
            Action::Transition { map, entry } => {
                self.transition_to(&map, &entry)?;
                Ok(ActionOutcome::Transitioned {
                    map: self.player.map().clone(),
                    position: self.player.position(),
                })
            }
            Action::Journal => Ok(ActionOutcome::Journal(self.journal())),
        }
    }

    // ------------------------------------------------------------------------
    // Saves
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> SaveData {
        SaveData {
            map: self.player.map().to_string(),
            position: self.player.position(),
            facing: self.player.facing(),
            inventory: self.player.inventory().clone(),
            ledger: self.ledger.clone(),
            removed_objects: self.removed_objects.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Rebuild a game from freshly loaded world data and a save.
    ///
    /// Objects the save lists as collected are removed again. A save that
    /// names a map the world no longer has is rejected.
    pub fn restore(mut world: WorldRegistry, quests: QuestRegistry, save: SaveData) -> Result<Self, SaveError> {
        let map = world.resolve(&save.map)?;
        if !map_of(&world, &map)?.in_bounds(save.position) {
            return Err(SaveError::OutOfBounds {
                map: save.map,
                x: save.position.x,
                y: save.position.y,
            });
        }

        for (map_id, objects) in &save.removed_objects {
            let removed_from = world
                .get_mut(map_id)
                .ok_or_else(|| TransitionError::UnknownMap(map_id.clone()))?;
            for object_id in objects {
                if removed_from.take_object(object_id).is_none() {
                    warn!("Saved pickup {} no longer exists on {}", object_id, map_id);
                }
            }
        }
        warn_unknown_quests(&world, &quests);

        info!("Restored game on {} at {} ({} quests)", map, save.position, save.ledger.len());
        Ok(Self {
            world,
            quests,
            ledger: save.ledger,
            player: Player::new(map, save.position, save.facing, save.inventory),
            removed_objects: save.removed_objects,
        })
    }
}

fn map_of<'a>(world: &'a WorldRegistry, id: &MapId) -> Result<&'a Map, TransitionError> {
    world
        .get(id.as_str())
        .ok_or_else(|| TransitionError::UnknownMap(id.to_string()))
}

fn blocked(reason: BlockReason) -> MoveOutcome {
    debug!("Move blocked: {:?}", reason);
    MoveOutcome::Blocked { reason }
}

/// Ledger refusals are engine bugs, not player mistakes
fn ledger_failure(err: LedgerError) -> GameError {
    error!("Quest ledger refused an update: {}", err);
    GameError::Ledger(err)
}

fn warn_unknown_quests(world: &WorldRegistry, quests: &QuestRegistry) {
    for map in world.maps() {
        let npc_refs = map
            .npcs()
            .iter()
            .filter_map(|n| n.quest_id.as_deref().map(|q| (n.id.as_str(), q)));
        let object_refs = map
            .objects()
            .iter()
            .filter_map(|o| o.quest.as_ref().map(|g| (o.id.as_str(), g.quest_id.as_str())));

        for (owner, quest_id) in npc_refs.chain(object_refs) {
            if !quests.contains(quest_id) {
                warn!("{} on {} references unknown quest '{}'", owner, map.id, quest_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    const LORD_BRITISH_FRONT: TilePos = TilePos::new(9, 4);
    const ORB_TILE: TilePos = TilePos::new(15, 15);

    fn face_lord_british(game: &mut GameState) {
        game.transition_to("castle", "castle_entry").unwrap();
        game.teleport(LORD_BRITISH_FRONT, Some(Direction::North)).unwrap();
    }

    #[test]
    fn test_new_game_at_start_entry() {
        let game = testing::game();
        assert_eq!(game.player().map().as_str(), "castle");
        assert_eq!(game.player().position(), TilePos::new(9, 12));
        assert_eq!(game.player().facing(), Direction::North);
        assert_eq!(game.quest_stage("orb_quest"), 0);
    }

    #[test]
    fn test_bad_start_entry_rejected() {
        let mut config = testing::config();
        config.world.start_entry = "throne".to_string();
        let err = GameState::new(testing::world(), testing::quests(), &config).unwrap_err();
        assert!(matches!(err, TransitionError::UnknownEntryPoint { .. }));
    }

    #[test]
    fn test_orb_quest_end_to_end() {
        let mut game = testing::game();
        assert_eq!(game.quest_stage("orb_quest"), 0);

        face_lord_british(&mut game);
        let outcome = game.talk().unwrap();
        assert!(matches!(outcome, DialogueOutcome::Advanced { stage: 1, .. }));
        assert_eq!(game.quest_stage("orb_quest"), 1);

        game.transition_to("dungeon_1", "entry").unwrap();
        game.teleport(ORB_TILE, None).unwrap();
        let outcome = game.get().unwrap();
        assert!(matches!(outcome, PickupOutcome::Collected { .. }));
        assert_eq!(game.quest_stage("orb_quest"), 2);
        assert!(game.world().get("dungeon_1").unwrap().object("orb_of_moons").is_none());
        assert!(game.player().inventory().contains("orb_of_moons"));

        face_lord_british(&mut game);
        let outcome = game.talk().unwrap();
        assert!(matches!(outcome, DialogueOutcome::Advanced { stage: 3, .. }));

        let outcome = game.talk().unwrap();
        assert!(matches!(outcome, DialogueOutcome::Idle { .. }));
        assert_eq!(game.quest_stage("orb_quest"), 3);

        let journal = game.journal();
        assert!(journal.entry("orb_quest").unwrap().completed);
    }

    #[test]
    fn test_talk_two_tiles_away_is_no_target() {
        let mut game = testing::game();
        game.teleport(TilePos::new(9, 5), Some(Direction::North)).unwrap();

        assert_eq!(game.talk().unwrap(), DialogueOutcome::NoTarget);
        assert_eq!(game.talk_to("lord_british").unwrap(), DialogueOutcome::NoTarget);
        assert_eq!(game.quest_stage("orb_quest"), 0);
    }

    #[test]
    fn test_talk_from_afar_is_no_target_at_every_stage() {
        let mut game = testing::game();

        let assert_no_target_from_afar = |game: &mut GameState, stage: u32| {
            game.transition_to("castle", "castle_entry").unwrap();
            game.teleport(TilePos::new(9, 5), Some(Direction::North)).unwrap();
            assert_eq!(game.talk().unwrap(), DialogueOutcome::NoTarget);
            assert_eq!(game.talk_to("lord_british").unwrap(), DialogueOutcome::NoTarget);
            assert_eq!(game.quest_stage("orb_quest"), stage);
        };

        face_lord_british(&mut game);
        game.talk().unwrap();
        assert_no_target_from_afar(&mut game, 1);

        game.transition_to("dungeon_1", "entry").unwrap();
        game.teleport(ORB_TILE, None).unwrap();
        game.get().unwrap();
        assert_no_target_from_afar(&mut game, 2);

        face_lord_british(&mut game);
        game.talk().unwrap();
        assert_no_target_from_afar(&mut game, 3);
    }

    #[test]
    fn test_orb_not_available_before_talking() {
        let mut game = testing::game();
        game.transition_to("dungeon_1", "entry").unwrap();
        game.teleport(ORB_TILE, None).unwrap();

        let outcome = game.get().unwrap();
        assert_eq!(
            outcome,
            PickupOutcome::NotAvailable {
                object_id: "orb_of_moons".to_string()
            }
        );
        assert_eq!(game.quest_stage("orb_quest"), 0);
        assert!(game.world().get("dungeon_1").unwrap().object("orb_of_moons").is_some());
        assert!(game.snapshot().removed_objects.is_empty());
    }

    #[test]
    fn test_transition_round_trip() {
        let mut game = testing::game();
        game.transition_to("castle", "castle_gate").unwrap();
        let (pos, facing) = (game.player().position(), game.player().facing());

        game.transition_to("dungeon_1", "entry").unwrap();
        assert_eq!(game.player().map().as_str(), "dungeon_1");
        assert_eq!(game.player().position(), TilePos::new(2, 2));

        game.transition_to("castle", "castle_gate").unwrap();
        assert_eq!(game.player().map().as_str(), "castle");
        assert_eq!(game.player().position(), pos);
        assert_eq!(game.player().facing(), facing);
    }

    #[test]
    fn test_failed_transition_leaves_player_alone() {
        let mut game = testing::game();
        game.teleport(TilePos::new(3, 3), Some(Direction::East)).unwrap();

        let err = game.transition_to("atlantis", "dock").unwrap_err();
        assert_eq!(err, TransitionError::UnknownMap("atlantis".to_string()));
        let err = game.transition_to("dungeon_1", "back_door").unwrap_err();
        assert!(matches!(err, TransitionError::UnknownEntryPoint { .. }));

        assert_eq!(game.player().map().as_str(), "castle");
        assert_eq!(game.player().position(), TilePos::new(3, 3));
        assert_eq!(game.player().facing(), Direction::East);
    }

    #[test]
    fn test_step_blocked_by_npc_and_walls() {
        let mut game = testing::game();
        game.teleport(LORD_BRITISH_FRONT, Some(Direction::South)).unwrap();

        let outcome = game.step(Direction::North).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Blocked {
                reason: BlockReason::Npc {
                    name: "Lord British".to_string()
                }
            }
        );
        // Turned even though blocked
        assert_eq!(game.player().facing(), Direction::North);
        assert_eq!(game.player().position(), LORD_BRITISH_FRONT);

        game.teleport(TilePos::new(1, 1), None).unwrap();
        let outcome = game.step(Direction::West).unwrap();
        assert!(matches!(
            outcome,
            MoveOutcome::Blocked {
                reason: BlockReason::Terrain { .. }
            }
        ));

        game.teleport(TilePos::new(0, 0), None).unwrap();
        let outcome = game.step(Direction::North).unwrap();
        assert_eq!(outcome, MoveOutcome::Blocked { reason: BlockReason::Edge });
    }

    #[test]
    fn test_step_onto_transition_tile() {
        let mut game = testing::game();
        game.transition_to("village", "castle_gate").unwrap();

        let outcome = game.step(Direction::North).unwrap();
        assert!(matches!(outcome, MoveOutcome::Moved { position, .. } if position == TilePos::new(15, 2)));

        let outcome = game.step(Direction::North).unwrap();
        match outcome {
            MoveOutcome::Transitioned { map, entry, position } => {
                assert_eq!(map.as_str(), "castle");
                assert_eq!(entry, "castle_entry");
                assert_eq!(position, TilePos::new(9, 12));
            }
            other => panic!("expected transition, got {:?}", other),
        }
        assert_eq!(game.player().map().as_str(), "castle");
    }

    #[test]
    fn test_step_reports_object_underfoot() {
        let mut game = testing::game();
        game.transition_to("dungeon_1", "entry").unwrap();
        game.teleport(TilePos::new(15, 14), None).unwrap();

        let outcome = game.step(Direction::South).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                position: ORB_TILE,
                object_here: Some("orb_of_moons".to_string()),
            }
        );
    }

    #[test]
    fn test_teleport_out_of_bounds() {
        let mut game = testing::game();
        let err = game.teleport(TilePos::new(20, 3), None).unwrap_err();
        assert_eq!(
            err,
            GameError::OutOfBounds {
                map: "castle".to_string(),
                x: 20,
                y: 3
            }
        );
        assert_eq!(game.player().position(), TilePos::new(9, 12));
    }

    #[test]
    fn test_apply_actions_from_toml() {
        let mut game = testing::game();

        let teleport: Action = toml::from_str("action = \"teleport\"\nx = 9\ny = 4\nfacing = \"north\"").unwrap();
        let talk: Action = toml::from_str("action = \"talk\"").unwrap();
        assert_eq!(
            teleport,
            Action::Teleport {
                x: 9,
                y: 4,
                facing: Some(Direction::North)
            }
        );

        game.apply(teleport).unwrap();
        let outcome = game.apply(talk).unwrap();
        assert!(matches!(outcome, ActionOutcome::Talk(DialogueOutcome::Advanced { .. })));

        let outcome = game
            .apply(Action::Transition {
                map: "nowhere".to_string(),
                entry: "gate".to_string(),
            })
            .unwrap_err();
        assert!(matches!(outcome, GameError::Transition(TransitionError::UnknownMap(_))));

        match game.apply(Action::Journal).unwrap() {
            ActionOutcome::Journal(journal) => assert_eq!(journal.active().count(), 1),
            other => panic!("expected journal, got {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut game = testing::game();
        face_lord_british(&mut game);
        game.talk().unwrap();
        game.transition_to("dungeon_1", "entry").unwrap();
        game.teleport(ORB_TILE, None).unwrap();
        game.get().unwrap();

        let save = game.snapshot();
        assert_eq!(save.map, "dungeon_1");
        assert!(save.removed_objects["dungeon_1"].contains("orb_of_moons"));

        let restored = GameState::restore(testing::world(), testing::quests(), save).unwrap();
        assert_eq!(restored.quest_stage("orb_quest"), 2);
        assert_eq!(restored.player().position(), ORB_TILE);
        assert!(restored.player().inventory().contains("orb_of_moons"));
        assert!(restored.world().get("dungeon_1").unwrap().object("orb_of_moons").is_none());
        assert!(restored.world().get("dungeon_1").unwrap().object("torch").is_some());
    }

    #[test]
    fn test_restore_unknown_map_rejected() {
        let mut save = testing::game().snapshot();
        save.map = "atlantis".to_string();

        let err = GameState::restore(testing::world(), testing::quests(), save).unwrap_err();
        assert!(matches!(err, SaveError::Transition(TransitionError::UnknownMap(_))));
    }
}
