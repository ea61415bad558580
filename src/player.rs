use serde::{Deserialize, Serialize};

use crate::item::{Inventory, InventoryItem};
use crate::world::MapId;

// ============================================================================
// Grid Primitives
// ============================================================================

/// Cardinal facing on the tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Tile delta for one step in this direction (y grows southward)
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring tile in `direction`
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for TilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ============================================================================
// Player
// ============================================================================

/// The avatar: where it stands, which way it looks, what it carries.
///
/// Fields are only writable from inside the crate so every change goes
/// through the game-state operations.
#[derive(Debug, Clone)]
pub struct Player {
    map: MapId,
    position: TilePos,
    facing: Direction,
    inventory: Inventory,
}

impl Player {
    pub(crate) fn new(map: MapId, position: TilePos, facing: Direction, inventory: Inventory) -> Self {
        Self {
            map,
            position,
            facing,
            inventory,
        }
    }

    pub fn map(&self) -> &MapId {
        &self.map
    }

    pub fn position(&self) -> TilePos {
        self.position
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The tile directly in front of the player
    pub fn facing_tile(&self) -> TilePos {
        self.position.step(self.facing)
    }

    pub(crate) fn face(&mut self, direction: Direction) {
        self.facing = direction;
    }

    pub(crate) fn set_position(&mut self, position: TilePos) {
        self.position = position;
    }

    /// Swap map, position and facing together
    pub(crate) fn place(&mut self, map: MapId, position: TilePos, facing: Direction) {
        self.map = map;
        self.position = position;
        self.facing = facing;
    }

    pub(crate) fn add_item(&mut self, item: InventoryItem) -> bool {
        self.inventory.add(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_offsets_round_trip() {
        for dir in [Direction::North, Direction::South, Direction::East, Direction::West] {
            let (dx, dy) = dir.offset();
            assert_eq!(Direction::from_delta(dx, dy), Some(dir));
        }
        assert_eq!(Direction::from_delta(1, 1), None);
        assert_eq!(Direction::from_delta(0, 0), None);
    }

    #[test]
    fn test_facing_tile() {
        let map = MapId::new("castle");
        let mut player = Player::new(map, TilePos::new(9, 4), Direction::North, Inventory::new(4));
        assert_eq!(player.facing_tile(), TilePos::new(9, 3));

        player.face(Direction::West);
        assert_eq!(player.facing_tile(), TilePos::new(8, 4));
    }

    #[test]
    fn test_place_swaps_everything() {
        let mut player = Player::new(MapId::new("castle"), TilePos::new(1, 1), Direction::South, Inventory::new(4));
        player.place(MapId::new("dungeon_1"), TilePos::new(2, 3), Direction::East);

        assert_eq!(player.map().as_str(), "dungeon_1");
        assert_eq!(player.position(), TilePos::new(2, 3));
        assert_eq!(player.facing(), Direction::East);
    }
}
