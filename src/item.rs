use serde::{Deserialize, Serialize};

use crate::player::TilePos;
use crate::world::MapId;

// ============================================================================
// World Objects
// ============================================================================

/// Quest gating for a collectible object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestGate {
    pub quest_id: String,
    /// Ledger stage at which the object can be collected
    pub required_stage: u32,
    /// Stage the ledger moves to on pickup
    pub advance_to: u32,
}

/// An item lying on a map tile
#[derive(Debug, Clone)]
pub struct WorldObject {
    pub id: String,
    pub name: String,
    pub home_map: MapId,
    pub position: TilePos,
    pub quest: Option<QuestGate>,
}

impl WorldObject {
    pub fn to_inventory_item(&self) -> InventoryItem {
        InventoryItem {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

// ============================================================================
// Inventory
// ============================================================================

pub const DEFAULT_INVENTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<InventoryItem>,
    capacity: usize,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Try to add an item. Returns false when there is no room.
    pub fn add(&mut self, item: InventoryItem) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i.id == item_id)
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_INVENTORY_CAPACITY)
    }
}
