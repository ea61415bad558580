use std::collections::BTreeMap;

use crate::player::TilePos;
use crate::world::MapId;

// ============================================================================
// Dialogue Table
// ============================================================================

/// What an NPC says at one quest stage, and where it moves the quest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueEntry {
    pub text: String,
    pub advance_to: Option<u32>,
}

/// Stage-keyed dialogue for one NPC. Stages without an entry fall
/// through to the NPC's greeting.
#[derive(Debug, Clone, Default)]
pub struct DialogueTable {
    entries: BTreeMap<u32, DialogueEntry>,
}

impl DialogueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stage: u32, entry: DialogueEntry) -> Option<DialogueEntry> {
        self.entries.insert(stage, entry)
    }

    pub fn entry(&self, stage: u32) -> Option<&DialogueEntry> {
        self.entries.get(&stage)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// NPC
// ============================================================================

/// A stationary character placed on a map
#[derive(Debug, Clone)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub home_map: MapId,
    pub position: TilePos,
    /// Shown when no quest entry applies
    pub greeting: String,
    pub quest_id: Option<String>,
    pub dialogue: DialogueTable,
}

impl Npc {
    pub fn is_quest_giver(&self) -> bool {
        self.quest_id.is_some() && !self.dialogue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_table_lookup() {
        let mut table = DialogueTable::new();
        table.insert(
            0,
            DialogueEntry {
                text: "Retrieve my Orb of Moons!".to_string(),
                advance_to: Some(1),
            },
        );

        assert_eq!(table.len(), 1);
        assert_eq!(table.entry(0).and_then(|e| e.advance_to), Some(1));
        assert!(table.entry(1).is_none());
    }
}
