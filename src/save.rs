//! Save Data
//!
//! A snapshot of everything that changes during play: where the player
//! stands, what they carry, how far each quest has gone, and which world
//! objects are gone. Stored as pretty-printed JSON.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SaveError;
use crate::item::Inventory;
use crate::player::{Direction, TilePos};
use crate::quest::QuestLedger;

// ============================================================================
// Save Data
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub map: String,
    pub position: TilePos,
    pub facing: Direction,
    pub inventory: Inventory,
    pub ledger: QuestLedger,
    /// Map id -> ids of objects already collected there
    #[serde(default)]
    pub removed_objects: BTreeMap<String, BTreeSet<String>>,
    pub saved_at: DateTime<Utc>,
}

// ============================================================================
// Save Store
// ============================================================================

/// A single save slot on disk
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the save, replacing any previous one.
    ///
    /// The JSON goes to a sibling temp file first and is renamed into place,
    /// so a crash never leaves a half-written save behind.
    pub fn save(&self, data: &SaveData) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_err(source))?;
        }

        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| SaveError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| self.io_err(source))?;

        info!("Saved game to {:?} (map {}, {} quests)", self.path, data.map, data.ledger.len());
        Ok(())
    }

    /// Read the save, `None` if there is none yet
    pub fn load(&self) -> Result<Option<SaveData>, SaveError> {
        if !self.path.exists() {
            debug!("No save at {:?}", self.path);
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| self.io_err(source))?;
        let data: SaveData = serde_json::from_str(&content)?;
        info!("Loaded save from {:?} (saved {})", self.path, data.saved_at);
        Ok(Some(data))
    }

    /// Delete the save. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, SaveError> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path).map_err(|source| self.io_err(source))?;
        info!("Deleted save {:?}", self.path);
        Ok(true)
    }

    fn io_err(&self, source: std::io::Error) -> SaveError {
        SaveError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
