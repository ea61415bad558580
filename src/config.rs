//! Game configuration loaded from TOML.
//!
//! ```toml
//! [world]
//! data_dir = "data"
//! start_map = "castle"
//! start_entry = "castle_entry"
//!
//! [player]
//! inventory_capacity = 20
//!
//! [save]
//! path = "saves/britannia.json"
//! ```
//!
//! Every field has a default, so a missing file or section is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::item::DEFAULT_INVENTORY_CAPACITY;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub save: SaveConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Root holding `maps/`, `quests/` and `scripts/`
    pub data_dir: PathBuf,
    pub start_map: String,
    pub start_entry: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            start_map: "castle".to_string(),
            start_entry: "castle_entry".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub inventory_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    pub path: PathBuf,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("saves/britannia.json"),
        }
    }
}

impl GameConfig {
    /// Load configuration, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.start_map.trim().is_empty() {
            return Err(ConfigError::Invalid("world.start_map is empty".to_string()));
        }
        if self.world.start_entry.trim().is_empty() {
            return Err(ConfigError::Invalid("world.start_entry is empty".to_string()));
        }
        Ok(())
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.world.data_dir.join("maps")
    }

    pub fn quests_dir(&self) -> PathBuf {
        self.world.data_dir.join("quests")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.world.data_dir.join("scripts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = GameConfig::load(&temp_dir.path().join("game.toml")).unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.maps_dir(), PathBuf::from("data/maps"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game.toml");
        std::fs::write(&path, "[player]\ninventory_capacity = 3\n").unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.player.inventory_capacity, 3);
        assert_eq!(config.world.start_map, "castle");
        assert_eq!(config.save.path, PathBuf::from("saves/britannia.json"));
    }

    #[test]
    fn test_empty_start_map_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game.toml");
        std::fs::write(&path, "[world]\nstart_map = \"\"\n").unwrap();

        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Invalid(_))));
    }
}
