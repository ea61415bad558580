//! Quest Registry
//!
//! Loads and caches quest definitions from TOML files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::definition::{Quest, RawQuestFile};
use crate::error::WorldError;

/// Registry for all quest definitions
#[derive(Debug, Clone, Default)]
pub struct QuestRegistry {
    quests: HashMap<String, Quest>,
}

impl QuestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all quest definitions from a directory.
    ///
    /// A file that fails to parse is logged and skipped; the rest still load.
    pub fn load_from_directory(dir: &Path) -> Result<Self, WorldError> {
        info!("Loading quests from {:?}", dir);

        let mut registry = Self::new();
        if !dir.exists() {
            warn!("Quest directory does not exist: {:?}", dir);
            return Ok(registry);
        }

        let entries = std::fs::read_dir(dir).map_err(|source| WorldError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        for path in paths {
            if let Err(e) = registry.load_quest_file(&path) {
                warn!("Failed to load quest {:?}: {}", path, e);
            }
        }

        info!("Loaded {} quest definitions", registry.len());
        Ok(registry)
    }

    fn load_quest_file(&mut self, path: &Path) -> Result<(), WorldError> {
        let content = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawQuestFile = toml::from_str(&content).map_err(|source| WorldError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let quest = Quest::from_raw(&raw.quest)?;
        info!("Loaded quest: {} ({})", quest.title, quest.id);
        self.insert(quest)
    }

    /// Build a registry from TOML sources held in memory
    pub fn from_toml_strs<'a, I>(sources: I) -> Result<Self, WorldError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut registry = Self::new();
        for src in sources {
            let raw: RawQuestFile = toml::from_str(src).map_err(|source| WorldError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
            registry.insert(Quest::from_raw(&raw.quest)?)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, quest: Quest) -> Result<(), WorldError> {
        if self.quests.contains_key(&quest.id) {
            return Err(WorldError::Duplicate {
                kind: "quest",
                id: quest.id,
            });
        }
        self.quests.insert(quest.id.clone(), quest);
        Ok(())
    }

    /// Get a quest by ID
    pub fn get(&self, quest_id: &str) -> Option<&Quest> {
        self.quests.get(quest_id)
    }

    pub fn contains(&self, quest_id: &str) -> bool {
        self.quests.contains_key(quest_id)
    }

    /// Journal text for a quest at a stage
    pub fn stage_text(&self, quest_id: &str, stage: u32) -> Option<&str> {
        self.get(quest_id).and_then(|q| q.stage_text(stage))
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}
