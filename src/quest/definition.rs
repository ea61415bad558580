//! Quest Definition Structures
//!
//! These structures are deserialized from TOML quest files.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::WorldError;

/// A quest definition file
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestFile {
    pub quest: RawQuest,
}

/// Raw quest data as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Stage at which the quest counts as complete
    pub final_stage: u32,
    /// Journal text keyed by stage. TOML keys are strings.
    #[serde(default)]
    pub stages: BTreeMap<String, String>,
}

/// A fully resolved quest definition
#[derive(Debug, Clone)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub final_stage: u32,
    stages: BTreeMap<u32, String>,
}

impl Quest {
    /// Create a Quest from raw TOML data
    pub fn from_raw(raw: &RawQuest) -> Result<Self, WorldError> {
        let invalid = |reason: String| WorldError::InvalidQuest {
            quest: raw.id.clone(),
            reason,
        };

        if raw.final_stage == 0 {
            return Err(invalid("final_stage must be above 0".to_string()));
        }

        let mut stages = BTreeMap::new();
        for (key, text) in &raw.stages {
            let stage: u32 = key
                .trim()
                .parse()
                .map_err(|_| invalid(format!("stage key '{}' is not a number", key)))?;
            if stage > raw.final_stage {
                return Err(invalid(format!(
                    "stage {} is past final_stage {}",
                    stage, raw.final_stage
                )));
            }
            stages.insert(stage, text.clone());
        }

        Ok(Self {
            id: raw.id.clone(),
            title: raw.title.clone(),
            description: raw.description.clone(),
            final_stage: raw.final_stage,
            stages,
        })
    }

    /// Journal text for a stage, falling back to the stage 0 text
    pub fn stage_text(&self, stage: u32) -> Option<&str> {
        self.stages
            .get(&stage)
            .or_else(|| self.stages.get(&0))
            .map(String::as_str)
    }

    pub fn is_complete_at(&self, stage: u32) -> bool {
        stage >= self.final_stage
    }
}
