//! Quest Ledger
//!
//! Maps quest ids to their current stage. A quest with no entry is at
//! stage 0. Stages only move forward; the ledger is written only by the
//! dialogue and pickup resolvers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub stage: u32,
    /// When the quest last advanced
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestLedger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl QuestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage of a quest, 0 if never advanced
    pub fn stage(&self, quest_id: &str) -> u32 {
        self.entries.get(quest_id).map_or(0, |e| e.stage)
    }

    pub fn updated_at(&self, quest_id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(quest_id).map(|e| e.updated_at)
    }

    /// Move a quest to `new_stage`.
    ///
    /// Fails without touching the ledger unless `new_stage` is strictly
    /// above the current stage. Callers check preconditions first.
    pub(crate) fn advance_to(&mut self, quest_id: &str, new_stage: u32) -> Result<(), LedgerError> {
        let current = self.stage(quest_id);
        if new_stage <= current {
            return Err(LedgerError::InvalidTransition {
                quest_id: quest_id.to_string(),
                current,
                requested: new_stage,
            });
        }

        self.entries.insert(
            quest_id.to_string(),
            LedgerEntry {
                stage: new_stage,
                updated_at: Utc::now(),
            },
        );
        info!("Quest '{}' advanced: stage {} -> {}", quest_id, current, new_stage);
        Ok(())
    }

    /// Quests past stage 0, ordered by id
    pub fn started(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.stage > 0)
            .map(|(id, e)| (id.as_str(), e.stage))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_quest_is_stage_zero() {
        let ledger = QuestLedger::new();
        assert_eq!(ledger.stage("orb_quest"), 0);
        assert!(ledger.updated_at("orb_quest").is_none());
    }

    #[test]
    fn test_advance_is_monotonic() {
        let mut ledger = QuestLedger::new();
        ledger.advance_to("orb_quest", 1).unwrap();
        ledger.advance_to("orb_quest", 3).unwrap();
        assert_eq!(ledger.stage("orb_quest"), 3);
        assert!(ledger.updated_at("orb_quest").is_some());

        // Duplicate and backward calls are rejected and change nothing
        let err = ledger.advance_to("orb_quest", 3).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidTransition {
                quest_id: "orb_quest".to_string(),
                current: 3,
                requested: 3,
            }
        );
        assert!(ledger.advance_to("orb_quest", 2).is_err());
        assert_eq!(ledger.stage("orb_quest"), 3);
    }

    #[test]
    fn test_advance_to_zero_rejected() {
        let mut ledger = QuestLedger::new();
        assert!(ledger.advance_to("orb_quest", 0).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_stage_never_decreases_over_any_sequence() {
        let mut ledger = QuestLedger::new();
        let requests = [2, 1, 5, 5, 0, 7, 3, 8, 8, 1];
        let mut last = 0;
        for requested in requests {
            let _ = ledger.advance_to("q", requested);
            let now = ledger.stage("q");
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 8);
    }

    #[test]
    fn test_started_skips_untouched() {
        let mut ledger = QuestLedger::new();
        ledger.advance_to("b_quest", 2).unwrap();
        ledger.advance_to("a_quest", 1).unwrap();

        let started: Vec<_> = ledger.started().collect();
        assert_eq!(started, vec![("a_quest", 1), ("b_quest", 2)]);
    }
}
