//! Read-only journal view built from the ledger.

use serde::Serialize;

use super::ledger::QuestLedger;
use super::registry::QuestRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub quest_id: String,
    pub title: String,
    pub stage: u32,
    pub text: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Journal {
    pub entries: Vec<JournalEntry>,
}

impl Journal {
    /// Every started quest, ordered by quest id
    pub fn build(ledger: &QuestLedger, quests: &QuestRegistry) -> Self {
        let entries = ledger
            .started()
            .map(|(quest_id, stage)| match quests.get(quest_id) {
                Some(quest) => JournalEntry {
                    quest_id: quest_id.to_string(),
                    title: quest.title.clone(),
                    stage,
                    text: quest.stage_text(stage).map(str::to_string),
                    completed: quest.is_complete_at(stage),
                },
                None => JournalEntry {
                    quest_id: quest_id.to_string(),
                    title: quest_id.to_string(),
                    stage,
                    text: None,
                    completed: false,
                },
            })
            .collect();

        Self { entries }
    }

    pub fn active(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(|e| !e.completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(|e| e.completed)
    }

    pub fn entry(&self, quest_id: &str) -> Option<&JournalEntry> {
        self.entries.iter().find(|e| e.quest_id == quest_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quests() -> QuestRegistry {
        QuestRegistry::from_toml_strs([r#"
[quest]
id = "orb_quest"
title = "The Stolen Orb"
final_stage = 3

[quest.stages]
1 = "Find the orb."
3 = "Done."
"#])
        .unwrap()
    }

    #[test]
    fn test_empty_ledger_empty_journal() {
        let journal = Journal::build(&QuestLedger::new(), &quests());
        assert!(journal.is_empty());
    }

    #[test]
    fn test_journal_tracks_progress() {
        let quests = quests();
        let mut ledger = QuestLedger::new();

        ledger.advance_to("orb_quest", 1).unwrap();
        let journal = Journal::build(&ledger, &quests);
        let entry = journal.entry("orb_quest").unwrap();
        assert_eq!(entry.title, "The Stolen Orb");
        assert_eq!(entry.text.as_deref(), Some("Find the orb."));
        assert_eq!(journal.active().count(), 1);

        ledger.advance_to("orb_quest", 3).unwrap();
        let journal = Journal::build(&ledger, &quests);
        assert_eq!(journal.completed().count(), 1);
        assert_eq!(journal.active().count(), 0);
    }

    #[test]
    fn test_unknown_quest_uses_id_as_title() {
        let mut ledger = QuestLedger::new();
        ledger.advance_to("side_errand", 1).unwrap();

        let journal = Journal::build(&ledger, &quests());
        let entry = journal.entry("side_errand").unwrap();
        assert_eq!(entry.title, "side_errand");
        assert!(entry.text.is_none());
        assert!(!entry.completed);
    }
}
