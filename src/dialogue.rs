//! Dialogue Engine
//!
//! Turns a "talk" action into at most one quest advancement. The player
//! must stand next to the NPC and face it; anything else is ignored.

use tracing::debug;

use crate::error::LedgerError;
use crate::npc::Npc;
use crate::player::Player;
use crate::quest::QuestLedger;

/// Result of a talk action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueOutcome {
    /// Nobody in front of the player
    NoTarget,
    /// Dialogue shown, ledger untouched
    Idle { npc_id: String, line: String },
    /// Dialogue shown and the quest moved to `stage`
    Advanced {
        npc_id: String,
        quest_id: String,
        stage: u32,
        line: String,
    },
}

impl DialogueOutcome {
    pub fn line(&self) -> Option<&str> {
        match self {
            DialogueOutcome::NoTarget => None,
            DialogueOutcome::Idle { line, .. } | DialogueOutcome::Advanced { line, .. } => Some(line),
        }
    }
}

/// True when the tile the player faces is the NPC's tile on the same map
pub fn is_facing(player: &Player, npc: &Npc) -> bool {
    player.map() == &npc.home_map && player.facing_tile() == npc.position
}

/// Resolve a talk action against one NPC.
///
/// The only error is a ledger refusal, which the dialogue table rules out
/// at load time.
pub fn resolve_talk(ledger: &mut QuestLedger, player: &Player, npc: &Npc) -> Result<DialogueOutcome, LedgerError> {
    if !is_facing(player, npc) {
        debug!("Talk ignored: player at {} is not facing {}", player.position(), npc.id);
        return Ok(DialogueOutcome::NoTarget);
    }

    let idle = |line: &str| DialogueOutcome::Idle {
        npc_id: npc.id.clone(),
        line: line.to_string(),
    };

    let Some(quest_id) = npc.quest_id.as_deref() else {
        return Ok(idle(&npc.greeting));
    };

    let stage = ledger.stage(quest_id);
    let Some(entry) = npc.dialogue.entry(stage) else {
        debug!("{} has nothing new at stage {} of {}", npc.id, stage, quest_id);
        return Ok(idle(&npc.greeting));
    };

    match entry.advance_to {
        Some(next) if next > stage => {
            ledger.advance_to(quest_id, next)?;
            Ok(DialogueOutcome::Advanced {
                npc_id: npc.id.clone(),
                quest_id: quest_id.to_string(),
                stage: next,
                line: entry.text.clone(),
            })
        }
        _ => Ok(idle(&entry.text)),
    }
}
