//! Interaction Engine (pickup)
//!
//! Resolves a "get" action on a world object. Unlike dialogue, the player
//! has to stand on the object's tile.

use tracing::{debug, info};

use crate::error::LedgerError;
use crate::player::Player;
use crate::quest::QuestLedger;
use crate::world::Map;

/// Result of a get action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickupOutcome {
    /// No such object on the map
    NothingHere,
    /// The object exists but cannot be taken right now
    NotAvailable { object_id: String },
    InventoryFull { object_id: String },
    Collected {
        object_id: String,
        name: String,
        /// Quest and stage the pickup advanced, if the object is quest-gated
        advanced: Option<(String, u32)>,
    },
}

/// Resolve a get action against `object_id` on `map`.
///
/// Nothing is mutated unless every precondition holds. On success the
/// object leaves the map for good and lands in the player's inventory.
pub fn resolve_get(
    ledger: &mut QuestLedger,
    player: &mut Player,
    map: &mut Map,
    object_id: &str,
) -> Result<PickupOutcome, LedgerError> {
    let Some(object) = map.object(object_id) else {
        return Ok(PickupOutcome::NothingHere);
    };

    let not_available = || PickupOutcome::NotAvailable {
        object_id: object_id.to_string(),
    };

    if player.map() != &map.id || player.position() != object.position {
        debug!("Pickup of {} ignored: player is not on its tile", object_id);
        return Ok(not_available());
    }

    let gate = object.quest.clone();
    if let Some(gate) = &gate {
        let stage = ledger.stage(&gate.quest_id);
        if stage != gate.required_stage {
            debug!(
                "Pickup of {} ignored: quest {} at stage {}, needs {}",
                object_id, gate.quest_id, stage, gate.required_stage
            );
            return Ok(not_available());
        }
    }

    if player.inventory().is_full() {
        return Ok(PickupOutcome::InventoryFull {
            object_id: object_id.to_string(),
        });
    }

    if let Some(gate) = &gate {
        ledger.advance_to(&gate.quest_id, gate.advance_to)?;
    }

    let Some(object) = map.take_object(object_id) else {
        return Ok(PickupOutcome::NothingHere);
    };
    player.add_item(object.to_inventory_item());
    info!("Picked up {} ({}) on {}", object.name, object.id, map.id);

    Ok(PickupOutcome::Collected {
        object_id: object.id,
        name: object.name,
        advanced: gate.map(|g| (g.quest_id, g.advance_to)),
    })
}
