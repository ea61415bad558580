//! Quest System Module
//!
//! Quest definitions loaded from TOML, the per-player stage ledger, and
//! the journal view the UI renders from it.

pub mod definition;
pub mod journal;
pub mod ledger;
pub mod registry;

pub use definition::Quest;
pub use journal::{Journal, JournalEntry};
pub use ledger::{LedgerEntry, QuestLedger};
pub use registry::QuestRegistry;
