//! World Map Registry Module
//!
//! Static map data (terrain, entry points, NPC and object placement)
//! loaded once from TOML at startup.

pub mod definition;
pub mod registry;

pub use definition::{EntryPoint, Map, RawMap, Transition};
pub use registry::{MapId, WorldRegistry};
