//! World Map Registry
//!
//! Loads every map definition once, validates cross-map references, and
//! hands out [`MapId`]s. A `MapId` only comes from a registry, so holding
//! one means the map was found at load time.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::{info, warn};

use super::definition::{EntryPoint, Map, RawMap, RawMapFile};
use crate::error::{TransitionError, WorldError};

/// Validated map identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(Arc<str>);

impl MapId {
    pub(crate) fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MapId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for MapId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Registry for all loaded maps
#[derive(Debug, Clone, Default)]
pub struct WorldRegistry {
    maps: HashMap<MapId, Map>,
}

impl WorldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all `*.toml` map files under `dir` (recursively)
    pub fn load_from_directory(dir: &Path) -> Result<Self, WorldError> {
        info!("Loading maps from {:?}", dir);

        if !dir.exists() {
            warn!("Map directory does not exist: {:?}", dir);
            return Ok(Self::new());
        }

        let mut paths = Vec::new();
        collect_toml_files(dir, &mut paths)?;
        paths.sort();

        let mut raws = Vec::with_capacity(paths.len());
        for path in paths {
            let content = std::fs::read_to_string(&path).map_err(|source| WorldError::Io {
                path: path.clone(),
                source,
            })?;
            let file: RawMapFile = toml::from_str(&content).map_err(|source| WorldError::Parse {
                path: path.clone(),
                source,
            })?;
            raws.push(file.map);
        }

        Self::from_raw_maps(raws)
    }

    /// Build a registry from TOML sources held in memory
    pub fn from_toml_strs<'a, I>(sources: I) -> Result<Self, WorldError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut raws = Vec::new();
        for src in sources {
            let file: RawMapFile = toml::from_str(src).map_err(|source| WorldError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
            raws.push(file.map);
        }
        Self::from_raw_maps(raws)
    }

    /// Resolve raw maps into a registry, failing on the first dangling reference
    pub fn from_raw_maps(raws: Vec<RawMap>) -> Result<Self, WorldError> {
        let mut by_id: HashMap<&str, &RawMap> = HashMap::new();
        for raw in &raws {
            if by_id.insert(raw.id.as_str(), raw).is_some() {
                return Err(WorldError::Duplicate {
                    kind: "map",
                    id: raw.id.clone(),
                });
            }
        }

        let ids: HashMap<&str, MapId> = by_id.keys().map(|id| (*id, MapId::new(id))).collect();

        let resolve_target = |map: &str, entry: &str| -> Result<MapId, TransitionError> {
            let target = by_id
                .get(map)
                .ok_or_else(|| TransitionError::UnknownMap(map.to_string()))?;
            if !target.entry_points.contains_key(entry) {
                return Err(TransitionError::UnknownEntryPoint {
                    map: map.to_string(),
                    entry: entry.to_string(),
                });
            }
            Ok(ids[map].clone())
        };

        let mut maps = HashMap::with_capacity(raws.len());
        for raw in &raws {
            let id = ids[raw.id.as_str()].clone();
            let map = Map::from_raw(raw, id.clone(), &resolve_target)?;
            info!(
                "Loaded map: {} ({}) with {} npcs, {} objects",
                map.name,
                id,
                map.npcs().len(),
                map.objects().len()
            );
            maps.insert(id, map);
        }

        info!("Loaded {} maps", maps.len());
        Ok(Self { maps })
    }

    /// Look up a map identifier
    pub fn resolve(&self, map_id: &str) -> Result<MapId, TransitionError> {
        self.maps
            .get_key_value(map_id)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| TransitionError::UnknownMap(map_id.to_string()))
    }

    /// Look up a map and one of its entry points together
    pub fn entry_point(&self, map_id: &str, entry: &str) -> Result<(MapId, EntryPoint), TransitionError> {
        let (id, map) = self
            .maps
            .get_key_value(map_id)
            .ok_or_else(|| TransitionError::UnknownMap(map_id.to_string()))?;
        let point = map
            .entry_point(entry)
            .ok_or_else(|| TransitionError::UnknownEntryPoint {
                map: map_id.to_string(),
                entry: entry.to_string(),
            })?;
        Ok((id.clone(), *point))
    }

    pub fn get(&self, map_id: &str) -> Option<&Map> {
        self.maps.get(map_id)
    }

    pub(crate) fn get_mut(&mut self, map_id: &str) -> Option<&mut Map> {
        self.maps.get_mut(map_id)
    }

    /// All map ids, sorted
    pub fn map_ids(&self) -> Vec<MapId> {
        let mut ids: Vec<MapId> = self.maps.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn maps(&self) -> impl Iterator<Item = &Map> {
        self.maps.values()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

fn collect_toml_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), WorldError> {
    let io_err = |source| WorldError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_toml_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }

    Ok(())
}
