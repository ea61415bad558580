//! Terrain grid for a single map.
//! Walkability here covers terrain only; actors are checked by the map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::player::TilePos;

/// Terrain kinds that can appear in a map layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Grass,
    Trees,
    Water,
    Path,
    Garden,
    Courtyard,
    CastleFloor,
    CastleWall,
    RedCarpet,
    CaveFloor,
    CaveWall,
    CaveEntrance,
    CaveExit,
}

impl Terrain {
    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Grass => "Meadow",
            Terrain::Trees => "Woodland",
            Terrain::Water => "Stream",
            Terrain::Path => "Path",
            Terrain::Garden => "Garden",
            Terrain::Courtyard => "Courtyard",
            Terrain::CastleFloor => "Castle Floor",
            Terrain::CastleWall => "Wall",
            Terrain::RedCarpet => "Royal Carpet",
            Terrain::CaveFloor => "Cave Floor",
            Terrain::CaveWall => "Cave Wall",
            Terrain::CaveEntrance => "Cave Entrance",
            Terrain::CaveExit => "Cave Exit",
        }
    }

    pub fn is_passable(&self) -> bool {
        !matches!(
            self,
            Terrain::Trees | Terrain::Water | Terrain::CastleWall | Terrain::CaveWall
        )
    }
}

/// Largest width or height a map may declare
pub const MAX_MAP_SIDE: u32 = 1024;

/// Fixed-size grid of terrain, row-major
#[derive(Debug, Clone)]
pub struct Tilemap {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Terrain>,
}

impl Tilemap {
    /// Create a map filled with a single terrain.
    ///
    /// Each side must be between 1 and [`MAX_MAP_SIDE`] tiles.
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err("map has no tiles".to_string());
        }
        if width > MAX_MAP_SIDE || height > MAX_MAP_SIDE {
            return Err(format!(
                "map size {}x{} exceeds the {}x{} limit",
                width, height, MAX_MAP_SIDE, MAX_MAP_SIDE
            ));
        }
        let len = width
            .checked_mul(height)
            .ok_or_else(|| format!("map size {}x{} overflows", width, height))?;

        Ok(Self {
            width,
            height,
            tiles: vec![terrain; len as usize],
        })
    }

    /// Build a grid from ASCII rows and a legend.
    ///
    /// Missing dimensions are taken from the layout. Rows shorter than the
    /// width, and rows past the end of the layout, keep `default`. Rows
    /// longer than the width, or more rows than the height, are rejected.
    pub fn from_layout(
        layout: &[String],
        legend: &HashMap<char, Terrain>,
        default: Terrain,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Self, String> {
        let side = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let width = width.unwrap_or_else(|| side(layout.iter().map(|row| row.chars().count()).max().unwrap_or(0)));
        let height = height.unwrap_or_else(|| side(layout.len()));

        if layout.len() > height as usize {
            return Err(format!("layout has {} rows but height is {}", layout.len(), height));
        }

        let mut map = Self::filled(width, height, default)?;

        for (y, row) in layout.iter().enumerate() {
            let len = row.chars().count();
            if len > width as usize {
                return Err(format!("layout row {} has {} tiles but width is {}", y, len, width));
            }
            for (x, ch) in row.chars().enumerate() {
                let terrain = legend
                    .get(&ch)
                    .copied()
                    .ok_or_else(|| format!("layout symbol '{}' at ({}, {}) is not in the legend", ch, x, y))?;
                let idx = y * width as usize + x;
                map.tiles[idx] = terrain;
            }
        }

        Ok(map)
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    pub fn terrain_at(&self, pos: TilePos) -> Option<Terrain> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = (pos.y as u32 * self.width + pos.x as u32) as usize;
        self.tiles.get(idx).copied()
    }

    /// Check if a grid tile is in bounds and passable
    pub fn is_tile_walkable(&self, pos: TilePos) -> bool {
        self.terrain_at(pos).is_some_and(|t| t.is_passable())
    }
}
