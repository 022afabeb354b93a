//! Arena data
//!
//! Arenas are loaded from JSON: a row-major tile array, optional per-tile
//! normals and a list of placement records (player spawns, props, crates).
//! Loading resolves heights and world positions; spawning the actors is the
//! world's job.

use serde::{Deserialize, Serialize};

use crate::consts::{DEPTH_SHIFT, MAP_DIMENSION, TILE_UNIT_SHIFT};
use crate::error::ArenaError;

use super::fixed::Fxp;
use super::terrain::{Terrain, Tile};
use super::vector::Vec3;

/// One tile as stored in arena data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileRecord {
    /// 6-bit height step
    pub depth: u8,
    /// Quarter turns; not used by the simulation
    #[serde(default)]
    pub rotation: u8,
    pub texture: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementKind {
    Empty,
    PlayerSpawn,
    Model,
    Crate,
}

/// Placement as stored in arena data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub kind: PlacementKind,
    pub tile_x: u16,
    pub tile_y: u16,
    /// Facing in radians
    #[serde(default)]
    pub direction: Fxp,
    /// Kind-specific bytes (model index, crate flags and respawn time)
    #[serde(default)]
    pub reserved: [u8; 2],
}

impl PlacementRecord {
    pub fn new(kind: PlacementKind, tile_x: u16, tile_y: u16) -> Self {
        Self {
            kind,
            tile_x,
            tile_y,
            direction: Fxp::ZERO,
            reserved: [0; 2],
        }
    }

    pub fn facing(mut self, direction: Fxp) -> Self {
        self.direction = direction;
        self
    }

    pub fn reserved(mut self, reserved: [u8; 2]) -> Self {
        self.reserved = reserved;
        self
    }
}

/// Resolved placement in world space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub kind: PlacementKind,
    /// Tile centre at tile height
    pub location: Vec3,
    pub angle: Fxp,
    pub reserved: [u8; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaData {
    pub tiles: Vec<TileRecord>,
    /// Per-tile normals; empty means every tile faces straight up
    #[serde(default)]
    pub normals: Vec<Vec3>,
    #[serde(default)]
    pub placements: Vec<PlacementRecord>,
    /// Texture index that maps to material 0
    #[serde(default)]
    pub first_texture: u16,
}

/// Terrain plus placements ready to spawn
#[derive(Debug, Clone)]
pub struct LoadedArena {
    pub terrain: Terrain,
    pub placements: Vec<Placement>,
}

impl ArenaData {
    pub fn from_json(json: &str) -> Result<Self, ArenaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Level arena with every tile at `depth`
    pub fn flat(depth: u8) -> Self {
        Self {
            tiles: vec![
                TileRecord {
                    depth,
                    ..Default::default()
                };
                Terrain::TILE_COUNT
            ],
            normals: Vec::new(),
            placements: Vec::new(),
            first_texture: 0,
        }
    }

    pub fn with_placement(mut self, placement: PlacementRecord) -> Self {
        self.placements.push(placement);
        self
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut TileRecord {
        &mut self.tiles[x + y * MAP_DIMENSION]
    }

    /// Smoothed height of a tile: the mean of its own depth and the three
    /// tiles at +x, +y and +x+y, clamped at the far edge
    fn tile_height(&self, x: usize, y: usize) -> Fxp {
        let last = MAP_DIMENSION - 1;
        let (x2, y2) = ((x + 1).min(last), (y + 1).min(last));
        let depth = |x: usize, y: usize| (self.tiles[x + y * MAP_DIMENSION].depth as i32) << DEPTH_SHIFT;
        let sum = depth(x, y) + depth(x, y2) + depth(x2, y2) + depth(x2, y);
        Fxp::from_raw(sum / 4)
    }

    /// Validate and resolve into terrain and world-space placements
    pub fn load(&self) -> Result<LoadedArena, ArenaError> {
        if self.tiles.len() != Terrain::TILE_COUNT {
            return Err(ArenaError::TileCount {
                expected: Terrain::TILE_COUNT,
                found: self.tiles.len(),
            });
        }
        if !self.normals.is_empty() && self.normals.len() != Terrain::TILE_COUNT {
            return Err(ArenaError::NormalCount {
                expected: Terrain::TILE_COUNT,
                found: self.normals.len(),
            });
        }

        let mut tiles = Vec::with_capacity(Terrain::TILE_COUNT);
        for y in 0..MAP_DIMENSION {
            for x in 0..MAP_DIMENSION {
                let index = x + y * MAP_DIMENSION;
                let normal = self.normals.get(index).copied().unwrap_or(Vec3::UP);
                // grounding divides by the vertical component
                if normal.z <= Fxp::ZERO {
                    return Err(ArenaError::DownwardNormal { x, y });
                }
                tiles.push(Tile {
                    height: self.tile_height(x, y),
                    normal,
                    texture: self.tiles[index].texture as u16,
                });
            }
        }
        let terrain = Terrain::new(tiles, self.first_texture)?;

        let placements = self
            .placements
            .iter()
            .map(|record| resolve_placement(record, &terrain))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Loaded arena: {} placements, first texture {}",
            placements.len(),
            self.first_texture
        );
        Ok(LoadedArena {
            terrain,
            placements,
        })
    }
}

fn resolve_placement(record: &PlacementRecord, terrain: &Terrain) -> Result<Placement, ArenaError> {
    let (x, y) = (record.tile_x as usize, record.tile_y as usize);
    if x >= MAP_DIMENSION || y >= MAP_DIMENSION {
        return Err(ArenaError::PlacementOutOfBounds {
            x: record.tile_x,
            y: record.tile_y,
        });
    }

    let centre = |tile: u16| (Fxp::from_int(tile as i32) + Fxp::HALF) << TILE_UNIT_SHIFT;
    let mut location = Vec3::new(centre(record.tile_x), centre(record.tile_y), Fxp::ZERO);
    location.z = terrain.ground_at(&location).height;

    Ok(Placement {
        kind: record.kind,
        location,
        angle: record.direction,
        reserved: record.reserved,
    })
}
