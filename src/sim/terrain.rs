//! Tile grid terrain
//!
//! The arena floor is a fixed `MAP_DIMENSION`² grid of tiles. Each tile has a
//! height, a surface normal for grounding and a material index. A tile may
//! also carry one static collider (props stamped in at placement time).
//!
//! World positions map to tiles by `raw >> TILE_SHIFT`; lookups clamp to the
//! grid edge so callers never index off the map.

use crate::consts::{MAP_DIMENSION, TILE_SHIFT};
use crate::error::ArenaError;

use super::collision::{Aabb, Probe};
use super::fixed::Fxp;
use super::vector::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub height: Fxp,
    pub normal: Vec3,
    /// Raw texture index from the arena data
    pub texture: u16,
}

impl Tile {
    pub const fn flat(height: Fxp) -> Self {
        Self {
            height,
            normal: Vec3::UP,
            texture: 0,
        }
    }
}

/// Grid coordinate, always inside the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    x: usize,
    y: usize,
}

impl TileCoord {
    /// `None` when either axis is off the grid
    pub const fn new(x: usize, y: usize) -> Option<Self> {
        if x < MAP_DIMENSION && y < MAP_DIMENSION {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub const fn x(self) -> usize {
        self.x
    }

    pub const fn y(self) -> usize {
        self.y
    }

    fn index(self) -> usize {
        self.x + self.y * MAP_DIMENSION
    }
}

/// What lies under a world position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ground {
    pub height: Fxp,
    pub normal: Vec3,
    /// Texture index relative to the first terrain texture
    pub material: u16,
    pub collider: Option<Aabb>,
}

#[derive(Debug, Clone)]
pub struct Terrain {
    tiles: Vec<Tile>,
    colliders: Vec<Option<Aabb>>,
    first_texture: u16,
}

impl Terrain {
    pub const TILE_COUNT: usize = MAP_DIMENSION * MAP_DIMENSION;

    /// Build from row-major tiles (`x + y * MAP_DIMENSION`)
    pub fn new(tiles: Vec<Tile>, first_texture: u16) -> Result<Self, ArenaError> {
        if tiles.len() != Self::TILE_COUNT {
            return Err(ArenaError::TileCount {
                expected: Self::TILE_COUNT,
                found: tiles.len(),
            });
        }
        Ok(Self {
            tiles,
            colliders: vec![None; Self::TILE_COUNT],
            first_texture,
        })
    }

    /// Level terrain at a single height
    pub fn flat(height: Fxp) -> Self {
        Self {
            tiles: vec![Tile::flat(height); Self::TILE_COUNT],
            colliders: vec![None; Self::TILE_COUNT],
            first_texture: 0,
        }
    }

    /// Length of one side of the arena in world units
    pub const fn world_size() -> Fxp {
        Fxp::from_raw((MAP_DIMENSION as i32) << TILE_SHIFT)
    }

    /// Unclamped tile coordinates of a position
    pub fn raw_tile_of(position: &Vec3) -> (i32, i32) {
        (
            position.x.raw() >> TILE_SHIFT,
            position.y.raw() >> TILE_SHIFT,
        )
    }

    /// Whether a position lies over the grid
    pub fn contains(position: &Vec3) -> bool {
        let (x, y) = Self::raw_tile_of(position);
        let size = MAP_DIMENSION as i32;
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    /// Tile under a position, clamped to the grid
    pub fn tile_index_of(position: &Vec3) -> TileCoord {
        let (x, y) = Self::raw_tile_of(position);
        let max = MAP_DIMENSION as i32 - 1;
        TileCoord {
            x: x.clamp(0, max) as usize,
            y: y.clamp(0, max) as usize,
        }
    }

    pub fn tile(&self, coord: TileCoord) -> &Tile {
        &self.tiles[coord.index()]
    }

    pub fn tile_mut(&mut self, coord: TileCoord) -> &mut Tile {
        &mut self.tiles[coord.index()]
    }

    pub fn ground_at(&self, position: &Vec3) -> Ground {
        let coord = Self::tile_index_of(position);
        let tile = self.tile(coord);
        Ground {
            height: tile.height,
            normal: tile.normal,
            material: tile.texture.saturating_sub(self.first_texture),
            collider: self.colliders[coord.index()],
        }
    }

    /// Install (or with `None`, clear) the static collider of the tile under
    /// `position`. Returns the collider it replaced.
    pub fn set_static_collider(&mut self, position: &Vec3, collider: Option<Aabb>) -> Option<Aabb> {
        let coord = Self::tile_index_of(position);
        std::mem::replace(&mut self.colliders[coord.index()], collider)
    }

    pub fn static_collider(&self, coord: TileCoord) -> Option<&Aabb> {
        self.colliders[coord.index()].as_ref()
    }

    /// First static collider within `radius` tiles of `position` that the
    /// probe overlaps, scanning columns (x) outermost. Cells off the grid are
    /// skipped, not clamped.
    pub fn find_static_collision(&self, position: &Vec3, radius: u16, probe: &Probe) -> Option<&Aabb> {
        let (cx, cy) = Self::raw_tile_of(position);
        let radius = radius as i32;
        let size = MAP_DIMENSION as i32;

        for x in (cx - radius)..=(cx + radius) {
            if !(0..size).contains(&x) {
                continue;
            }
            for y in (cy - radius)..=(cy + radius) {
                if !(0..size).contains(&y) {
                    continue;
                }
                let coord = TileCoord {
                    x: x as usize,
                    y: y as usize,
                };
                if let Some(collider) = self.static_collider(coord) {
                    if probe.hits(collider) {
                        return Some(collider);
                    }
                }
            }
        }
        None
    }

    /// Remove every static collider. Returns how many were installed.
    pub fn clear_colliders(&mut self) -> usize {
        let mut cleared = 0;
        for collider in &mut self.colliders {
            if collider.take().is_some() {
                cleared += 1;
            }
        }
        cleared
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tile_center(x: i32, y: i32) -> Vec3 {
        Vec3::from_ints(x * 8 + 4, y * 8 + 4, 0)
    }

    #[test]
    fn test_tile_index_clamps() {
        assert_eq!(
            Terrain::tile_index_of(&Vec3::from_ints(-50, 9, 0)),
            TileCoord::new(0, 1).unwrap()
        );
        assert_eq!(
            Terrain::tile_index_of(&Vec3::from_ints(1000, 1000, 0)),
            TileCoord::new(19, 19).unwrap()
        );
        assert!(!Terrain::contains(&Vec3::from_ints(-1, 4, 0)));
        assert!(Terrain::contains(&Vec3::from_ints(159, 0, 0)));
        assert!(!Terrain::contains(&Vec3::from_ints(160, 0, 0)));
    }

    #[test]
    fn test_ground_material_is_relative() {
        let mut terrain = Terrain::new(vec![Tile::flat(Fxp::ONE); Terrain::TILE_COUNT], 10).unwrap();
        terrain.tile_mut(TileCoord::new(2, 3).unwrap()).texture = 14;
        let ground = terrain.ground_at(&tile_center(2, 3));
        assert_eq!(ground.material, 4);
        assert_eq!(ground.height, Fxp::ONE);
    }

    #[test]
    fn test_wrong_tile_count() {
        assert!(matches!(
            Terrain::new(vec![Tile::flat(Fxp::ZERO); 3], 0),
            Err(ArenaError::TileCount { found: 3, .. })
        ));
    }

    #[test]
    fn test_static_collider_replace_and_clear() {
        let mut terrain = Terrain::flat(Fxp::ZERO);
        let at = tile_center(5, 5);
        let first = Aabb::from_center_extent(at, Vec3::from_ints(1, 1, 1));
        let second = Aabb::from_center_extent(at, Vec3::from_ints(2, 2, 2));

        assert_eq!(terrain.set_static_collider(&at, Some(first)), None);
        assert_eq!(terrain.set_static_collider(&at, Some(second)), Some(first));
        assert_eq!(terrain.ground_at(&at).collider, Some(second));
        assert_eq!(terrain.set_static_collider(&at, None), Some(second));
        assert_eq!(terrain.collider_count(), 0);
    }

    #[test]
    fn test_find_static_collision_neighbourhood() {
        let mut terrain = Terrain::flat(Fxp::ZERO);
        let wall_at = tile_center(7, 5);
        let wall = Aabb::from_center_extent(wall_at, Vec3::from_ints(3, 3, 12));
        terrain.set_static_collider(&wall_at, Some(wall));

        // radius 2 around (5, 5) reaches (7, 5)
        let probe = Probe::Box(Aabb::from_center_extent(
            Vec3::from_ints(56, 44, 0),
            Vec3::from_ints(4, 4, 4),
        ));
        assert_eq!(terrain.find_static_collision(&tile_center(5, 5), 2, &probe), Some(&wall));
        assert_eq!(terrain.find_static_collision(&tile_center(5, 5), 1, &probe), None);

        // point probes only hit the cell's box
        let inside = Probe::Point(wall_at);
        let outside = Probe::Point(tile_center(7, 5) + Vec3::from_ints(0, 0, 20));
        assert!(terrain.find_static_collision(&wall_at, 0, &inside).is_some());
        assert!(terrain.find_static_collision(&wall_at, 0, &outside).is_none());
    }

    #[test]
    fn test_find_static_collision_scans_columns_first() {
        let mut terrain = Terrain::flat(Fxp::ZERO);
        let column_first = tile_center(5, 7);
        let row_first = tile_center(6, 5);
        for at in [column_first, row_first] {
            terrain.set_static_collider(&at, Some(Aabb::from_center_extent(at, Vec3::from_ints(3, 3, 3))));
        }

        let probe = Probe::Box(Aabb::from_center_extent(
            tile_center(5, 5),
            Vec3::from_ints(30, 30, 30),
        ));
        let hit = terrain.find_static_collision(&tile_center(5, 5), 2, &probe);
        assert_eq!(hit.map(Aabb::center), Some(column_first));
    }

    #[test]
    fn test_tile_coord_rejects_off_grid() {
        assert!(TileCoord::new(MAP_DIMENSION, 0).is_none());
        assert!(TileCoord::new(0, MAP_DIMENSION).is_none());
        let corner = TileCoord::new(MAP_DIMENSION - 1, MAP_DIMENSION - 1).unwrap();
        assert_eq!((corner.x(), corner.y()), (19, 19));
        assert_eq!(Terrain::flat(Fxp::from_int(2)).tile(corner).height, Fxp::from_int(2));
    }

    #[test]
    fn test_find_static_collision_at_edge_skips_off_grid() {
        let mut terrain = Terrain::flat(Fxp::ZERO);
        let corner = tile_center(0, 0);
        terrain.set_static_collider(
            &corner,
            Some(Aabb::from_center_extent(corner, Vec3::from_ints(3, 3, 3))),
        );
        let probe = Probe::Point(corner);
        assert!(terrain.find_static_collision(&Vec3::from_ints(-20, -20, 0), 3, &probe).is_some());
        assert!(terrain.find_static_collision(&Vec3::from_ints(-20, -20, 0), 1, &probe).is_none());
    }

    #[test]
    fn test_clear_colliders() {
        let mut terrain = Terrain::flat(Fxp::ZERO);
        for i in 0..4 {
            let at = tile_center(i, i);
            terrain.set_static_collider(&at, Some(Aabb::point(at)));
        }
        assert_eq!(terrain.clear_colliders(), 4);
        assert_eq!(terrain.collider_count(), 0);
    }

    proptest! {
        #[test]
        fn tile_index_in_range(x in any::<i32>(), y in any::<i32>()) {
            let coord = Terrain::tile_index_of(&Vec3::new(Fxp::from_raw(x), Fxp::from_raw(y), Fxp::ZERO));
            prop_assert!(coord.x() < MAP_DIMENSION);
            prop_assert!(coord.y() < MAP_DIMENSION);
        }

        #[test]
        fn tile_index_is_monotonic(a in any::<i32>(), b in any::<i32>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let at = |raw| Terrain::tile_index_of(&Vec3::new(Fxp::from_raw(raw), Fxp::from_raw(raw), Fxp::ZERO));
            prop_assert!(at(lo).x() <= at(hi).x());
            prop_assert!(at(lo).y() <= at(hi).y());
        }
    }
}
