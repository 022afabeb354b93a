//! Arena Brawl - deterministic simulation core for a tile-based arena combat game
//!
//! Core modules:
//! - `sim`: Fixed-point simulation (terrain, actors, collisions, match flow)
//! - `settings`: Per-match configuration
//! - `error`: Error types surfaced by loading and spawning

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ArenaError, RegistryError, SettingsError};
pub use settings::MatchSettings;
pub use sim::fixed::Fxp;
pub use sim::vector::Vec3;

/// Game configuration constants
pub mod consts {
    use crate::sim::fixed::Fxp;

    /// Fixed simulation timestep (60 Hz, one frame per vblank)
    pub const SIM_DT: Fxp = Fxp::from_ratio(1, 60);

    /// Arena grid is MAP_DIMENSION × MAP_DIMENSION tiles
    pub const MAP_DIMENSION: usize = 20;
    /// World units per tile side, as a shift (8 units)
    pub const TILE_UNIT_SHIFT: u32 = 3;
    /// Shift from a raw fixed-point coordinate to a tile index
    pub const TILE_SHIFT: u32 = 16 + TILE_UNIT_SHIFT;
    /// Raw tile depth to terrain height shift
    pub const DEPTH_SHIFT: u32 = 14;

    pub const MAX_PLAYERS: u8 = 4;
    /// Controller ports the input layer can address
    pub const MAX_CONTROLLERS: usize = 12;

    /// Player (half-extent of the collision box)
    pub const PLAYER_SIZE: Fxp = Fxp::from_int(4);
    /// Radians per second
    pub const PLAYER_ROTATION_SPEED: Fxp = Fxp::from_int(4);
    /// Units per second
    pub const PLAYER_MOVEMENT_SPEED: Fxp = Fxp::from_int(30);
    pub const PLAYER_MAX_HEALTH: i16 = 6;
    /// Frames between shots
    pub const FIRE_COOLDOWN_FRAMES: u8 = 0x1b;
    /// Terrain materials that slow players down
    pub const WATER_MATERIALS: [u16; 2] = [4, 6];
    pub const WATER_SLOWDOWN: Fxp = Fxp::from_ratio(6, 10);

    /// Bullet
    pub const BULLET_DAMAGE: i16 = 2;
    pub const BULLET_SPEED: Fxp = Fxp::from_int(50);
    pub const BULLET_DOWN_FORCE_LIMIT: Fxp = Fxp::from_ratio(15, 100);
    /// Height the bullet keeps above the ground
    pub const BULLET_GROUND_CLEARANCE: Fxp = Fxp::from_int(3);
    pub const BULLET_GRAVITY: Fxp = Fxp::from_ratio(-106, 10);
    /// Velocity kept after skipping off a slope
    pub const BULLET_SKIP_DAMPING: Fxp = Fxp::from_ratio(7, 10);
    /// Ticks before a bullet expires on its own
    pub const BULLET_LIFETIME: u16 = 0x3ff;
    pub const BULLET_EXPLOSION_SCALE: Fxp = Fxp::from_ratio(1, 4);

    /// Bomb
    pub const BOMB_DAMAGE: i16 = 3;
    pub const BOMB_BLAST_RADIUS: Fxp = Fxp::from_int(13);
    pub const BOMB_GRAVITY: Fxp = Fxp::from_ratio(-6, 10);
    /// Seconds on the ground before detonation
    pub const BOMB_FUSE: Fxp = Fxp::from_int(3);
    /// Upward throw speed, scaled by the frame time at throw
    pub const BOMB_THROW_LIFT: Fxp = Fxp::from_int(15);
    pub const BOMB_EXPLOSION_LIFT: Fxp = Fxp::from_int(3);

    /// Mine
    pub const MINE_DAMAGE: i16 = 2;
    pub const MINE_SIZE: Fxp = Fxp::from_int(2);
    /// Seconds before an untouched mine goes off by itself
    pub const MINE_FUSE: Fxp = Fxp::from_int(35);
    /// Seconds during which the placing player cannot trigger it
    pub const MINE_SAFE_TIME: Fxp = Fxp::from_int(3);
    pub const MINE_EXPLOSION_SCALE: Fxp = Fxp::HALF;

    /// Pickup crate
    pub const CRATE_HEALTH_PACK: i16 = 2;
    /// Units per second
    pub const CRATE_FALL_SPEED: Fxp = Fxp::from_int(15);
    pub const CRATE_SPAWN_HEIGHT: Fxp = Fxp::from_int(150);
    pub const CRATE_SIZE: Fxp = Fxp::from_int(4);
    /// The pickup roll is uniform over 1..=PICKUP_ROLL_SIDES
    pub const PICKUP_ROLL_SIDES: u8 = 30;
    pub const PICKUP_BOMB_ABOVE: u8 = 25;
    pub const PICKUP_HEALTH_ABOVE: u8 = 18;

    /// Explosion sprite
    pub const EXPLOSION_FRAME_TIME: Fxp = Fxp::from_ratio(1, 10);
    pub const EXPLOSION_FRAMES: u8 = 6;

    /// Static detail collider half-extents
    pub const STATIC_DETAIL_EXTENT_XY: Fxp = Fxp::from_int(3);
    pub const STATIC_DETAIL_EXTENT_Z: Fxp = Fxp::from_int(12);

    /// Model table indices handed to the renderer
    pub const MODEL_CRATE: u16 = 0;
    pub const MODEL_PLAYER: u16 = 1;
    pub const MODEL_BOMB: u16 = 6;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(mut angle: Fxp) -> Fxp {
    while angle >= Fxp::TAU {
        angle -= Fxp::TAU;
    }
    while angle < Fxp::ZERO {
        angle += Fxp::TAU;
    }
    angle
}
