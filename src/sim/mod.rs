//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed-point arithmetic only
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (registration order)
//! - No rendering, audio or platform dependencies

pub mod actors;
pub mod arena;
pub mod collision;
pub mod fixed;
pub mod message;
pub mod registry;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod vector;

pub use actors::{Actor, ActorKind, ActorStatus, UpdateContext};
pub use arena::{ArenaData, LoadedArena, Placement, PlacementKind, PlacementRecord, TileRecord};
pub use collision::{Aabb, Collider, Probe};
pub use fixed::Fxp;
pub use message::{Message, MessageHandler, PickupKind};
pub use registry::{ActorId, Capability, Registry, Tracked};
pub use state::{DrawCall, GameEvent, MatchPhase, PlayerStatus, SoundCue, SpriteKind, Visual, World};
pub use terrain::{Ground, Terrain, Tile, TileCoord};
pub use tick::{Button, ButtonSet, ControllerInput, TickInput, tick};
pub use vector::{Plane, Vec3};
