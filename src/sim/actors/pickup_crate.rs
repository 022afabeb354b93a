//! Falling pickup crate
//!
//! A crate waits out its respawn delay, drops from the sky onto its tile and
//! sits there until a player walks into it. The player gets at most one
//! reward from a single roll, then the crate goes back to waiting.

use rand::Rng;

use crate::consts::{
    CRATE_FALL_SPEED, CRATE_HEALTH_PACK, CRATE_SIZE, CRATE_SPAWN_HEIGHT, MODEL_CRATE,
    PICKUP_BOMB_ABOVE, PICKUP_HEALTH_ABOVE, PICKUP_ROLL_SIDES,
};
use crate::sim::collision::{Aabb, Collider, Probe};
use crate::sim::fixed::Fxp;
use crate::sim::message::{Message, PickupKind};
use crate::sim::state::{DrawCall, SoundCue, Visual};
use crate::sim::terrain::Terrain;
use crate::sim::vector::Vec3;

use super::{ActorKind, ActorStatus, UpdateContext};

/// Which rewards a crate may hand out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrateFlags(u8);

impl CrateFlags {
    pub const HEALTH: CrateFlags = CrateFlags(0x01);
    pub const BOMB: CrateFlags = CrateFlags(0x02);
    pub const MINE: CrateFlags = CrateFlags(0x04);
    pub const ALL: CrateFlags = CrateFlags(0x07);

    /// Unknown bits are dropped
    pub const fn from_bits(bits: u8) -> Self {
        CrateFlags(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: CrateFlags) -> Self {
        CrateFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: CrateFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Reward for a roll in `1..=PICKUP_ROLL_SIDES`.
    ///
    /// High rolls favour the bomb, then health, then the mine; a disabled
    /// reward falls through to the next one down.
    pub fn award(self, roll: u8) -> Option<Message> {
        if roll > PICKUP_BOMB_ABOVE && self.contains(Self::BOMB) {
            Some(Message::Pickup(PickupKind::Bomb))
        } else if roll > PICKUP_HEALTH_ABOVE && self.contains(Self::HEALTH) {
            Some(Message::Damage(-CRATE_HEALTH_PACK))
        } else if self.contains(Self::MINE) {
            Some(Message::Pickup(PickupKind::Mine))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrateState {
    /// Waiting at spawn height, invisible
    Countdown { remaining: Fxp },
    Falling,
    /// On the ground with its collider active
    Landed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupCrate {
    position: Vec3,
    ground_height: Fxp,
    respawn_time: Fxp,
    state: CrateState,
    flags: CrateFlags,
    collider: Aabb,
    /// Yaw in radians
    spin: Fxp,
}

impl PickupCrate {
    pub fn new(location: Vec3, flags: CrateFlags, respawn_seconds: u8, terrain: &Terrain) -> Self {
        let respawn_time = Fxp::from_int(respawn_seconds as i32);
        Self {
            position: location.with_z(CRATE_SPAWN_HEIGHT),
            ground_height: terrain.ground_at(&location).height,
            respawn_time,
            state: CrateState::Countdown {
                remaining: respawn_time,
            },
            flags,
            collider: Aabb::point(location),
            spin: Fxp::ZERO,
        }
    }

    pub fn with_spin(mut self, spin: Fxp) -> Self {
        self.spin = spin;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn state(&self) -> CrateState {
        self.state
    }

    pub fn flags(&self) -> CrateFlags {
        self.flags
    }

    /// Pickup box, only while landed
    pub fn collider(&self) -> Option<Aabb> {
        (self.state == CrateState::Landed).then_some(self.collider)
    }

    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> ActorStatus {
        match self.state {
            CrateState::Landed => self.offer(ctx),
            CrateState::Falling => self.fall(ctx),
            CrateState::Countdown { remaining } if remaining <= Fxp::ZERO => {
                self.state = CrateState::Falling;
                ctx.play(SoundCue::CrateSpawned);
                self.fall(ctx);
            }
            CrateState::Countdown { remaining } => {
                self.state = CrateState::Countdown {
                    remaining: remaining - ctx.dt,
                };
            }
        }
        ActorStatus::Alive
    }

    fn fall(&mut self, ctx: &mut UpdateContext<'_>) {
        self.position.z -= CRATE_FALL_SPEED * ctx.dt;
        if self.position.z < self.ground_height {
            self.position.z = self.ground_height;
            self.state = CrateState::Landed;
            self.collider = Aabb::from_center_extent(self.position, Vec3::splat(CRATE_SIZE));
            ctx.play(SoundCue::CrateLanded);
        }
    }

    /// Hand a reward to the first player touching the crate
    fn offer(&mut self, ctx: &mut UpdateContext<'_>) {
        let probe = Probe::Box(self.collider);
        let Some(player) = ctx
            .registry
            .first_matching_kind(ActorKind::Player, |actor| actor.collides_with(&probe))
        else {
            return;
        };

        let roll = ctx.rng.random_range(1..=PICKUP_ROLL_SIDES);
        match self.flags.award(roll) {
            Some(reward) => {
                log::debug!("Crate rolled {roll}, awarding {reward:?}");
                ctx.send(player, reward);
            }
            None => log::debug!("Crate rolled {roll}, nothing enabled"),
        }

        self.state = CrateState::Countdown {
            remaining: self.respawn_time,
        };
        self.position.z = CRATE_SPAWN_HEIGHT;
        self.spin = Fxp::from_int(ctx.rng.random_range(1..=6));
        ctx.play(SoundCue::CrateOpened);
    }

    /// Hidden while counting down
    pub fn draw(&self) -> Option<DrawCall> {
        if matches!(self.state, CrateState::Countdown { .. }) {
            return None;
        }
        Some(DrawCall {
            visual: Visual::Model(MODEL_CRATE),
            position: self.position,
            angle: self.spin,
            scale: Fxp::ONE,
        })
    }
}
