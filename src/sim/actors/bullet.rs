//! Projectile fired by players
//!
//! Bullets fly under gravity and hug the terrain: when they dip below the
//! clearance height they are pushed back up, and a steep rise makes them skip
//! with damped velocity. They die on expiry, on hitting a wall or a player
//! other than the shooter, or on leaving the arena.

use crate::consts::{
    BULLET_DAMAGE, BULLET_DOWN_FORCE_LIMIT, BULLET_EXPLOSION_SCALE, BULLET_GRAVITY,
    BULLET_GROUND_CLEARANCE, BULLET_LIFETIME, BULLET_SKIP_DAMPING, BULLET_SPEED,
};
use crate::sim::collision::{Collider, Probe};
use crate::sim::fixed::Fxp;
use crate::sim::message::Message;
use crate::sim::state::{DrawCall, SpriteKind, Visual};
use crate::sim::terrain::Terrain;
use crate::sim::vector::Vec3;

use super::{ActorStatus, Explosion, UpdateContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bullet {
    /// Controller of the shooter
    origin: u8,
    position: Vec3,
    velocity: Vec3,
    gravity: Vec3,
    /// Ticks left before the bullet expires
    lifetime: u16,
}

impl Bullet {
    pub fn new(origin: u8, direction: Vec3, position: Vec3) -> Self {
        Self {
            origin,
            position: position + Vec3::new(Fxp::ZERO, Fxp::ZERO, BULLET_GROUND_CLEARANCE),
            velocity: direction * BULLET_SPEED,
            gravity: Vec3::new(Fxp::ZERO, Fxp::ZERO, BULLET_GRAVITY),
            lifetime: BULLET_LIFETIME,
        }
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_lifetime(mut self, lifetime: u16) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn origin(&self) -> u8 {
        self.origin
    }

    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> ActorStatus {
        let mut destroy = self.lifetime == 0;

        if !destroy {
            self.lifetime -= 1;
            destroy = self.fly(ctx);
        }

        if destroy || !Terrain::contains(&self.position) {
            ctx.spawn_or_warn(Explosion::new(self.position, BULLET_EXPLOSION_SCALE));
            return ActorStatus::Destroyed;
        }
        ActorStatus::Alive
    }

    /// Integrate one tick. Returns `true` when the bullet hit something.
    fn fly(&mut self, ctx: &mut UpdateContext<'_>) -> bool {
        let delta_gravity = self.gravity * ctx.dt;
        self.velocity += delta_gravity;
        self.position += self.velocity * ctx.dt;

        let ground = ctx.terrain.ground_at(&self.position);
        let clearance = ground.height + BULLET_GROUND_CLEARANCE;

        if (self.position + delta_gravity).z >= clearance && self.position.z < clearance {
            // Grazing: cancel this tick's fall
            self.velocity -= delta_gravity * ctx.dt;
            self.position.z = clearance;
        } else if self.position.z < clearance {
            // Hit a rise: climb it, skipping off if it is steep
            self.velocity.z = clearance - self.position.z;
            if self.velocity.z > BULLET_DOWN_FORCE_LIMIT << 1 {
                self.velocity = self.velocity * BULLET_SKIP_DAMPING;
                self.velocity.z = BULLET_DOWN_FORCE_LIMIT << 5;
            }
            self.position.z = clearance;
        }

        let point = Probe::Point(self.position);
        let mut hit = ground.height > self.position.z
            || ctx
                .terrain
                .find_static_collision(&self.position, 0, &point)
                .is_some();

        if let Some(target) = ctx.first_collider(|other| other.collides_with(&point)) {
            if let Some(controller) = ctx.registry.query_controller(target) {
                if controller != self.origin {
                    ctx.send(target, Message::Damage(BULLET_DAMAGE));
                    hit = true;
                }
            }
        }
        hit
    }

    pub fn draw(&self) -> DrawCall {
        DrawCall {
            visual: Visual::Sprite(SpriteKind::Bullet),
            position: self.position,
            angle: Fxp::ZERO,
            scale: Fxp::from_ratio(1, 5),
        }
    }
}
