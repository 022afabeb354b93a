//! Player-controlled brawler

use crate::consts::{
    BOMB_THROW_LIFT, FIRE_COOLDOWN_FRAMES, MODEL_PLAYER, PLAYER_MAX_HEALTH,
    PLAYER_MOVEMENT_SPEED, PLAYER_ROTATION_SPEED, PLAYER_SIZE, TILE_UNIT_SHIFT, WATER_MATERIALS,
    WATER_SLOWDOWN,
};
use crate::sim::collision::{Aabb, Collider, Probe};
use crate::sim::fixed::Fxp;
use crate::sim::message::{Message, MessageHandler, PickupKind};
use crate::sim::state::{DrawCall, GameEvent, PlayerStatus, SoundCue, Visual};
use crate::sim::terrain::Terrain;
use crate::sim::tick::Button;
use crate::sim::vector::{Plane, Vec3};
use crate::wrap_angle;

use super::{ActorStatus, Bomb, Bullet, Mine, UpdateContext};

/// A player is alive while its health is above zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    position: Vec3,
    /// Facing in radians, kept in [0, 2π)
    angle: Fxp,
    controller: u8,
    health: i16,
    /// Frames until the next shot
    fire_cooldown: u8,
    pickup: PickupKind,
}

impl Player {
    pub fn new(position: Vec3, angle: Fxp, controller: u8) -> Self {
        Self {
            position,
            angle: wrap_angle(angle),
            controller,
            health: PLAYER_MAX_HEALTH,
            fire_cooldown: 0,
            pickup: PickupKind::None,
        }
    }

    pub fn with_health(mut self, health: i16) -> Self {
        self.health = health.clamp(0, PLAYER_MAX_HEALTH);
        self
    }

    pub fn with_pickup(mut self, pickup: PickupKind) -> Self {
        self.pickup = pickup;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn angle(&self) -> Fxp {
        self.angle
    }

    pub fn controller(&self) -> u8 {
        self.controller
    }

    pub fn health(&self) -> i16 {
        self.health
    }

    pub fn pickup(&self) -> PickupKind {
        self.pickup
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            controller: self.controller,
            health: self.health,
            pickup: self.pickup,
        }
    }

    fn facing(&self) -> Vec3 {
        Vec3::new(self.angle.cos(), self.angle.sin(), Fxp::ZERO)
    }

    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> ActorStatus {
        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);

        if self.collider_enabled() && self.is_alive() {
            self.handle_movement(ctx);
            self.handle_actions(ctx);
        }

        ctx.emit(GameEvent::PlayerStatus(self.status()));
        ActorStatus::Alive
    }

    fn handle_movement(&mut self, ctx: &mut UpdateContext<'_>) {
        let input = ctx.input;
        let controller = self.controller;

        let rotate_by = if input.held(controller, Button::Left) {
            PLAYER_ROTATION_SPEED
        } else if input.held(controller, Button::Right) {
            -PLAYER_ROTATION_SPEED
        } else {
            Fxp::ZERO
        };

        let mut move_by = if input.held(controller, Button::Up) {
            PLAYER_MOVEMENT_SPEED
        } else if input.held(controller, Button::Down) {
            -PLAYER_MOVEMENT_SPEED
        } else {
            Fxp::ZERO
        };

        if rotate_by != Fxp::ZERO {
            self.angle = wrap_angle(self.angle + rotate_by * ctx.dt);
        }

        if move_by == Fxp::ZERO {
            return;
        }

        let ground = ctx.terrain.ground_at(&self.position);
        if WATER_MATERIALS.contains(&ground.material) {
            move_by *= WATER_SLOWDOWN;
        }

        let step = move_by * ctx.dt;
        let mut delta = self.facing() * step;

        // Reject each axis that would leave the arena
        let boundary = Terrain::world_size();
        let leaves = |target: Fxp| target - PLAYER_SIZE < Fxp::ZERO || target + PLAYER_SIZE > boundary;
        if leaves(self.position.x + delta.x) {
            delta.x = Fxp::ZERO;
        }
        if leaves(self.position.y + delta.y) {
            delta.y = Fxp::ZERO;
        }

        self.position += delta;

        // Stand on the plane of the tile underneath
        let ground = ctx.terrain.ground_at(&self.position);
        let tile_centre = |c: Fxp| ((c >> TILE_UNIT_SHIFT).truncate_fraction() + Fxp::HALF) << TILE_UNIT_SHIFT;
        let anchor = Vec3::new(
            tile_centre(self.position.x),
            tile_centre(self.position.y),
            ground.height + Fxp::ONE,
        );
        let height = Plane::new(ground.normal, anchor).height_at(self.position.x, self.position.y);
        delta.z = height - self.position.z;
        self.position.z = height;

        // Dynamic collision: back off, then slide along the least blocked axes
        let bounds = self.bounds();
        let blocker = ctx
            .first_collider(|other| other.collides_with(&Probe::Box(bounds)))
            .and_then(|id| ctx.registry.get(id))
            .map(|other| other.bounds().center());
        if let Some(center) = blocker {
            self.position -= delta;
            let away = self.position - center;
            *delta.axis_mut(away.dominant_axis()) = Fxp::ZERO;
            self.position += delta >> 1;
        }

        // Static collision: stay put
        if ctx
            .terrain
            .find_static_collision(&self.position, 2, &Probe::Box(self.bounds()))
            .is_some()
        {
            self.position -= delta;
        }
    }

    fn handle_actions(&mut self, ctx: &mut UpdateContext<'_>) {
        let facing = self.facing();

        if ctx.input.pressed(self.controller, Button::Fire) && self.fire_cooldown == 0 {
            // a refused shot costs nothing
            match ctx.spawn(Bullet::new(self.controller, facing, self.position)) {
                Ok(_) => {
                    ctx.play(SoundCue::Fired);
                    self.fire_cooldown = FIRE_COOLDOWN_FRAMES;
                }
                Err(err) => log::warn!("Controller {} could not fire: {err}", self.controller),
            }
        }

        if ctx.input.pressed(self.controller, Button::UseItem) {
            match self.pickup {
                PickupKind::Mine => ctx.spawn_or_warn(Mine::new(self.controller, self.position)),
                PickupKind::Bomb => {
                    let lift = ctx.dt * BOMB_THROW_LIFT;
                    ctx.spawn_or_warn(Bomb::new(facing, self.position, lift));
                }
                PickupKind::None => {}
            }
            self.pickup = PickupKind::None;
        }
    }

    pub fn draw(&self) -> DrawCall {
        DrawCall {
            visual: Visual::Model(MODEL_PLAYER),
            position: self.position + Vec3::new(Fxp::ZERO, Fxp::ZERO, Fxp::ONE),
            angle: self.angle,
            scale: Fxp::ONE,
        }
    }
}

impl Collider for Player {
    fn bounds(&self) -> Aabb {
        Aabb::from_center_extent(self.position, Vec3::splat(PLAYER_SIZE))
    }
}

impl MessageHandler for Player {
    fn handle(&mut self, message: &mut Message) {
        match message {
            Message::Damage(amount) => {
                if self.health > 0 {
                    let health = self.health as i32 - *amount as i32;
                    self.health = health.clamp(0, PLAYER_MAX_HEALTH as i32) as i16;
                    log::debug!(
                        "Player {} took {} damage, health {}",
                        self.controller,
                        amount,
                        self.health
                    );
                }
            }
            Message::QueryController(query) => {
                query.handled = true;
                query.controller = self.controller;
            }
            Message::Pickup(kind) => {
                self.pickup = *kind;
                log::debug!("Player {} picked up {:?}", self.controller, kind);
            }
        }
    }
}
