//! Thrown bomb

use crate::consts::{
    BOMB_BLAST_RADIUS, BOMB_DAMAGE, BOMB_EXPLOSION_LIFT, BOMB_FUSE, BOMB_GRAVITY, MODEL_BOMB,
};
use crate::sim::collision::Collider;
use crate::sim::fixed::Fxp;
use crate::sim::message::Message;
use crate::sim::registry::{ActorId, Capability};
use crate::sim::state::{DrawCall, SoundCue, Visual};
use crate::sim::terrain::Terrain;
use crate::sim::vector::Vec3;

use super::{ActorStatus, Explosion, UpdateContext};

/// Flies in a ballistic arc, bounces off the arena edge, then sits on the
/// ground until its fuse runs out and damages everything in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bomb {
    position: Vec3,
    /// Units per tick
    velocity: Vec3,
    /// Seconds left once grounded
    fuse: Fxp,
    /// Draw animation phase in [0, 1]
    pulse: Fxp,
}

impl Bomb {
    pub fn new(throw_direction: Vec3, position: Vec3, lift: Fxp) -> Self {
        Self {
            position,
            velocity: throw_direction.with_z(lift),
            fuse: BOMB_FUSE,
            pulse: Fxp::ZERO,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn fuse(&self) -> Fxp {
        self.fuse
    }

    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> ActorStatus {
        let ground = ctx.terrain.ground_at(&self.position);

        if ground.height >= self.position.z {
            self.position.z = ground.height;
            self.fuse -= ctx.dt;
            if self.fuse <= Fxp::ZERO {
                self.detonate(ctx);
                return ActorStatus::Destroyed;
            }
        } else {
            self.bounce_off_edges();
            self.velocity += Vec3::new(Fxp::ZERO, Fxp::ZERO, BOMB_GRAVITY) * ctx.dt;
            self.position += self.velocity;
        }

        self.pulse += Fxp::from_ratio(1, 100);
        if self.pulse > Fxp::ONE {
            self.pulse = Fxp::ZERO;
        }
        ActorStatus::Alive
    }

    /// Reflect and halve horizontal velocity that would cross the arena edge
    fn bounce_off_edges(&mut self) {
        let boundary = Terrain::world_size();
        let outside = |p: Fxp| p < Fxp::ZERO || p > boundary;

        if outside(self.position.x + self.velocity.x) {
            self.velocity.x = -(self.velocity.x >> 1);
            self.velocity.z = Fxp::ZERO;
        }
        if outside(self.position.y + self.velocity.y) {
            self.velocity.y = -(self.velocity.y >> 1);
            self.velocity.z = Fxp::ZERO;
        }
    }

    fn detonate(&self, ctx: &mut UpdateContext<'_>) {
        let targets: Vec<ActorId> = ctx
            .registry
            .iter(Capability::Collide)
            .filter(|(_, actor)| actor.bounds().center_distance(self.position) <= BOMB_BLAST_RADIUS)
            .map(|(id, _)| id)
            .collect();

        log::debug!("Bomb detonated, {} actors in range", targets.len());
        for id in targets {
            ctx.send(id, Message::Damage(BOMB_DAMAGE));
        }

        ctx.play(SoundCue::Exploded);
        ctx.spawn_or_warn(Explosion::new(
            self.position + Vec3::new(Fxp::ZERO, Fxp::ZERO, BOMB_EXPLOSION_LIFT),
            Fxp::ONE,
        ));
    }

    pub fn draw(&self) -> DrawCall {
        let scale = ((self.pulse.sin() >> 1) + Fxp::from_ratio(3, 2)) >> 1;
        DrawCall {
            visual: Visual::Model(MODEL_BOMB),
            position: self.position + Vec3::new(Fxp::ZERO, Fxp::ZERO, Fxp::from_int(2)),
            angle: Fxp::ZERO,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PLAYER_MAX_HEALTH, SIM_DT};
    use crate::sim::actors::test_support::Harness;
    use crate::sim::actors::{Actor, ActorKind, Player};

    fn healths(harness: &Harness) -> Vec<i16> {
        harness
            .registry
            .iter_kind(ActorKind::Player)
            .filter_map(|(_, a)| a.as_player().map(|p| p.health()))
            .collect()
    }

    #[test]
    fn test_lands_then_detonates_in_radius() {
        let mut harness = Harness::flat();
        // 10 units away: inside the blast
        harness
            .registry
            .spawn(Actor::from(Player::new(Vec3::from_ints(50, 40, 0), Fxp::ZERO, 0)))
            .unwrap();
        // 20 units away: outside
        harness
            .registry
            .spawn(Actor::from(Player::new(Vec3::from_ints(60, 40, 0), Fxp::ZERO, 1)))
            .unwrap();

        let mut bomb = Bomb::new(Vec3::ZERO, Vec3::from_ints(40, 40, 0), Fxp::ZERO);
        let mut frames = 0;
        while bomb.update(&mut harness.ctx()) == ActorStatus::Alive {
            frames += 1;
            assert!(frames < 400);
        }

        // 3 second fuse at 60 Hz
        assert!((179..=181).contains(&frames));
        assert_eq!(
            healths(&harness),
            vec![PLAYER_MAX_HEALTH - BOMB_DAMAGE, PLAYER_MAX_HEALTH]
        );
        assert_eq!(harness.sounds(), vec![SoundCue::Exploded]);
        let explosion = harness
            .registry
            .iter_kind(ActorKind::Explosion)
            .next()
            .map(|(_, a)| a.position())
            .unwrap();
        assert_eq!(explosion.z, BOMB_EXPLOSION_LIFT);
    }

    #[test]
    fn test_blast_radius_is_inclusive() {
        let mut harness = Harness::flat();
        let at = |x: Fxp, y: Fxp| Vec3::new(x, y, Fxp::ZERO);
        let edge = Fxp::from_int(40) + BOMB_BLAST_RADIUS;
        // exactly on the radius
        harness
            .registry
            .spawn(Actor::from(Player::new(at(edge, Fxp::from_int(40)), Fxp::ZERO, 0)))
            .unwrap();
        // one raw step beyond it
        harness
            .registry
            .spawn(Actor::from(Player::new(
                at(Fxp::from_int(40), edge + Fxp::from_raw(1)),
                Fxp::ZERO,
                1,
            )))
            .unwrap();

        let mut bomb = Bomb::new(Vec3::ZERO, Vec3::from_ints(40, 40, 0), Fxp::ZERO);
        while bomb.update(&mut harness.ctx()) == ActorStatus::Alive {}

        assert_eq!(
            healths(&harness),
            vec![PLAYER_MAX_HEALTH - BOMB_DAMAGE, PLAYER_MAX_HEALTH]
        );
    }

    #[test]
    fn test_thrown_bomb_arcs_and_lands() {
        let mut harness = Harness::flat();
        let mut bomb = Bomb::new(
            Vec3::from_ints(1, 0, 0),
            Vec3::from_ints(40, 40, 1),
            SIM_DT * Fxp::from_int(15),
        );

        let mut frames = 0;
        while bomb.position().z > Fxp::ZERO {
            bomb.update(&mut harness.ctx());
            frames += 1;
            assert!(frames < 100);
        }
        bomb.update(&mut harness.ctx());
        assert_eq!(bomb.position().z, Fxp::ZERO);
        assert!(bomb.position().x > Fxp::from_int(41));
        assert!(bomb.fuse() < BOMB_FUSE);
    }

    #[test]
    fn test_bounces_off_arena_edge() {
        let mut harness = Harness::flat();
        let mut bomb = Bomb::new(Vec3::from_ints(-2, 0, 0), Vec3::from_ints(1, 40, 5), Fxp::ZERO);

        bomb.update(&mut harness.ctx());

        // reflected and halved, vertical speed dropped before gravity
        assert_eq!(bomb.velocity.x, Fxp::ONE);
        assert!(bomb.position().x > Fxp::from_int(1));
    }
}
