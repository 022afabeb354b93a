//! Proximity mine dropped by a player

use crate::consts::{MINE_DAMAGE, MINE_EXPLOSION_SCALE, MINE_FUSE, MINE_SAFE_TIME, MINE_SIZE};
use crate::sim::collision::{Aabb, Collider, Probe};
use crate::sim::fixed::Fxp;
use crate::sim::message::Message;
use crate::sim::state::{DrawCall, SoundCue, SpriteKind, Visual};
use crate::sim::vector::Vec3;

use super::{ActorStatus, Explosion, UpdateContext};

/// Goes off when anyone but its owner touches it. Once the safe window has
/// passed the owner can trigger it too, and it blows by itself when its fuse
/// runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mine {
    /// Controller of the player who placed it
    origin: u8,
    position: Vec3,
    collider: Aabb,
    fuse: Fxp,
    safe_time: Fxp,
}

impl Mine {
    pub fn new(origin: u8, position: Vec3) -> Self {
        Self {
            origin,
            position,
            collider: Aabb::from_center_extent(position, Vec3::splat(MINE_SIZE)),
            fuse: MINE_FUSE,
            safe_time: MINE_SAFE_TIME,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Whether the owner is still protected
    pub fn is_safe_for_owner(&self) -> bool {
        self.safe_time > Fxp::ZERO
    }

    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> ActorStatus {
        let mut triggered = false;
        let probe = Probe::Box(self.collider);

        if let Some(target) = ctx.first_collider(|other| other.collides_with(&probe)) {
            if let Some(controller) = ctx.registry.query_controller(target) {
                if controller != self.origin || self.safe_time <= Fxp::ZERO {
                    ctx.send(target, Message::Damage(MINE_DAMAGE));
                    triggered = true;
                }
            }
        }

        if triggered || self.fuse <= Fxp::ZERO {
            ctx.spawn_or_warn(Explosion::new(
                self.position + Vec3::new(Fxp::ZERO, Fxp::ZERO, Fxp::ONE),
                MINE_EXPLOSION_SCALE,
            ));
            ctx.play(SoundCue::Exploded);
            return ActorStatus::Destroyed;
        }

        if self.safe_time >= Fxp::ZERO {
            self.safe_time -= ctx.dt;
        }
        self.fuse -= ctx.dt;
        ActorStatus::Alive
    }

    pub fn draw(&self) -> DrawCall {
        DrawCall {
            visual: Visual::Sprite(SpriteKind::Mine),
            position: self.position + Vec3::new(Fxp::ZERO, Fxp::ZERO, Fxp::ONE),
            angle: Fxp::ZERO,
            scale: Fxp::from_ratio(1, 5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_MAX_HEALTH;
    use crate::sim::actors::test_support::Harness;
    use crate::sim::actors::{Actor, ActorKind, Player};

    fn health_of(harness: &Harness) -> i16 {
        harness
            .registry
            .iter_kind(ActorKind::Player)
            .find_map(|(_, a)| a.as_player().map(|p| p.health()))
            .unwrap()
    }

    fn spawn_player(harness: &mut Harness, controller: u8) {
        harness
            .registry
            .spawn(Actor::from(Player::new(Vec3::from_ints(40, 40, 1), Fxp::ZERO, controller)))
            .unwrap();
    }

    #[test]
    fn test_owner_is_safe_then_triggers() {
        let mut harness = Harness::flat();
        spawn_player(&mut harness, 0);
        let mut mine = Mine::new(0, Vec3::from_ints(40, 40, 0));

        // owner standing on it during the safe window
        for _ in 0..150 {
            assert_eq!(mine.update(&mut harness.ctx()), ActorStatus::Alive);
        }
        assert_eq!(health_of(&harness), PLAYER_MAX_HEALTH);
        assert!(mine.is_safe_for_owner());

        let mut frames = 0;
        while mine.update(&mut harness.ctx()) == ActorStatus::Alive {
            frames += 1;
            assert!(frames < 60);
        }
        assert_eq!(health_of(&harness), PLAYER_MAX_HEALTH - MINE_DAMAGE);
        assert_eq!(harness.sounds(), vec![SoundCue::Exploded]);
    }

    #[test]
    fn test_other_player_triggers_at_once() {
        let mut harness = Harness::flat();
        spawn_player(&mut harness, 1);
        let mut mine = Mine::new(0, Vec3::from_ints(40, 40, 0));

        assert_eq!(mine.update(&mut harness.ctx()), ActorStatus::Destroyed);
        assert_eq!(health_of(&harness), PLAYER_MAX_HEALTH - MINE_DAMAGE);
        let explosion = harness
            .registry
            .iter_kind(ActorKind::Explosion)
            .next()
            .map(|(_, a)| a.position())
            .unwrap();
        assert_eq!(explosion.z, Fxp::ONE);
    }

    #[test]
    fn test_contact_includes_touching_faces() {
        use crate::consts::PLAYER_SIZE;

        // mine box and player box share a face
        let touching = Fxp::from_int(40) + MINE_SIZE + PLAYER_SIZE;
        for (x, expect) in [
            (touching, ActorStatus::Destroyed),
            (touching + Fxp::from_raw(1), ActorStatus::Alive),
        ] {
            let mut harness = Harness::flat();
            harness
                .registry
                .spawn(Actor::from(Player::new(
                    Vec3::new(x, Fxp::from_int(40), Fxp::ONE),
                    Fxp::ZERO,
                    1,
                )))
                .unwrap();
            let mut mine = Mine::new(0, Vec3::from_ints(40, 40, 0));

            assert_eq!(mine.update(&mut harness.ctx()), expect);
            let damage = if expect == ActorStatus::Destroyed { MINE_DAMAGE } else { 0 };
            assert_eq!(health_of(&harness), PLAYER_MAX_HEALTH - damage);
        }
    }

    #[test]
    fn test_times_out_without_contact() {
        let mut harness = Harness::flat();
        let mut mine = Mine::new(0, Vec3::from_ints(40, 40, 0));

        let mut frames = 0;
        while mine.update(&mut harness.ctx()) == ActorStatus::Alive {
            frames += 1;
        }
        // 35 second fuse at 60 Hz
        assert!((2099..=2102).contains(&frames));
        assert_eq!(harness.count(ActorKind::Explosion), 1);
    }

    #[test]
    fn test_dead_players_still_trigger() {
        let mut harness = Harness::flat();
        harness
            .registry
            .spawn(Actor::from(
                Player::new(Vec3::from_ints(40, 40, 1), Fxp::ZERO, 2).with_health(0),
            ))
            .unwrap();
        let mut mine = Mine::new(0, Vec3::from_ints(40, 40, 0));

        assert_eq!(mine.update(&mut harness.ctx()), ActorStatus::Destroyed);
        assert_eq!(health_of(&harness), 0);
    }
}
