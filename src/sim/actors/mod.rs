//! Simulation actors
//!
//! Every live entity is one variant of [`Actor`]. The registry stores them by
//! value; each variant declares the capability sets it joins through
//! [`Tracked::capabilities`].
//!
//! During its update an actor is checked out of the registry and receives an
//! [`UpdateContext`] with mutable access to everything else: other actors,
//! the RNG and the event queue. It reports whether it survives the frame by
//! returning an [`ActorStatus`].

pub mod bomb;
pub mod bullet;
pub mod explosion;
pub mod mine;
pub mod pickup_crate;
pub mod player;
pub mod static_detail;

pub use bomb::Bomb;
pub use bullet::Bullet;
pub use explosion::Explosion;
pub use mine::Mine;
pub use pickup_crate::{CrateFlags, CrateState, PickupCrate};
pub use player::Player;
pub use static_detail::StaticDetail;

use rand_pcg::Pcg32;

use crate::error::RegistryError;

use super::collision::{Aabb, Collider};
use super::fixed::Fxp;
use super::message::{Message, MessageHandler};
use super::registry::{ActorId, Capabilities, Capability, Registry, Tracked};
use super::state::{DrawCall, GameEvent, SoundCue};
use super::terrain::Terrain;
use super::tick::TickInput;
use super::vector::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorKind {
    Player,
    Bullet,
    Bomb,
    Mine,
    Crate,
    Explosion,
    StaticDetail,
}

/// Outcome of one actor update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorStatus {
    Alive,
    /// Remove the actor once the update pass ends
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Player(Player),
    Bullet(Bullet),
    Bomb(Bomb),
    Mine(Mine),
    Crate(PickupCrate),
    Explosion(Explosion),
    StaticDetail(StaticDetail),
}

/// Everything an updating actor may touch
pub struct UpdateContext<'a> {
    pub registry: &'a mut Registry<Actor>,
    pub terrain: &'a Terrain,
    pub input: &'a TickInput,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut Vec<GameEvent>,
    pub dt: Fxp,
}

impl UpdateContext<'_> {
    /// Register a new actor. It joins the update pass next frame but is
    /// visible to queries at once.
    pub fn spawn(&mut self, actor: impl Into<Actor>) -> Result<ActorId, RegistryError> {
        self.registry.spawn(actor.into())
    }

    /// Spawn an effect or projectile whose loss is survivable; a full
    /// registry is logged and the frame continues.
    pub fn spawn_or_warn(&mut self, actor: impl Into<Actor>) {
        let actor = actor.into();
        let kind = actor.kind();
        if let Err(err) = self.registry.spawn(actor) {
            log::warn!("Dropped {kind:?} spawn: {err}");
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    pub fn send(&mut self, id: ActorId, mut message: Message) -> bool {
        self.registry.send(id, &mut message)
    }

    /// First live collider the probe test accepts
    pub fn first_collider(&self, mut hits: impl FnMut(&Actor) -> bool) -> Option<ActorId> {
        self.registry
            .first_matching(Capability::Collide, |actor| actor.collider_enabled() && hits(actor))
    }
}

impl Actor {
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> ActorStatus {
        match self {
            Actor::Player(player) => player.update(ctx),
            Actor::Bullet(bullet) => bullet.update(ctx),
            Actor::Bomb(bomb) => bomb.update(ctx),
            Actor::Mine(mine) => mine.update(ctx),
            Actor::Crate(pickup) => pickup.update(ctx),
            Actor::Explosion(explosion) => explosion.update(ctx),
            // Static details never join the update set
            Actor::StaticDetail(_) => ActorStatus::Alive,
        }
    }

    pub fn draw(&self) -> Option<DrawCall> {
        match self {
            Actor::Player(player) => Some(player.draw()),
            Actor::Bullet(bullet) => Some(bullet.draw()),
            Actor::Bomb(bomb) => Some(bomb.draw()),
            Actor::Mine(mine) => Some(mine.draw()),
            Actor::Crate(pickup) => pickup.draw(),
            Actor::Explosion(explosion) => Some(explosion.draw()),
            Actor::StaticDetail(detail) => Some(detail.draw()),
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            Actor::Player(player) => player.position(),
            Actor::Bullet(bullet) => bullet.position(),
            Actor::Bomb(bomb) => bomb.position(),
            Actor::Mine(mine) => mine.position(),
            Actor::Crate(pickup) => pickup.position(),
            Actor::Explosion(explosion) => explosion.position(),
            Actor::StaticDetail(detail) => detail.position(),
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Actor::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_crate(&self) -> Option<&PickupCrate> {
        match self {
            Actor::Crate(pickup) => Some(pickup),
            _ => None,
        }
    }
}

impl Tracked for Actor {
    type Kind = ActorKind;

    fn kind(&self) -> ActorKind {
        match self {
            Actor::Player(_) => ActorKind::Player,
            Actor::Bullet(_) => ActorKind::Bullet,
            Actor::Bomb(_) => ActorKind::Bomb,
            Actor::Mine(_) => ActorKind::Mine,
            Actor::Crate(_) => ActorKind::Crate,
            Actor::Explosion(_) => ActorKind::Explosion,
            Actor::StaticDetail(_) => ActorKind::StaticDetail,
        }
    }

    fn capabilities(&self) -> Capabilities {
        let animated = Capabilities::NONE
            .with(Capability::Update)
            .with(Capability::Render);
        match self {
            Actor::Player(_) => animated.with(Capability::Collide),
            Actor::StaticDetail(_) => Capabilities::NONE.with(Capability::Render),
            _ => animated,
        }
    }
}

impl MessageHandler for Actor {
    fn handle(&mut self, message: &mut Message) {
        if let Actor::Player(player) = self {
            player.handle(message);
        }
    }
}

impl Collider for Actor {
    fn bounds(&self) -> Aabb {
        match self {
            Actor::Player(player) => player.bounds(),
            other => Aabb::point(other.position()),
        }
    }

    fn collider_enabled(&self) -> bool {
        match self {
            Actor::Player(player) => player.collider_enabled(),
            _ => false,
        }
    }
}

macro_rules! impl_into_actor {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Actor {
                fn from(value: $ty) -> Self {
                    Actor::$variant(value)
                }
            }
        )*
    };
}

impl_into_actor!(
    Player(Player),
    Bullet(Bullet),
    Bomb(Bomb),
    Mine(Mine),
    Crate(PickupCrate),
    Explosion(Explosion),
    StaticDetail(StaticDetail),
);
