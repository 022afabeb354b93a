//! World state and the outward-facing event and draw types
//!
//! The [`World`] owns every piece of mutable simulation state: the actor
//! registry, the terrain, the seeded RNG and the queue of events produced
//! this frame. Two worlds built from the same arena and settings and fed the
//! same inputs stay identical.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{MAX_CONTROLLERS, SIM_DT};
use crate::error::ArenaError;
use crate::settings::MatchSettings;

use super::actors::{Actor, ActorKind, ActorStatus, CrateFlags, PickupCrate, Player, StaticDetail, UpdateContext};
use super::arena::{ArenaData, Placement, PlacementKind};
use super::fixed::Fxp;
use super::message::{Message, PickupKind};
use super::registry::{ActorId, Capability, Registry};
use super::terrain::Terrain;
use super::tick::TickInput;
use super::vector::Vec3;

/// Audio cue played on a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Fired,
    Exploded,
    CrateSpawned,
    CrateLanded,
    CrateOpened,
}

/// HUD snapshot of one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStatus {
    pub controller: u8,
    pub health: i16,
    pub pickup: PickupKind,
}

/// Side effects for the audio, HUD and match layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Sound(SoundCue),
    PlayerStatus(PlayerStatus),
    /// Whole seconds left on the match clock
    MatchTime { seconds: u16 },
    MatchEnded { winner: Option<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Bullet,
    Mine,
    Explosion { frame: u8 },
}

/// What the renderer should draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visual {
    /// The arena floor
    Terrain,
    /// Model index
    Model(u16),
    Sprite(SpriteKind),
}

/// One renderable hand-off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub visual: Visual,
    pub position: Vec3,
    pub angle: Fxp,
    pub scale: Fxp,
}

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Running,
    /// Controller of the winning player, if anyone survived
    Ended { winner: Option<u8> },
}

/// Complete simulation state for one match.
///
/// Events queue up across ticks until the host takes them with
/// [`World::drain_events`]; a host that never drains grows the queue for the
/// whole match.
#[derive(Debug)]
pub struct World {
    pub registry: Registry<Actor>,
    pub terrain: Terrain,
    rng: Pcg32,
    /// Undrained events, oldest first
    events: Vec<GameEvent>,
    pub settings: MatchSettings,
    pub phase: MatchPhase,
    /// Seconds left on the match clock
    pub time_left: Fxp,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Reused update-pass snapshot
    scratch: Vec<ActorId>,
}

impl World {
    /// Empty world over `terrain`; nothing is spawned yet
    pub fn new(terrain: Terrain, settings: MatchSettings) -> Self {
        let seconds = i32::from(settings.total_seconds).min(Fxp::MAX.to_int());
        Self {
            registry: Registry::with_limit(settings.actor_limit),
            terrain,
            rng: Pcg32::seed_from_u64(settings.seed),
            events: Vec::new(),
            phase: MatchPhase::Running,
            time_left: Fxp::from_int(seconds),
            time_ticks: 0,
            scratch: Vec::new(),
            settings,
        }
    }

    /// Load an arena and spawn its placements
    pub fn from_arena(arena: &ArenaData, settings: MatchSettings) -> Result<Self, ArenaError> {
        let loaded = arena.load()?;
        let mut world = Self::new(loaded.terrain, settings);
        world.populate(&loaded.placements)?;
        log::info!(
            "Arena loaded: {} actors, {} static colliders",
            world.registry.len(),
            world.terrain.collider_count()
        );
        Ok(world)
    }

    /// Spawn one actor per placement.
    ///
    /// Player spawns beyond the configured player count are skipped.
    pub fn populate(&mut self, placements: &[Placement]) -> Result<(), ArenaError> {
        let mut next_controller: u8 = 0;

        for placement in placements {
            match placement.kind {
                PlacementKind::Empty => {}
                PlacementKind::PlayerSpawn => {
                    if next_controller >= self.settings.player_count
                        || usize::from(next_controller) >= MAX_CONTROLLERS
                    {
                        continue;
                    }
                    self.spawn(Player::new(placement.location, placement.angle, next_controller))?;
                    next_controller += 1;
                }
                PlacementKind::Model => {
                    let detail = StaticDetail::new(
                        placement.location,
                        placement.angle,
                        u16::from(placement.reserved[1]),
                    );
                    self.terrain
                        .set_static_collider(&placement.location, Some(detail.collider()));
                    self.spawn(detail)?;
                }
                PlacementKind::Crate => {
                    let spin = Fxp::from_int(self.rng.random_range(1..=6));
                    let pickup = PickupCrate::new(
                        placement.location,
                        CrateFlags::from_bits(placement.reserved[0]),
                        placement.reserved[1],
                        &self.terrain,
                    )
                    .with_spin(spin);
                    self.spawn(pickup)?;
                }
            }
        }

        log::debug!("Placed {next_controller} players");
        Ok(())
    }

    pub fn spawn(&mut self, actor: impl Into<Actor>) -> Result<ActorId, ArenaError> {
        Ok(self.registry.spawn(actor.into())?)
    }

    /// Run one update pass over every updatable actor.
    ///
    /// The pass walks the update set as it stood when the frame began, so
    /// actors spawned during the pass first update next frame. Destroyed
    /// actors are flushed once the pass ends.
    pub fn update(&mut self, input: &TickInput, dt: Fxp) {
        let mut order = std::mem::take(&mut self.scratch);
        self.registry.snapshot_into(Capability::Update, &mut order);

        for &id in &order {
            let Some(mut actor) = self.registry.checkout(id) else {
                continue;
            };
            let status = actor.update(&mut UpdateContext {
                registry: &mut self.registry,
                terrain: &self.terrain,
                input,
                rng: &mut self.rng,
                events: &mut self.events,
                dt,
            });
            self.registry.restore(id, actor);
            if status == ActorStatus::Destroyed {
                self.registry.destroy(id);
            }
        }

        self.scratch = order;
        self.registry.flush();
    }

    /// Update with the fixed timestep
    pub fn step(&mut self, input: &TickInput) {
        self.update(input, SIM_DT);
    }

    /// Draw hand-off for this frame: terrain first, then every renderable
    /// actor in registration order
    pub fn draw(&self) -> Vec<DrawCall> {
        let terrain = DrawCall {
            visual: Visual::Terrain,
            position: Vec3::ZERO,
            angle: Fxp::ZERO,
            scale: Fxp::ONE,
        };
        std::iter::once(terrain)
            .chain(
                self.registry
                    .iter(Capability::Render)
                    .filter_map(|(_, actor)| actor.draw()),
            )
            .collect()
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event emitted since the last drain. Call once per frame.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deliver a message from outside the update pass
    pub fn send(&mut self, id: ActorId, mut message: Message) -> bool {
        self.registry.send(id, &mut message)
    }

    /// Every player, alive or not, in registration order
    pub fn players(&self) -> impl Iterator<Item = (ActorId, &Player)> + '_ {
        self.registry
            .iter_kind(ActorKind::Player)
            .filter_map(|(id, actor)| actor.as_player().map(|player| (id, player)))
    }

    /// Controller of the living player with the most health; the earliest
    /// registered wins a tie
    pub fn leader(&self) -> Option<u8> {
        self.players()
            .filter(|(_, player)| player.is_alive())
            .fold(None::<&Player>, |best, (_, player)| match best {
                Some(best) if best.health() >= player.health() => Some(best),
                _ => Some(player),
            })
            .map(Player::controller)
    }

    /// Destroy every actor and clear the static colliders. Returns how many
    /// actors were removed.
    pub fn teardown(&mut self) -> usize {
        let removed = self.registry.clear();
        let colliders = self.terrain.clear_colliders();
        log::info!("Arena torn down: {removed} actors, {colliders} static colliders");
        removed
    }
}
