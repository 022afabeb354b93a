//! Arena Brawl headless runner
//!
//! Builds a demo arena, plays a scripted match at the fixed timestep and logs
//! the outcome. Pass a settings JSON path as the first argument to override
//! the defaults.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use arena_brawl::MatchSettings;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Arena Brawl (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => MatchSettings::load(path)?,
        None => MatchSettings::default(),
    };

    demo::run(settings)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library; there is no browser front end
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use arena_brawl::consts::{MAP_DIMENSION, SIM_DT};
    use arena_brawl::sim::{
        ArenaData, Button, ButtonSet, ControllerInput, GameEvent, MatchPhase, PlacementKind,
        PlacementRecord, SoundCue, TickInput, World, tick,
    };
    use arena_brawl::{ArenaError, Fxp, MatchSettings};

    /// Frames a scripted player keeps the same buttons down
    const SCRIPT_HOLD_FRAMES: u64 = 30;

    /// A raised plateau in the middle, a pond in one corner and a ring of
    /// props and crates
    fn demo_arena() -> ArenaData {
        let mut arena = ArenaData::flat(4);
        for y in 8..12 {
            for x in 8..12 {
                arena.tile_mut(x, y).depth = 12;
            }
        }
        for y in 14..MAP_DIMENSION - 1 {
            for x in 1..5 {
                arena.tile_mut(x, y).texture = 4;
            }
        }

        let spawns = [(2, 2, 0), (17, 17, 2), (2, 17, 3), (17, 2, 1)];
        for (x, y, quarter_turns) in spawns {
            arena = arena.with_placement(
                PlacementRecord::new(PlacementKind::PlayerSpawn, x, y)
                    .facing(Fxp::PI.times(Fxp::from_ratio(quarter_turns, 2))),
            );
        }
        arena
            .with_placement(PlacementRecord::new(PlacementKind::Model, 6, 10).reserved([0, 3]))
            .with_placement(PlacementRecord::new(PlacementKind::Model, 13, 10).reserved([0, 3]))
            .with_placement(PlacementRecord::new(PlacementKind::Crate, 10, 5).reserved([0x07, 5]))
            .with_placement(PlacementRecord::new(PlacementKind::Crate, 10, 14).reserved([0x03, 8]))
            .with_placement(PlacementRecord::new(PlacementKind::Crate, 5, 10).reserved([0x04, 3]))
    }

    /// Random button mashing that changes every `SCRIPT_HOLD_FRAMES`
    struct Script {
        rng: Pcg32,
        held: Vec<ButtonSet>,
    }

    impl Script {
        fn new(seed: u64, players: usize) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                held: vec![ButtonSet::EMPTY; players],
            }
        }

        fn next(&mut self, frame: u64) -> TickInput {
            let mut input = TickInput::default();
            for (controller, last) in self.held.iter_mut().enumerate() {
                let current = if frame % SCRIPT_HOLD_FRAMES == 0 {
                    Button::ALL
                        .into_iter()
                        .filter(|_| self.rng.random_range(0..3) == 0)
                        .collect()
                } else {
                    *last
                };
                // tap the action buttons so they fire more than once per hold
                let tapping = frame % 10 == 0;
                let previous = if tapping { ButtonSet::EMPTY } else { *last };
                input = input.set(
                    controller as u8,
                    ControllerInput::from_transition(previous, current),
                );
                *last = current;
            }
            input
        }
    }

    pub fn run(settings: MatchSettings) -> Result<(), ArenaError> {
        let mut world = World::from_arena(&demo_arena(), settings.clone())?;
        let mut script = Script::new(settings.seed ^ 0xb0a7, usize::from(settings.player_count));

        let mut shots = 0usize;
        let mut explosions = 0usize;
        let mut frame = 0u64;
        let winner = loop {
            let input = script.next(frame);
            let phase = tick(&mut world, &input, SIM_DT);
            frame += 1;

            for event in world.drain_events() {
                match event {
                    GameEvent::Sound(SoundCue::Fired) => shots += 1,
                    GameEvent::Sound(SoundCue::Exploded) => explosions += 1,
                    GameEvent::MatchTime { seconds } if seconds % 30 == 0 => {
                        log::info!("{seconds} s left, {} actors live", world.registry.len());
                    }
                    _ => {}
                }
            }

            if let MatchPhase::Ended { winner } = phase {
                break winner;
            }
        };

        for (_, player) in world.players() {
            log::info!(
                "Controller {}: health {}, holding {:?}",
                player.controller(),
                player.health(),
                player.pickup()
            );
        }
        log::info!("{frame} frames, {shots} shots fired, {explosions} explosions");
        match winner {
            Some(controller) => log::info!("Winner: controller {controller}"),
            None => log::info!("No winner"),
        }

        world.teardown();
        Ok(())
    }
}
