//! Fixed timestep simulation tick
//!
//! One call to [`tick`] advances the match by a frame: every updatable actor
//! runs once, the match clock counts down and the end condition is checked.

use crate::consts::MAX_CONTROLLERS;

use super::fixed::Fxp;
use super::state::{GameEvent, MatchPhase, World};

/// Logical pad button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Fire,
    UseItem,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Fire,
        Button::UseItem,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: ButtonSet = ButtonSet(0);

    pub const fn with(self, button: Button) -> Self {
        ButtonSet(self.0 | button.bit())
    }

    pub const fn contains(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Buttons in `self` that are not in `other`
    pub const fn difference(self, other: ButtonSet) -> Self {
        ButtonSet(self.0 & !other.0)
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter().fold(ButtonSet::EMPTY, ButtonSet::with)
    }
}

/// One controller's state for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerInput {
    /// Down this frame
    pub held: ButtonSet,
    /// Went down this frame
    pub pressed: ButtonSet,
}

impl ControllerInput {
    /// Derive presses from last frame's held buttons
    pub fn from_transition(previous: ButtonSet, current: ButtonSet) -> Self {
        Self {
            held: current,
            pressed: current.difference(previous),
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    pub controllers: [ControllerInput; MAX_CONTROLLERS],
}

impl TickInput {
    /// Unknown controllers never hold anything
    pub fn held(&self, controller: u8, button: Button) -> bool {
        self.controllers
            .get(usize::from(controller))
            .is_some_and(|c| c.held.contains(button))
    }

    pub fn pressed(&self, controller: u8, button: Button) -> bool {
        self.controllers
            .get(usize::from(controller))
            .is_some_and(|c| c.pressed.contains(button))
    }

    /// Copy with `button` held on `controller`
    pub fn hold(mut self, controller: u8, button: Button) -> Self {
        if let Some(c) = self.controllers.get_mut(usize::from(controller)) {
            c.held = c.held.with(button);
        }
        self
    }

    /// Copy with `button` pressed (and held) on `controller`
    pub fn press(mut self, controller: u8, button: Button) -> Self {
        if let Some(c) = self.controllers.get_mut(usize::from(controller)) {
            c.held = c.held.with(button);
            c.pressed = c.pressed.with(button);
        }
        self
    }

    pub fn set(mut self, controller: u8, input: ControllerInput) -> Self {
        if let Some(c) = self.controllers.get_mut(usize::from(controller)) {
            *c = input;
        }
        self
    }
}

/// Advance the match by one fixed timestep and return its phase
pub fn tick(world: &mut World, input: &TickInput, dt: Fxp) -> MatchPhase {
    if let MatchPhase::Ended { .. } = world.phase {
        return world.phase;
    }

    if world.time_ticks == 0 {
        log::info!(
            "Match started: {} players, {} seconds, seed {:#x}",
            world.players().count(),
            world.settings.total_seconds,
            world.settings.seed
        );
        world.emit(GameEvent::MatchTime {
            seconds: clock_seconds(world.time_left),
        });
    }
    world.time_ticks += 1;

    world.update(input, dt);

    let shown = clock_seconds(world.time_left);
    world.time_left = Fxp::ZERO.max(world.time_left - dt);
    let seconds = clock_seconds(world.time_left);
    if seconds != shown {
        world.emit(GameEvent::MatchTime { seconds });
    }

    if match_over(world) {
        let winner = world.leader();
        world.phase = MatchPhase::Ended { winner };
        world.emit(GameEvent::MatchEnded { winner });
        match winner {
            Some(controller) => log::info!(
                "Match over after {} ticks, controller {controller} wins",
                world.time_ticks
            ),
            None => log::info!("Match over after {} ticks, no survivors", world.time_ticks),
        }
    }

    world.phase
}

fn clock_seconds(time_left: Fxp) -> u16 {
    time_left.to_int().clamp(0, i32::from(u16::MAX)) as u16
}

/// Out of time, or at most one player left alive. A world that starts with
/// one player or none therefore ends on its first tick.
fn match_over(world: &World) -> bool {
    world.time_left <= Fxp::ZERO || world.players().filter(|(_, p)| p.is_alive()).count() <= 1
}
