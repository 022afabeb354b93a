//! Explosion sprite effect

use crate::consts::{EXPLOSION_FRAMES, EXPLOSION_FRAME_TIME};
use crate::sim::fixed::Fxp;
use crate::sim::state::{DrawCall, SpriteKind, Visual};
use crate::sim::vector::Vec3;

use super::{ActorStatus, UpdateContext};

/// Plays through its frames once, then removes itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explosion {
    position: Vec3,
    scale: Fxp,
    frame: u8,
    /// Time spent on the current frame
    elapsed: Fxp,
}

impl Explosion {
    pub fn new(position: Vec3, scale: Fxp) -> Self {
        Self {
            position,
            scale,
            frame: 0,
            elapsed: Fxp::ZERO,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn scale(&self) -> Fxp {
        self.scale
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> ActorStatus {
        if self.elapsed >= EXPLOSION_FRAME_TIME {
            self.frame += 1;
            self.elapsed = Fxp::ZERO;
        }
        if self.frame >= EXPLOSION_FRAMES {
            return ActorStatus::Destroyed;
        }
        self.elapsed += ctx.dt;
        ActorStatus::Alive
    }

    pub fn draw(&self) -> DrawCall {
        DrawCall {
            visual: Visual::Sprite(SpriteKind::Explosion { frame: self.frame }),
            position: self.position,
            angle: Fxp::ZERO,
            scale: self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actors::test_support::Harness;

    #[test]
    fn test_plays_all_frames_then_ends() {
        let mut harness = Harness::flat();
        let mut explosion = Explosion::new(Vec3::ZERO, Fxp::ONE);
        let mut frames_seen = Vec::new();

        let mut ticks = 0;
        while explosion.update(&mut harness.ctx()) == ActorStatus::Alive {
            if frames_seen.last() != Some(&explosion.frame()) {
                frames_seen.push(explosion.frame());
            }
            ticks += 1;
            assert!(ticks < 100);
        }

        assert_eq!(frames_seen, vec![0, 1, 2, 3, 4, 5]);
        // six frames of 0.1 s at 60 Hz
        assert!((36..=42).contains(&ticks));
    }
}
