//! Static arena prop

use crate::consts::{STATIC_DETAIL_EXTENT_XY, STATIC_DETAIL_EXTENT_Z};
use crate::sim::collision::Aabb;
use crate::sim::fixed::Fxp;
use crate::sim::state::{DrawCall, Visual};
use crate::sim::vector::Vec3;

/// A model placed by the arena. It never moves; its collision lives in the
/// terrain cell it stands on, see [`StaticDetail::collider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDetail {
    position: Vec3,
    angle: Fxp,
    model: u16,
}

impl StaticDetail {
    pub fn new(position: Vec3, angle: Fxp, model: u16) -> Self {
        Self {
            position,
            angle,
            model,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn model(&self) -> u16 {
        self.model
    }

    /// Box to install as the tile's static collider
    pub fn collider(&self) -> Aabb {
        Aabb::from_center_extent(
            self.position,
            Vec3::new(
                STATIC_DETAIL_EXTENT_XY,
                STATIC_DETAIL_EXTENT_XY,
                STATIC_DETAIL_EXTENT_Z,
            ),
        )
    }

    pub fn draw(&self) -> DrawCall {
        DrawCall {
            visual: Visual::Model(self.model),
            position: self.position,
            angle: self.angle,
            scale: Fxp::ONE,
        }
    }
}
