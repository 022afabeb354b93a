//! Axis-aligned bounding boxes and collision probes
//!
//! Everything in the arena collides as a box: players, mines, crates and the
//! static props stamped into terrain cells. Projectiles probe with a point.

use super::fixed::Fxp;
use super::vector::Vec3;

/// Axis-aligned box; `min <= max` on every axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning two corners given in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box centred on `center` reaching `extent` along each axis.
    ///
    /// The extent's sign is ignored.
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        let extent = extent.abs();
        Self {
            min: center - extent,
            max: center + extent,
        }
    }

    /// Tightest box around a point cloud, `None` when empty
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::point(*first);
        for p in rest {
            aabb.min = Vec3::new(aabb.min.x.min(p.x), aabb.min.y.min(p.y), aabb.min.z.min(p.z));
            aabb.max = Vec3::new(aabb.max.x.max(p.x), aabb.max.y.max(p.y), aabb.max.z.max(p.z));
        }
        Some(aabb)
    }

    /// Zero-volume box at a single point
    pub const fn point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) >> 1
    }

    /// Half-size along each axis
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) >> 1
    }

    /// Overlap test; touching faces count as overlapping
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Point containment, boundary inclusive
    pub fn contains_point(&self, p: &Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Same box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Distance between box centres
    pub fn center_distance(&self, p: Vec3) -> Fxp {
        (self.center() - p).length()
    }
}

/// Shape used to probe for collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Box(Aabb),
    Point(Vec3),
}

impl Probe {
    pub fn hits(&self, target: &Aabb) -> bool {
        match self {
            Probe::Box(aabb) => target.intersects(aabb),
            Probe::Point(p) => target.contains_point(p),
        }
    }
}

/// An actor that can be hit by other actors
pub trait Collider {
    /// Current world-space bounds
    fn bounds(&self) -> Aabb;

    /// Disabled colliders are skipped by every query
    fn collider_enabled(&self) -> bool {
        true
    }

    fn collides_with(&self, probe: &Probe) -> bool {
        self.collider_enabled() && probe.hits(&self.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_box_at(x: i32, y: i32, z: i32) -> Aabb {
        Aabb::from_center_extent(Vec3::from_ints(x, y, z), Vec3::from_ints(1, 1, 1))
    }

    #[test]
    fn test_from_center_extent_negative_extent() {
        let aabb = Aabb::from_center_extent(Vec3::ZERO, Vec3::from_ints(-2, 3, -4));
        assert_eq!(aabb.min, Vec3::from_ints(-2, -3, -4));
        assert_eq!(aabb.max, Vec3::from_ints(2, 3, 4));
    }

    #[test]
    fn test_from_points() {
        let points = [
            Vec3::from_ints(1, -2, 3),
            Vec3::from_ints(-4, 5, 0),
            Vec3::from_ints(2, 2, -6),
        ];
        let aabb = Aabb::from_points(&points).unwrap();
        assert_eq!(aabb.min, Vec3::from_ints(-4, -2, -6));
        assert_eq!(aabb.max, Vec3::from_ints(2, 5, 3));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn test_touching_faces_overlap() {
        let a = unit_box_at(0, 0, 0);
        let b = unit_box_at(2, 0, 0);
        let c = unit_box_at(3, 0, 0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_point_probe() {
        let aabb = unit_box_at(5, 5, 5);
        assert!(Probe::Point(Vec3::from_ints(6, 6, 6)).hits(&aabb));
        assert!(!Probe::Point(Vec3::from_ints(7, 5, 5)).hits(&aabb));
    }

    #[test]
    fn test_center_and_extent() {
        let aabb = Aabb::new(Vec3::from_ints(4, 0, 2), Vec3::from_ints(0, 8, -2));
        assert_eq!(aabb.center(), Vec3::from_ints(2, 4, 0));
        assert_eq!(aabb.extent(), Vec3::from_ints(2, 4, 2));
    }

    fn coord() -> impl Strategy<Value = Fxp> {
        (-(200 << 16)..(200 << 16)).prop_map(Fxp::from_raw)
    }

    fn arb_vec3() -> impl Strategy<Value = Vec3> {
        (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn arb_box() -> impl Strategy<Value = Aabb> {
        (arb_vec3(), arb_vec3()).prop_map(|(a, b)| Aabb::new(a, b))
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn overlap_is_reflexive(a in arb_box()) {
            prop_assert!(a.intersects(&a));
        }

        #[test]
        fn point_probe_matches_containment(a in arb_box(), p in arb_vec3()) {
            prop_assert_eq!(Probe::Point(p).hits(&a), a.contains_point(&p));
            prop_assert_eq!(a.contains_point(&p), a.intersects(&Aabb::point(p)));
        }

        #[test]
        fn center_extent_keeps_ordering(c in arb_vec3(), e in arb_vec3()) {
            let aabb = Aabb::from_center_extent(c, e);
            prop_assert!(aabb.min.x <= aabb.max.x);
            prop_assert!(aabb.min.y <= aabb.max.y);
            prop_assert!(aabb.min.z <= aabb.max.z);
            prop_assert!(aabb.contains_point(&c));
        }
    }
}
