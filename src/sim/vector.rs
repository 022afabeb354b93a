//! Three-component fixed-point vector and ground plane

use std::ops::{Add, AddAssign, Mul, Neg, Shl, Shr, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::fixed::{Fxp, isqrt};

/// World axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: Fxp,
    pub y: Fxp,
    pub z: Fxp,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(Fxp::ZERO, Fxp::ZERO, Fxp::ZERO);
    pub const UP: Vec3 = Vec3::new(Fxp::ZERO, Fxp::ZERO, Fxp::ONE);

    #[inline]
    pub const fn new(x: Fxp, y: Fxp, z: Fxp) -> Self {
        Self { x, y, z }
    }

    /// Whole-unit constructor, handy for constants and tests
    pub const fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self::new(Fxp::from_int(x), Fxp::from_int(y), Fxp::from_int(z))
    }

    /// Same value on every axis
    pub const fn splat(value: Fxp) -> Self {
        Self::new(value, value, value)
    }

    pub const fn with_z(self, z: Fxp) -> Self {
        Self::new(self.x, self.y, z)
    }

    #[inline]
    pub fn axis(&self, axis: Axis) -> Fxp {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    #[inline]
    pub fn axis_mut(&mut self, axis: Axis) -> &mut Fxp {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    /// Axis with the largest magnitude; earlier axes win ties
    pub fn dominant_axis(&self) -> Axis {
        let mut best = Axis::X;
        for axis in [Axis::Y, Axis::Z] {
            if self.axis(axis).abs() > self.axis(best).abs() {
                best = axis;
            }
        }
        best
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn dot(self, other: Vec3) -> Fxp {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length, computed on the raw integers so it stays exact
    /// even when the squared length would not fit in 16.16
    pub fn length(self) -> Fxp {
        let sum: u64 = [self.x, self.y, self.z]
            .iter()
            .map(|c| {
                let raw = c.raw().unsigned_abs() as u64;
                raw * raw
            })
            .sum();
        Fxp::from_raw(isqrt(sum) as i32)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Fxp> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: Fxp) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Shr<u32> for Vec3 {
    type Output = Vec3;
    fn shr(self, rhs: u32) -> Vec3 {
        Vec3::new(self.x >> rhs, self.y >> rhs, self.z >> rhs)
    }
}

impl Shl<u32> for Vec3 {
    type Output = Vec3;
    fn shl(self, rhs: u32) -> Vec3 {
        Vec3::new(self.x << rhs, self.y << rhs, self.z << rhs)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = *self - rhs;
    }
}

/// Plane through `point` with normal `normal`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    pub normal: Vec3,
    pub point: Vec3,
}

impl Plane {
    pub const fn new(normal: Vec3, point: Vec3) -> Self {
        Self { normal, point }
    }

    /// Height of the plane above `(x, y)`.
    ///
    /// A vertical plane has no defined height; the anchor height is returned.
    pub fn height_at(&self, x: Fxp, y: Fxp) -> Fxp {
        if self.normal.z == Fxp::ZERO {
            return self.point.z;
        }
        let run = self.normal.x * (x - self.point.x) + self.normal.y * (y - self.point.y);
        self.point.z - run / self.normal.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Vec3::from_ints(1, 2, 3);
        let b = Vec3::from_ints(4, 5, 6);
        assert_eq!(a + b, Vec3::from_ints(5, 7, 9));
        assert_eq!(b - a, Vec3::from_ints(3, 3, 3));
        assert_eq!(a * Fxp::from_int(2), Vec3::from_ints(2, 4, 6));
        assert_eq!(Vec3::from_ints(4, 8, -8) >> 2, Vec3::from_ints(1, 2, -2));
        assert_eq!(-a, Vec3::from_ints(-1, -2, -3));
    }

    #[test]
    fn test_length() {
        assert_eq!(Vec3::from_ints(3, 4, 0).length(), Fxp::from_int(5));
        // squared length overflows 16.16 but the result still fits
        assert_eq!(Vec3::from_ints(300, 400, 0).length(), Fxp::from_int(500));
    }

    #[test]
    fn test_dominant_axis() {
        assert_eq!(Vec3::from_ints(1, -5, 2).dominant_axis(), Axis::Y);
        assert_eq!(Vec3::from_ints(3, 3, 3).dominant_axis(), Axis::X);
        assert_eq!(Vec3::from_ints(0, 0, -1).dominant_axis(), Axis::Z);
    }

    #[test]
    fn test_plane_height() {
        let flat = Plane::new(Vec3::UP, Vec3::from_ints(4, 4, 7));
        assert_eq!(flat.height_at(Fxp::from_int(100), Fxp::from_int(-3)), Fxp::from_int(7));

        // 45° slope rising along +x
        let slope = Plane::new(Vec3::from_ints(-1, 0, 1), Vec3::from_ints(0, 0, 0));
        assert_eq!(slope.height_at(Fxp::from_int(2), Fxp::ZERO), Fxp::from_int(2));

        let wall = Plane::new(Vec3::from_ints(1, 0, 0), Vec3::from_ints(0, 0, 9));
        assert_eq!(wall.height_at(Fxp::ONE, Fxp::ONE), Fxp::from_int(9));
    }
}
