//! Deterministic 16.16 fixed-point scalar
//!
//! Every position, velocity, angle and timer in the simulation is an [`Fxp`].
//! Arithmetic is plain integer math, so results are bit-identical on every
//! platform. Every operation wraps on overflow, in debug and release alike.
//! Multiplication and division widen to `i64` internally and wrap when the
//! result is narrowed back.
//!
//! Trigonometry uses a quarter-wave sine table built at compile time.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Shl, Shr, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Number of fractional bits in the raw representation
pub const FRACTION_BITS: u32 = 16;

const FRACTION_MASK: i32 = (1 << FRACTION_BITS) - 1;

/// Signed 16.16 fixed-point number
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fxp(i32);

impl Fxp {
    pub const ZERO: Fxp = Fxp(0);
    pub const ONE: Fxp = Fxp(1 << FRACTION_BITS);
    pub const HALF: Fxp = Fxp(1 << (FRACTION_BITS - 1));
    pub const MAX: Fxp = Fxp(i32::MAX);
    pub const MIN: Fxp = Fxp(i32::MIN);
    /// π radians
    pub const PI: Fxp = Fxp(205_887);
    /// 2π radians
    pub const TAU: Fxp = Fxp(411_775);

    /// Build from a raw bit pattern
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Fxp(raw)
    }

    /// Raw bit pattern
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Fxp(value << FRACTION_BITS)
    }

    /// Exact-as-possible `num / den`, truncated toward zero.
    ///
    /// Used for compile-time tuning constants such as `from_ratio(106, 10)`.
    pub const fn from_ratio(num: i32, den: i32) -> Self {
        Fxp((((num as i64) << FRACTION_BITS) / den as i64) as i32)
    }

    /// Integer part, rounded toward negative infinity
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRACTION_BITS
    }

    /// Drop the fractional bits, rounding toward zero
    pub const fn truncate_fraction(self) -> Self {
        if self.0 >= 0 {
            Fxp(self.0 & !FRACTION_MASK)
        } else {
            Fxp(-((-self.0) & !FRACTION_MASK))
        }
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Fxp(self.0.wrapping_abs())
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Product, wrapping when it leaves the 16.16 range
    pub const fn times(self, rhs: Fxp) -> Self {
        Fxp(((self.0 as i64 * rhs.0 as i64) >> FRACTION_BITS) as i32)
    }

    /// Division; a zero divisor saturates toward the sign of the dividend
    pub const fn divided_by(self, rhs: Fxp) -> Self {
        if rhs.0 == 0 {
            return if self.0 > 0 {
                Fxp::MAX
            } else if self.0 < 0 {
                Fxp::MIN
            } else {
                Fxp::ZERO
            };
        }
        Fxp((((self.0 as i64) << FRACTION_BITS) / rhs.0 as i64) as i32)
    }

    /// Square root, zero for negative inputs
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Fxp::ZERO;
        }
        Fxp(isqrt((self.0 as u64) << FRACTION_BITS) as i32)
    }

    /// Sine of an angle in radians
    pub fn sin(self) -> Self {
        let step = (self.0 as i64 * FULL_TURN_STEPS).div_euclid(Fxp::TAU.0 as i64);
        let step = step.rem_euclid(FULL_TURN_STEPS) as usize;
        let offset = step % QUARTER_STEPS;
        let value = match step / QUARTER_STEPS {
            0 => QUARTER_SINE[offset],
            1 => QUARTER_SINE[QUARTER_STEPS - offset],
            2 => -QUARTER_SINE[offset],
            _ => -QUARTER_SINE[QUARTER_STEPS - offset],
        };
        Fxp(value)
    }

    /// Cosine of an angle in radians
    pub fn cos(self) -> Self {
        (self + Fxp::TAU.divided_by(Fxp::from_int(4))).sin()
    }
}

/// Floor square root of a `u64`
pub(crate) fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = n / 2 + 1;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

const QUARTER_STEPS: usize = 256;
const FULL_TURN_STEPS: i64 = (QUARTER_STEPS * 4) as i64;

/// π/2 with 30 fractional bits
const HALF_PI_Q30: i64 = 1_686_629_713;

/// sin(i · π/512) for i in 0..=256, in 16.16
const QUARTER_SINE: [i32; QUARTER_STEPS + 1] = build_quarter_sine();

const fn build_quarter_sine() -> [i32; QUARTER_STEPS + 1] {
    let mut table = [0i32; QUARTER_STEPS + 1];
    let mut i = 0;
    while i <= QUARTER_STEPS {
        // Taylor series to x^13 in Q30
        let x = HALF_PI_Q30 * i as i64 / QUARTER_STEPS as i64;
        let mut term = x;
        let mut sum = x;
        let mut k: i64 = 1;
        while k <= 6 {
            let squared = (((term * x) >> 30) * x) >> 30;
            term = -squared / ((2 * k) * (2 * k + 1));
            sum += term;
            k += 1;
        }
        table[i] = ((sum + (1 << 13)) >> 14) as i32;
        i += 1;
    }
    table
}

impl Add for Fxp {
    type Output = Fxp;
    #[inline]
    fn add(self, rhs: Fxp) -> Fxp {
        Fxp(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fxp {
    type Output = Fxp;
    #[inline]
    fn sub(self, rhs: Fxp) -> Fxp {
        Fxp(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Fxp {
    type Output = Fxp;
    #[inline]
    fn neg(self) -> Fxp {
        Fxp(self.0.wrapping_neg())
    }
}

impl Mul for Fxp {
    type Output = Fxp;
    #[inline]
    fn mul(self, rhs: Fxp) -> Fxp {
        self.times(rhs)
    }
}

impl Div for Fxp {
    type Output = Fxp;
    #[inline]
    fn div(self, rhs: Fxp) -> Fxp {
        self.divided_by(rhs)
    }
}

/// Arithmetic shift: divides by a power of two, rounding toward negative
/// infinity (identical to truncation for non-negative arena coordinates)
impl Shr<u32> for Fxp {
    type Output = Fxp;
    #[inline]
    fn shr(self, rhs: u32) -> Fxp {
        Fxp(self.0 >> rhs)
    }
}

impl Shl<u32> for Fxp {
    type Output = Fxp;
    #[inline]
    fn shl(self, rhs: u32) -> Fxp {
        Fxp(self.0.wrapping_shl(rhs))
    }
}

impl AddAssign for Fxp {
    #[inline]
    fn add_assign(&mut self, rhs: Fxp) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl SubAssign for Fxp {
    #[inline]
    fn sub_assign(&mut self, rhs: Fxp) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl MulAssign for Fxp {
    #[inline]
    fn mul_assign(&mut self, rhs: Fxp) {
        *self = self.times(rhs);
    }
}

impl From<i32> for Fxp {
    fn from(value: i32) -> Self {
        Fxp::from_int(value)
    }
}

impl fmt::Display for Fxp {
    /// Four decimal places, computed without floating point
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = (self.0 as i64).abs();
        let whole = magnitude >> FRACTION_BITS;
        let fraction = ((magnitude & FRACTION_MASK as i64) * 10_000) >> FRACTION_BITS;
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{whole}.{fraction:04}")
    }
}
