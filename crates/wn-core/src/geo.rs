//! World-space vector type and axis-aligned volumes.
//!
//! Coordinates are single-precision metres in a right-handed, Y-up frame.
//! Ground-plane logic (headings, sensor cones) works on the XZ plane via
//! [`Vec3::flat`]; height only matters for distance and containment.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 3-D position, velocity, or direction.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    /// Unit vector along +Z, the default facing of a freshly spawned agent.
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec3) -> f32 {
        (other - self).length()
    }

    #[inline]
    pub fn distance_squared(self, other: Vec3) -> f32 {
        (other - self).length_squared()
    }

    /// Unit vector in the same direction, or `ZERO` for (near-)zero input.
    pub fn normalize_or_zero(self) -> Vec3 {
        let len = self.length();
        if len < 1e-6 { Vec3::ZERO } else { self * (1.0 / len) }
    }

    /// Projection onto the ground plane (`y = 0`).
    #[inline]
    pub fn flat(self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    /// Linear interpolation; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        self + (other - self) * t
    }

    /// Move from `self` towards `target` by at most `max_step`, never
    /// overshooting.
    pub fn move_towards(self, target: Vec3, max_step: f32) -> Vec3 {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist < 1e-6 {
            target
        } else {
            self + delta * (max_step / dist)
        }
    }

    /// `[x, y, z]` for spatial-index entries.
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ── Aabb ──────────────────────────────────────────────────────────────────────

/// Axis-aligned box used for signal zones and navigable bounds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Build from two opposite corners in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box of the given half extents centred on `center`.
    pub fn around(center: Vec3, half: Vec3) -> Self {
        Self::from_corners(center - half, center + half)
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        self.min.lerp(self.max, 0.5)
    }
}
