//! Screen-space math for element footprints, positions, and scale.
//!
//! Two interpolation flavours drive every transition:
//! - `lerp`: proportional approach, moves a fraction of the remaining
//!   distance (used for focused growth and scale blending).
//! - `move_towards`: bounded linear step, moves at most `max_delta`
//!   along the straight line to the goal (used for retract and shrink).

// ── Vec2 ────────────────────────────────────────────────────

/// 2D vector: screen position in pixels or element footprint (width, height).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation; `t` is clamped to [0, 1] so the result never
    /// leaves the segment between `self` and `other`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Step toward `target` by at most `max_delta`, landing exactly on it
    /// when it is within reach.
    pub fn move_towards(self, target: Self, max_delta: f32) -> Self {
        let dist = self.distance(target);
        if dist <= max_delta || dist < f32::EPSILON {
            return target;
        }
        let k = max_delta / dist;
        Self {
            x: self.x + (target.x - self.x) * k,
            y: self.y + (target.y - self.y) * k,
        }
    }

    /// Component-wise division, used to normalize pixel positions by the
    /// screen resolution.
    pub fn div(self, other: Self) -> Self {
        Self {
            x: if other.x != 0.0 { self.x / other.x } else { 0.0 },
            y: if other.y != 0.0 { self.y / other.y } else { 0.0 },
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

// ── Vec3 ────────────────────────────────────────────────────

/// 3D vector, used for an element's local scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ONE: Self = Self {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ONE
    }
}

// ── Tests ───────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_clamps_fraction() {
        let a = Vec2::ZERO;
        let b = Vec2::new(100.0, 50.0);
        assert_eq!(a.lerp(b, 2.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(50.0, 25.0));
    }

    #[test]
    fn test_move_towards_bounded_step() {
        let a = Vec2::ZERO;
        let b = Vec2::new(30.0, 40.0);
        let step = a.move_towards(b, 10.0);
        assert!((step.distance(a) - 10.0).abs() < 1e-4);
        assert!((step.x - 6.0).abs() < 1e-4);
        assert!((step.y - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_move_towards_lands_exactly() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(2.0, 1.0);
        assert_eq!(a.move_towards(b, 5.0), b);
        assert_eq!(b.move_towards(b, 0.0), b);
    }

    #[test]
    fn test_div_by_zero_axis() {
        let v = Vec2::new(10.0, 10.0).div(Vec2::new(0.0, 20.0));
        assert_eq!(v, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_vec3_lerp() {
        let s = Vec3::ONE.lerp(Vec3::new(0.5, 0.5, 1.0), 0.5);
        assert!((s.x - 0.75).abs() < 1e-6);
        assert!((s.z - 1.0).abs() < 1e-6);
    }
}
