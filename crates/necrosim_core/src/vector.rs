//! 2D vector operations.
//!
//! The plain [`Vec2`] value type lives in `necrosim_data`; this module adds
//! the operations the engine needs through the [`VectorOps`] trait. Callers
//! must guard zero-magnitude inputs before invoking the magnitude-dependent
//! operations (`set_magnitude`, `angle_between`): normalizing a zero vector
//! is undefined.

use necrosim_data::Vec2;

pub trait VectorOps {
    fn magnitude(&self) -> f64;
    /// Squared magnitude; avoids the square root when only comparing.
    fn magnitude_squared(&self) -> f64;
    fn dot(&self, other: &Vec2) -> f64;
    /// Angle between two non-zero vectors, in radians within [0, pi].
    fn angle_between(&self, other: &Vec2) -> f64;
    /// Rotate in place by `radians` (counter-clockwise).
    fn rotate(&mut self, radians: f64);
    /// Mirror in place across the direction of `axis`. A zero axis leaves
    /// the vector unchanged.
    fn reflect_across(&mut self, axis: &Vec2);
    /// Rescale in place to the given magnitude, preserving direction. The
    /// current magnitude must be non-zero.
    fn set_magnitude(&mut self, magnitude: f64);
    /// Unit vector in the same direction. The magnitude must be non-zero.
    fn normalized(&self) -> Vec2;
}

impl VectorOps for Vec2 {
    fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    fn dot(&self, other: &Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    fn angle_between(&self, other: &Vec2) -> f64 {
        let denom = self.magnitude() * other.magnitude();
        let cos = (self.dot(other) / denom).clamp(-1.0, 1.0);
        cos.acos()
    }

    fn rotate(&mut self, radians: f64) {
        let (sin, cos) = radians.sin_cos();
        let x = cos * self.x - sin * self.y;
        let y = sin * self.x + cos * self.y;
        self.x = x;
        self.y = y;
    }

    fn reflect_across(&mut self, axis: &Vec2) {
        let len_sq = axis.magnitude_squared();
        if len_sq == 0.0 {
            return;
        }
        let scale = 2.0 * self.dot(axis) / len_sq;
        let x = scale * axis.x - self.x;
        let y = scale * axis.y - self.y;
        self.x = x;
        self.y = y;
    }

    fn set_magnitude(&mut self, magnitude: f64) {
        let current = self.magnitude();
        let scale = magnitude / current;
        self.x *= scale;
        self.y *= scale;
    }

    fn normalized(&self) -> Vec2 {
        let mut v = *self;
        v.set_magnitude(1.0);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-9;

    #[test]
    fn test_magnitude_and_squared() {
        let v = Vec2::new(3.0, 4.0);
        assert!((v.magnitude() - 5.0).abs() < TOL);
        assert!((v.magnitude_squared() - 25.0).abs() < TOL);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mut v = Vec2::new(1.0, 0.0);
        v.rotate(FRAC_PI_2);
        assert!(v.x.abs() < TOL);
        assert!((v.y - 1.0).abs() < TOL);
    }

    #[test]
    fn test_rotate_full_turn_is_identity() {
        let mut v = Vec2::new(0.3, -0.7);
        v.rotate(2.0 * PI);
        assert!((v.x - 0.3).abs() < TOL);
        assert!((v.y + 0.7).abs() < TOL);
    }

    #[test]
    fn test_reflect_across_x_axis() {
        let mut v = Vec2::new(1.0, 1.0);
        v.reflect_across(&Vec2::new(1.0, 0.0));
        assert!((v.x - 1.0).abs() < TOL);
        assert!((v.y + 1.0).abs() < TOL);
    }

    #[test]
    fn test_reflect_across_zero_axis_is_noop() {
        let mut v = Vec2::new(1.0, 2.0);
        v.reflect_across(&Vec2::ZERO);
        assert_eq!(v, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_set_magnitude_preserves_direction() {
        let mut v = Vec2::new(3.0, 4.0);
        v.set_magnitude(10.0);
        assert!((v.x - 6.0).abs() < TOL);
        assert!((v.y - 8.0).abs() < TOL);
    }

    #[test]
    fn test_angle_between_orthogonal() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 5.0);
        assert!((a.angle_between(&b) - FRAC_PI_2).abs() < TOL);
    }

    #[test]
    fn test_angle_between_opposite() {
        let a = Vec2::new(2.0, 0.0);
        let b = Vec2::new(-1.0, 0.0);
        assert!((a.angle_between(&b) - PI).abs() < TOL);
    }
}
