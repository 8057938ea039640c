//! 2D affine transform handed to rendering layers
//!
//! Row-vector convention used by most 2D compositors:
//! x' = a·x + c·y + tx, y' = b·x + d·y + ty

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            tx,
            ty,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// Rotation by `radians` (counter-clockwise in a y-up space)
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Apply `self` first, then `next`
    pub fn then(&self, next: &AffineTransform) -> AffineTransform {
        AffineTransform {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            tx: next.a * self.tx + next.c * self.ty + next.tx,
            ty: next.b * self.tx + next.d * self.ty + next.ty,
        }
    }

    /// Conjugate by a pivot: move pivot to origin, apply self, move back
    pub fn about(&self, pivot: (f32, f32)) -> AffineTransform {
        AffineTransform::translation(-pivot.0, -pivot.1)
            .then(self)
            .then(&AffineTransform::translation(pivot.0, pivot.1))
    }

    pub fn apply(&self, point: (f32, f32)) -> (f32, f32) {
        let (x, y) = point;
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    pub fn approx_eq(&self, other: &AffineTransform, eps: f32) -> bool {
        (self.a - other.a).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.c - other.c).abs() <= eps
            && (self.d - other.d).abs() <= eps
            && (self.tx - other.tx).abs() <= eps
            && (self.ty - other.ty).abs() <= eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(p: (f32, f32), q: (f32, f32)) -> bool {
        (p.0 - q.0).abs() < 1e-4 && (p.1 - q.1).abs() < 1e-4
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let r = AffineTransform::rotation(FRAC_PI_2);
        assert!(close(r.apply((1.0, 0.0)), (0.0, 1.0)));
    }

    #[test]
    fn test_then_order() {
        let t = AffineTransform::scale(2.0, 2.0).then(&AffineTransform::translation(5.0, 0.0));
        assert!(close(t.apply((1.0, 1.0)), (7.0, 2.0)));
    }

    #[test]
    fn test_pivot_is_fixed_point() {
        let pivot = (40.0, -12.0);
        let t = AffineTransform::rotation(0.7)
            .then(&AffineTransform::scale(0.8, 1.1))
            .about(pivot);
        assert!(close(t.apply(pivot), pivot));
    }
}
