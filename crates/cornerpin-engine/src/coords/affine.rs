use core::ops::Mul;

use super::Vec2;

/// 2D affine transform, stored column-major like a canvas matrix:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine2 {
    pub m: [f32; 6],
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2 {
    pub const IDENTITY: Affine2 = Affine2 { m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0] };

    #[inline]
    pub const fn new(m: [f32; 6]) -> Self {
        Self { m }
    }

    #[inline]
    pub fn translate(t: Vec2) -> Self {
        Self::new([1.0, 0.0, 0.0, 1.0, t.x, t.y])
    }

    #[inline]
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Rotation by `degrees`, clockwise on screen (+Y down).
    #[inline]
    pub fn rotate_degrees(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new([c, s, -s, c, 0.0, 0.0])
    }

    /// Returns the transform that applies `self` first, then `next`.
    #[inline]
    pub fn then(self, next: Affine2) -> Affine2 {
        next * self
    }

    #[inline]
    pub fn transform_point(self, p: Vec2) -> Vec2 {
        let [a, b, c, d, e, f] = self.m;
        Vec2::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    /// Applies the linear part only (no translation).
    #[inline]
    pub fn transform_vector(self, v: Vec2) -> Vec2 {
        let [a, b, c, d, _, _] = self.m;
        Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
    }

    #[inline]
    pub fn determinant(self) -> f32 {
        let [a, b, c, d, _, _] = self.m;
        a * d - b * c
    }

    /// Inverse transform, or `None` when the matrix is singular (zero scale).
    pub fn inverse(self) -> Option<Affine2> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let [a, b, c, d, e, f] = self.m;
        let inv = 1.0 / det;
        Some(Affine2::new([
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * f - d * e) * inv,
            (b * e - a * f) * inv,
        ]))
    }
}

impl Mul for Affine2 {
    type Output = Affine2;

    /// Matrix product `self * rhs`: applies `rhs` first.
    fn mul(self, rhs: Affine2) -> Affine2 {
        let [a0, b0, c0, d0, e0, f0] = self.m;
        let [a1, b1, c1, d1, e1, f1] = rhs.m;
        Affine2::new([
            a0 * a1 + c0 * b1,
            b0 * a1 + d0 * b1,
            a0 * c1 + c0 * d1,
            b0 * c1 + d0 * d1,
            a0 * e1 + c0 * f1 + e0,
            b0 * e1 + d0 * f1 + f0,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn then_applies_in_order() {
        let t = Affine2::scale(2.0, 2.0).then(Affine2::translate(Vec2::new(10.0, 0.0)));
        assert_eq!(t.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));
    }

    #[test]
    fn rotate_quarter_turn_is_clockwise_on_screen() {
        let p = Affine2::rotate_degrees(90.0).transform_point(Vec2::new(1.0, 0.0));
        assert!(close(p, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn inverse_round_trips() {
        let t = Affine2::scale(1.5, 0.5)
            .then(Affine2::rotate_degrees(30.0))
            .then(Affine2::translate(Vec2::new(-7.0, 42.0)));
        let inv = t.inverse().unwrap();
        let p = Vec2::new(13.0, -4.0);
        assert!(close(inv.transform_point(t.transform_point(p)), p));
    }

    #[test]
    fn zero_scale_has_no_inverse() {
        assert!(Affine2::scale(0.0, 1.0).inverse().is_none());
    }
}
