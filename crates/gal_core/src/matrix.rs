//! 3x3 affine matrices
//!
//! Row-major, acting on column vectors:
//!
//! ```text
//! | m00 m01 m02 |   | x |
//! | m10 m11 m12 | * | y |
//! |  0   0   1  |   | 1 |
//! ```

use std::ops::Mul;

use crate::geometry::{Point, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix3x3 {
    pub m: [[f64; 3]; 3],
}

impl Default for Matrix3x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3x3 {
    pub const IDENTITY: Matrix3x3 = Matrix3x3 {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub fn translation(v: Vec2) -> Self {
        Self {
            m: [[1.0, 0.0, v.x], [0.0, 1.0, v.y], [0.0, 0.0, 1.0]],
        }
    }

    pub fn scale(v: Vec2) -> Self {
        Self {
            m: [[v.x, 0.0, 0.0], [0.0, v.y, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            m: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// `self * other`: `other` is applied to points first
    pub fn then_apply(&self, other: &Matrix3x3) -> Matrix3x3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Matrix3x3 { m: out }
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2],
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2],
        )
    }

    /// Applies only the linear part (no translation)
    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y,
            self.m[1][0] * v.x + self.m[1][1] * v.y,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.m[0][0] * self.m[1][1] - self.m[0][1] * self.m[1][0]
    }

    /// Uniform scale factor of the linear part, `sqrt(|det|)`
    pub fn uniform_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// True when the linear part mirrors (negative determinant)
    pub fn is_mirrored(&self) -> bool {
        self.determinant() < 0.0
    }

    pub fn translation_part(&self) -> Vec2 {
        Vec2::new(self.m[0][2], self.m[1][2])
    }

    /// Inverse of the affine transform, `None` when singular
    pub fn inverse(&self) -> Option<Matrix3x3> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON * 1e-3 {
            return None;
        }
        let [[a, b, tx], [c, d, ty], _] = self.m;
        let inv_a = d / det;
        let inv_b = -b / det;
        let inv_c = -c / det;
        let inv_d = a / det;
        Some(Matrix3x3 {
            m: [
                [inv_a, inv_b, -(inv_a * tx + inv_b * ty)],
                [inv_c, inv_d, -(inv_c * tx + inv_d * ty)],
                [0.0, 0.0, 1.0],
            ],
        })
    }

    pub fn approx_eq(&self, other: &Matrix3x3, eps: f64) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Matrix3x3 {
    type Output = Matrix3x3;
    fn mul(self, rhs: Matrix3x3) -> Matrix3x3 {
        self.then_apply(&rhs)
    }
}

impl Mul<Point> for Matrix3x3 {
    type Output = Point;
    fn mul(self, rhs: Point) -> Point {
        self.transform_point(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_translate_then_rotate() {
        // Post-multiplied: rotation is applied to points first
        let m = Matrix3x3::translation(Vec2::new(10.0, 0.0)) * Matrix3x3::rotation(FRAC_PI_2);
        let p = m * Point::new(1.0, 0.0);
        assert!((p.x - 10.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse() {
        let m = Matrix3x3::translation(Vec2::new(3.0, -7.0))
            * Matrix3x3::rotation(0.3)
            * Matrix3x3::scale(Vec2::new(2.0, 5.0));
        let inv = m.inverse().unwrap();
        assert!((m * inv).approx_eq(&Matrix3x3::IDENTITY, 1e-12));

        let p = Point::new(1.5, 2.5);
        let back = inv * (m * p);
        assert!(back.distance(p) < 1e-12);
    }

    #[test]
    fn test_singular() {
        assert!(Matrix3x3::scale(Vec2::new(0.0, 1.0)).inverse().is_none());
    }

    #[test]
    fn test_mirrored() {
        assert!(Matrix3x3::scale(Vec2::new(-1.0, 1.0)).is_mirrored());
        assert!(!Matrix3x3::rotation(2.0).is_mirrored());
        assert!((Matrix3x3::scale(Vec2::splat(3.0)).uniform_scale() - 3.0).abs() < 1e-12);
    }
}
