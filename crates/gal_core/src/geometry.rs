//! Geometric primitives

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D vector in double precision.
///
/// World coordinates can be large (board units are nanometres), so geometry is
/// kept in `f64` until it is baked into GPU vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// Points and vectors share one representation
pub type Point = Vec2;

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn splat(v: f64) -> Self {
        Self { x: v, y: v }
    }

    /// Unit vector at `angle` radians
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn euclidean_norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn squared_norm(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Angle of the vector in radians, in `(-PI, PI]`
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn dot(&self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    pub fn cross(&self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Counter-clockwise perpendicular
    pub fn perpendicular(&self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Returns the unit vector, or zero for a zero-length vector
    pub fn normalized(&self) -> Self {
        let len = self.euclidean_norm();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    pub fn rotated(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn distance(&self, other: Vec2) -> f64 {
        (*self - other).euclidean_norm()
    }

    pub fn lerp(&self, other: Vec2, t: f64) -> Self {
        *self + (other - *self) * t
    }

    pub fn to_f32(&self) -> [f32; 2] {
        [self.x as f32, self.y as f32]
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// An axis-aligned box stored as origin + size.
///
/// The size may be negative until [`Box2D::normalize`] is called, matching how
/// boxes are built from two arbitrary corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Box2D {
    pub origin: Point,
    pub size: Vec2,
}

impl Box2D {
    pub const fn new(origin: Point, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn from_corners(start: Point, end: Point) -> Self {
        Self::new(start, end - start)
    }

    /// Smallest box containing all `points`; `None` for an empty input
    pub fn compute<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);

        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some(Self::from_corners(min, max))
    }

    pub fn x(&self) -> f64 {
        self.origin.x
    }

    pub fn y(&self) -> f64 {
        self.origin.y
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    /// Corner opposite to the origin
    pub fn end(&self) -> Point {
        self.origin + self.size
    }

    pub fn center(&self) -> Point {
        self.origin + self.size * 0.5
    }

    /// Flips negative extents so that `origin` is the minimum corner
    pub fn normalize(mut self) -> Self {
        if self.size.x < 0.0 {
            self.origin.x += self.size.x;
            self.size.x = -self.size.x;
        }
        if self.size.y < 0.0 {
            self.origin.y += self.size.y;
            self.size.y = -self.size.y;
        }
        self
    }

    pub fn contains(&self, point: Point) -> bool {
        let b = self.normalize();
        point.x >= b.origin.x
            && point.x <= b.origin.x + b.size.x
            && point.y >= b.origin.y
            && point.y <= b.origin.y + b.size.y
    }

    /// True when the boxes overlap or touch
    pub fn intersects(&self, other: &Box2D) -> bool {
        let (a, b) = (self.normalize(), other.normalize());
        a.origin.x <= b.end().x
            && b.origin.x <= a.end().x
            && a.origin.y <= b.end().y
            && b.origin.y <= a.end().y
    }

    /// Grows the box by `margin` on every side
    pub fn inflate(&self, margin: f64) -> Self {
        let b = self.normalize();
        Self::new(
            b.origin - Vec2::splat(margin),
            b.size + Vec2::splat(2.0 * margin),
        )
    }

    /// Grows the box to include `point`
    pub fn merge_point(&self, point: Point) -> Self {
        let b = self.normalize();
        let end = b.end();
        Self::from_corners(
            Point::new(b.origin.x.min(point.x), b.origin.y.min(point.y)),
            Point::new(end.x.max(point.x), end.y.max(point.y)),
        )
    }
}
