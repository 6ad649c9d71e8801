//! Precomputed unit geometry shared by every tessellator
//!
//! Circles, arcs and round caps are built from a unit circle sampled at a
//! fixed resolution; cubic curves from a table of Bernstein weights. The
//! default tables are built once per process and shared.

use std::f64::consts::{PI, TAU};
use std::sync::{Arc, OnceLock};

use gal_core::Vec2;

/// Number of segments of a full circle
pub const CIRCLE_POINTS: usize = 64;

/// Number of segments of a cubic curve
pub const CURVE_POINTS: usize = 32;

#[derive(Debug)]
pub struct UnitTables {
    /// `circle_points + 1` points on the unit circle, first point repeated last
    circle: Vec<Vec2>,
    /// Half circle from angle 0 to PI, used for round caps
    semicircle: Vec<Vec2>,
    /// Bernstein weights of a cubic for `curve_points + 1` equally spaced `t`
    curve_weights: Vec<[f64; 4]>,
}

static DEFAULT_TABLES: OnceLock<Arc<UnitTables>> = OnceLock::new();

impl UnitTables {
    pub fn new(circle_points: usize, curve_points: usize) -> Self {
        let circle_points = circle_points.max(8);
        let curve_points = curve_points.max(2);

        let circle = (0..=circle_points)
            .map(|i| Vec2::from_angle(TAU * (i % circle_points) as f64 / circle_points as f64))
            .collect();

        let half = circle_points / 2;
        let semicircle = (0..=half)
            .map(|i| Vec2::from_angle(PI * i as f64 / half as f64))
            .collect();

        let curve_weights = (0..=curve_points)
            .map(|i| {
                let t = i as f64 / curve_points as f64;
                let u = 1.0 - t;
                [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t]
            })
            .collect();

        Self {
            circle,
            semicircle,
            curve_weights,
        }
    }

    /// Tables at the default resolution, built on first use
    pub fn shared() -> Arc<UnitTables> {
        DEFAULT_TABLES
            .get_or_init(|| Arc::new(UnitTables::new(CIRCLE_POINTS, CURVE_POINTS)))
            .clone()
    }

    /// Tables for the given resolution, reusing the shared ones when possible
    pub fn for_resolution(circle_points: usize, curve_points: usize) -> Arc<UnitTables> {
        if circle_points == CIRCLE_POINTS && curve_points == CURVE_POINTS {
            Self::shared()
        } else {
            Arc::new(UnitTables::new(circle_points, curve_points))
        }
    }

    pub fn circle_points(&self) -> usize {
        self.circle.len() - 1
    }

    pub fn curve_points(&self) -> usize {
        self.curve_weights.len() - 1
    }

    /// Angle between two consecutive circle points
    pub fn angle_step(&self) -> f64 {
        TAU / self.circle_points() as f64
    }

    pub fn circle(&self) -> &[Vec2] {
        &self.circle
    }

    pub fn semicircle(&self) -> &[Vec2] {
        &self.semicircle
    }

    pub fn curve_weights(&self) -> &[[f64; 4]] {
        &self.curve_weights
    }

    /// Unit vectors of a counter-clockwise arc of `sweep` radians starting at
    /// `start`.
    ///
    /// Uses the circle table points that fall inside the sweep and always ends
    /// exactly on the end angle, so the last segment may be shorter.
    pub fn unit_arc(&self, start: f64, sweep: f64) -> Vec<Vec2> {
        let step = self.angle_step();
        let full_steps = ((sweep / step) + 1e-9).floor() as usize;
        let full_steps = full_steps.min(self.circle_points());
        let (sin, cos) = start.sin_cos();

        let mut points: Vec<Vec2> = self.circle[..=full_steps]
            .iter()
            .map(|v| Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos))
            .collect();

        let remainder = sweep - full_steps as f64 * step;
        if remainder > 1e-9 {
            points.push(Vec2::from_angle(start + sweep));
        } else if let Some(last) = points.last_mut() {
            *last = Vec2::from_angle(start + sweep);
        }

        points
    }
}
