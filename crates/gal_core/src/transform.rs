//! Transform stack and world/screen view parameters

use crate::error::GalError;
use crate::geometry::{Point, Vec2};
use crate::matrix::Matrix3x3;

/// The current transform plus the matrices saved by `save`.
///
/// Every operation post-multiplies the current matrix, so the most recent
/// call is the first one applied to incoming points.
#[derive(Clone, Debug)]
pub struct TransformStack {
    current: Matrix3x3,
    saved: Vec<Matrix3x3>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new(Matrix3x3::IDENTITY)
    }
}

impl TransformStack {
    pub fn new(base: Matrix3x3) -> Self {
        Self {
            current: base,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &Matrix3x3 {
        &self.current
    }

    /// Replaces the current matrix and forgets every saved one
    pub fn reset(&mut self, base: Matrix3x3) {
        self.current = base;
        self.saved.clear();
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn transform(&mut self, matrix: &Matrix3x3) {
        self.current = self.current.then_apply(matrix);
    }

    pub fn translate(&mut self, v: Vec2) {
        self.transform(&Matrix3x3::translation(v));
    }

    pub fn rotate(&mut self, angle: f64) {
        self.transform(&Matrix3x3::rotation(angle));
    }

    pub fn scale(&mut self, v: Vec2) {
        self.transform(&Matrix3x3::scale(v));
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub fn restore(&mut self) -> Result<(), GalError> {
        match self.saved.pop() {
            Some(m) => {
                self.current = m;
                Ok(())
            }
            None => {
                tracing::warn!("restore without a matching save");
                Err(GalError::UnbalancedRestore)
            }
        }
    }
}

/// Parameters that define the world to screen mapping.
///
/// `screen = center(screen_size) * scale(dpi * unit * zoom) * translate(-look_at) * world`
#[derive(Clone, Debug, PartialEq)]
pub struct WorldView {
    /// Length of one world unit in inches
    pub world_unit_length: f64,
    pub screen_dpi: f64,
    pub zoom_factor: f64,
    /// World point shown at the center of the viewport
    pub look_at: Point,
    pub screen_size: Vec2,
    /// Flip the Y axis (world Y up, screen Y down)
    pub flip_y: bool,
}

impl Default for WorldView {
    fn default() -> Self {
        Self {
            world_unit_length: 1.0,
            screen_dpi: 1.0,
            zoom_factor: 1.0,
            look_at: Point::ZERO,
            screen_size: Vec2::new(800.0, 600.0),
            flip_y: false,
        }
    }
}

impl WorldView {
    /// Pixels per world unit
    pub fn world_scale(&self) -> f64 {
        self.screen_dpi * self.world_unit_length * self.zoom_factor
    }

    pub fn compute_world_screen_matrix(&self) -> Matrix3x3 {
        let scale = self.world_scale();
        let y_scale = if self.flip_y { -scale } else { scale };

        Matrix3x3::translation(self.screen_size * 0.5)
            * Matrix3x3::scale(Vec2::new(scale, y_scale))
            * Matrix3x3::translation(-self.look_at)
    }

    /// Maps a screen position (e.g. the cursor) back to world coordinates
    pub fn screen_to_world(&self, screen: Point) -> Result<Point, GalError> {
        self.compute_world_screen_matrix()
            .inverse()
            .map(|inv| inv * screen)
            .ok_or(GalError::SingularMatrix)
    }
}
