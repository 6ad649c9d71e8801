//! The shape-level drawing API
//!
//! `DrawContext` is what a painter talks to: paint-state mutators, the
//! transform stack, and the primitive calls. All coordinates are in world
//! space and are mapped through the *current* matrix when the call is made.

use crate::color::Color;
use crate::error::GalError;
use crate::geometry::{Point, Vec2};
use crate::matrix::Matrix3x3;
use crate::paint::{FillRule, LineCap, LineJoin, PaintState};

slotmap::new_key_type! {
    /// Opaque handle of a cached group of tessellated draw calls.
    ///
    /// Handles are generational: a handle outlives the group it named without
    /// ever aliasing a newer group.
    pub struct GroupId;
}

pub trait DrawContext {
    // === Paint state ===

    fn paint(&self) -> &PaintState;

    fn paint_mut(&mut self) -> &mut PaintState;

    fn set_fill_enabled(&mut self, enabled: bool) {
        self.paint_mut().fill_enabled = enabled;
    }

    fn set_stroke_enabled(&mut self, enabled: bool) {
        self.paint_mut().stroke_enabled = enabled;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.paint_mut().fill_color = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.paint_mut().stroke_color = color;
    }

    fn set_background_color(&mut self, color: Color) {
        self.paint_mut().background_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.paint_mut().line_width = width.max(0.0);
    }

    fn line_width(&self) -> f64 {
        self.paint().line_width
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.paint_mut().line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.paint_mut().line_join = join;
    }

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.paint_mut().fill_rule = rule;
    }

    fn set_layer_depth(&mut self, depth: f64) {
        self.paint_mut().layer_depth = depth;
    }

    // === Transforms ===

    /// Post-multiplies the current matrix
    fn transform(&mut self, matrix: &Matrix3x3);

    fn current_matrix(&self) -> Matrix3x3;

    fn save(&mut self);

    fn restore(&mut self) -> Result<(), GalError>;

    fn translate(&mut self, v: Vec2) {
        self.transform(&Matrix3x3::translation(v));
    }

    fn rotate(&mut self, angle: f64) {
        self.transform(&Matrix3x3::rotation(angle));
    }

    fn scale(&mut self, v: Vec2) {
        self.transform(&Matrix3x3::scale(v));
    }

    // === Primitives ===

    fn draw_line(&mut self, start: Point, end: Point);

    fn draw_polyline(&mut self, points: &[Point]);

    fn draw_circle(&mut self, center: Point, radius: f64);

    /// Counter-clockwise arc from `start_angle` to `end_angle` (radians)
    fn draw_arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64);

    /// Rectangle spanned by two opposite corners
    fn draw_rectangle(&mut self, start: Point, end: Point);

    fn draw_polygon(&mut self, points: &[Point]);

    /// Polygon made of several contours (outlines and holes)
    fn draw_poly_contours(&mut self, contours: &[Vec<Point>]);

    /// Cubic Bezier curve
    fn draw_curve(&mut self, start: Point, control_a: Point, control_b: Point, end: Point);
}

/// Recording and replay of cached groups
pub trait GroupContext {
    /// Opens a new group; subsequent draw calls are recorded into it
    fn begin_group(&mut self) -> Result<GroupId, GalError>;

    fn end_group(&mut self) -> Result<(), GalError>;

    /// Replays a recorded group; stale handles are ignored
    fn draw_group(&mut self, group: GroupId);

    fn delete_group(&mut self, group: GroupId);

    fn is_group_valid(&self, group: GroupId) -> bool;
}
