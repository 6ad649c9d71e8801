//! The rendering engine behind the drawing API
//!
//! `GalEngine` owns everything needed to turn draw calls into GPU-ready
//! geometry: paint state, the transform stack, unit tables, the depth
//! compositor, the group cache and the frame batch. It owns no window and no
//! GPU device; the renderer consumes its frame batch and group cache.

use std::sync::Arc;

use gal_core::{
    DrawContext, GalError, GroupContext, GroupId, Matrix3x3, PaintState, Point, TransformStack,
    Vec2, WorldView,
};

use crate::depth::{DepthCompositor, DEPTH_ADJUST_FACTOR};
use crate::group::{FrameBatch, GroupCache};
use crate::mesh::Mesh;
use crate::tables::{UnitTables, CIRCLE_POINTS, CURVE_POINTS};
use crate::tessellator::Tessellator;

/// Engine configuration
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Segments of a full circle
    pub circle_points: usize,
    /// Segments of a cubic curve
    pub curve_points: usize,
    /// Longest miter, as a multiple of the line width, before a bevel is used
    pub miter_limit: f64,
    /// Accepted layer depths, mapped onto the normalized depth buffer range
    pub depth_range: (f64, f64),
    /// Depth step between pieces of one primitive
    pub depth_adjust: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            circle_points: CIRCLE_POINTS,
            curve_points: CURVE_POINTS,
            miter_limit: 1.5,
            depth_range: (-2048.0, 2047.0),
            depth_adjust: DEPTH_ADJUST_FACTOR,
        }
    }
}

impl EngineConfig {
    pub fn with_circle_points(mut self, points: usize) -> Self {
        self.circle_points = points;
        self
    }

    pub fn with_curve_points(mut self, points: usize) -> Self {
        self.curve_points = points;
        self
    }

    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    pub fn with_depth_range(mut self, near: f64, far: f64) -> Self {
        self.depth_range = (near, far);
        self
    }
}

pub struct GalEngine {
    config: EngineConfig,
    tables: Arc<UnitTables>,
    paint: PaintState,
    view: WorldView,
    world_screen: Matrix3x3,
    transforms: TransformStack,
    depth: DepthCompositor,
    groups: GroupCache,
    frame: FrameBatch,
    is_drawing: bool,
}

impl Default for GalEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GalEngine {
    pub fn new(config: EngineConfig) -> Self {
        let tables = UnitTables::for_resolution(config.circle_points, config.curve_points);
        let depth = DepthCompositor::new(config.depth_range, config.depth_adjust);
        let view = WorldView::default();
        let world_screen = view.compute_world_screen_matrix();

        tracing::debug!(
            circle_points = tables.circle_points(),
            curve_points = tables.curve_points(),
            "engine created"
        );

        Self {
            config,
            tables,
            paint: PaintState::default(),
            view,
            world_screen,
            transforms: TransformStack::new(world_screen),
            depth,
            groups: GroupCache::new(),
            frame: FrameBatch::new(),
            is_drawing: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // === Frame lifecycle ===

    /// Starts a frame: resets the transform stack to the world/screen matrix
    /// and clears the immediate batch
    pub fn begin_drawing(&mut self) {
        if self.is_drawing {
            tracing::warn!("begin_drawing called twice without end_drawing");
        }
        self.compute_world_screen_matrix();
        self.transforms.reset(self.world_screen);
        self.frame.clear();
        self.is_drawing = true;
    }

    /// Seals the frame; the batch stays readable until the next `begin_drawing`
    pub fn end_drawing(&mut self) -> &FrameBatch {
        if self.transforms.depth() != 0 {
            tracing::warn!(depth = self.transforms.depth(), "frame ended with unbalanced save");
        }
        if self.groups.is_recording() {
            tracing::warn!("frame ended while a group is still recording");
        }
        self.is_drawing = false;
        &self.frame
    }

    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    /// Records a clear to the background color
    pub fn clear_screen(&mut self) {
        self.frame.push_clear(self.paint.background_color);
    }

    /// Hook for hosts that submit work mid-frame; geometry is already queued
    pub fn flush(&mut self) {
        tracing::trace!(calls = self.frame.calls.len(), "flush");
    }

    pub fn frame(&self) -> &FrameBatch {
        &self.frame
    }

    pub fn take_frame(&mut self) -> FrameBatch {
        std::mem::take(&mut self.frame)
    }

    pub fn groups(&self) -> &GroupCache {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut GroupCache {
        &mut self.groups
    }

    /// The sealed frame together with the groups it references
    pub fn frame_and_groups(&mut self) -> (&FrameBatch, &mut GroupCache) {
        (&self.frame, &mut self.groups)
    }

    /// The frame with every group reference expanded
    pub fn resolved_frame(&self) -> Mesh {
        self.frame.resolve(&self.groups)
    }

    // === View ===

    pub fn view(&self) -> &WorldView {
        &self.view
    }

    pub fn screen_size(&self) -> Vec2 {
        self.view.screen_size
    }

    pub fn resize_screen(&mut self, width: i64, height: i64) -> Result<(), GalError> {
        if width <= 0 || height <= 0 {
            return Err(GalError::InvalidViewport { width, height });
        }
        self.view.screen_size = Vec2::new(width as f64, height as f64);
        self.compute_world_screen_matrix();
        tracing::debug!(width, height, "screen resized");
        Ok(())
    }

    pub fn set_zoom_factor(&mut self, zoom: f64) {
        self.view.zoom_factor = zoom;
    }

    pub fn zoom_factor(&self) -> f64 {
        self.view.zoom_factor
    }

    pub fn set_look_at_point(&mut self, point: Point) {
        self.view.look_at = point;
    }

    pub fn set_world_unit_length(&mut self, length: f64) {
        self.view.world_unit_length = length;
    }

    pub fn set_screen_dpi(&mut self, dpi: f64) {
        self.view.screen_dpi = dpi;
    }

    pub fn set_flip_y(&mut self, flip: bool) {
        self.view.flip_y = flip;
    }

    /// Recomputes the world/screen matrix from the view parameters.
    ///
    /// Outside a frame, or at the outermost transform level, the current
    /// matrix follows immediately.
    pub fn compute_world_screen_matrix(&mut self) {
        self.world_screen = self.view.compute_world_screen_matrix();
        if !self.is_drawing || self.transforms.depth() == 0 {
            self.transforms.reset(self.world_screen);
        }
    }

    pub fn world_screen_matrix(&self) -> Matrix3x3 {
        self.world_screen
    }

    pub fn set_world_screen_matrix(&mut self, matrix: Matrix3x3) {
        self.world_screen = matrix;
        self.transforms.reset(matrix);
    }

    /// Maps a cursor position in screen pixels to world coordinates
    pub fn compute_cursor_to_world(&self, cursor: Point) -> Result<Point, GalError> {
        self.world_screen
            .inverse()
            .map(|inv| inv * cursor)
            .ok_or(GalError::SingularMatrix)
    }

    // === Tessellation ===

    fn tessellate(&mut self, f: impl FnOnce(&mut Tessellator)) {
        if self.paint.is_invisible() {
            return;
        }

        let recording = self.groups.is_recording();
        let first_index = self.frame.mesh.indices.len() as u32;
        {
            let mesh = match self.groups.open_mesh_mut() {
                Some(group) => group,
                None => &mut self.frame.mesh,
            };
            let mut tessellator = Tessellator::new(
                &self.tables,
                &self.paint,
                self.transforms.current(),
                &mut self.depth,
                self.config.miter_limit,
                mesh,
            );
            f(&mut tessellator);
        }

        if !recording {
            let last_index = self.frame.mesh.indices.len() as u32;
            self.frame.push_immediate(first_index..last_index);
        }
    }
}

impl DrawContext for GalEngine {
    fn paint(&self) -> &PaintState {
        &self.paint
    }

    fn paint_mut(&mut self) -> &mut PaintState {
        &mut self.paint
    }

    fn transform(&mut self, matrix: &Matrix3x3) {
        self.transforms.transform(matrix);
    }

    fn current_matrix(&self) -> Matrix3x3 {
        *self.transforms.current()
    }

    fn save(&mut self) {
        self.transforms.save();
    }

    fn restore(&mut self) -> Result<(), GalError> {
        self.transforms.restore()
    }

    fn draw_line(&mut self, start: Point, end: Point) {
        self.tessellate(|t| t.line(start, end));
    }

    fn draw_polyline(&mut self, points: &[Point]) {
        self.tessellate(|t| t.polyline(points));
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        self.tessellate(|t| t.circle(center, radius));
    }

    fn draw_arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        self.tessellate(|t| t.arc(center, radius, start_angle, end_angle));
    }

    fn draw_rectangle(&mut self, start: Point, end: Point) {
        self.tessellate(|t| t.rectangle(start, end));
    }

    fn draw_polygon(&mut self, points: &[Point]) {
        self.tessellate(|t| t.polygon(points));
    }

    fn draw_poly_contours(&mut self, contours: &[Vec<Point>]) {
        self.tessellate(|t| t.contours(contours));
    }

    fn draw_curve(&mut self, start: Point, control_a: Point, control_b: Point, end: Point) {
        self.tessellate(|t| t.curve(start, control_a, control_b, end));
    }
}

impl GroupContext for GalEngine {
    fn begin_group(&mut self) -> Result<GroupId, GalError> {
        self.groups.begin()
    }

    fn end_group(&mut self) -> Result<(), GalError> {
        self.groups.end().map(|_| ())
    }

    fn draw_group(&mut self, group: GroupId) {
        let Some(cached) = self.groups.get(group) else {
            tracing::warn!(?group, "draw_group on a deleted group");
            return;
        };

        if self.groups.is_recording() {
            // Nested replay bakes a copy into the group being recorded
            let copy = cached.clone();
            if let Some(open) = self.groups.open_mesh_mut() {
                open.append(&copy);
            }
        } else {
            self.frame.push_group(group);
        }
    }

    fn delete_group(&mut self, group: GroupId) {
        if !self.groups.remove(group) {
            tracing::warn!(?group, "delete_group on an unknown group");
        }
    }

    fn is_group_valid(&self, group: GroupId) -> bool {
        self.groups.contains(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::DrawCall;

    #[test]
    fn test_invalid_viewport() {
        let mut engine = GalEngine::default();
        assert_eq!(
            engine.resize_screen(0, 10),
            Err(GalError::InvalidViewport { width: 0, height: 10 })
        );
        assert!(engine.resize_screen(1024, 768).is_ok());
        assert_eq!(engine.screen_size(), Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn test_clear_uses_background() {
        let mut engine = GalEngine::default();
        engine.begin_drawing();
        engine.set_background_color(gal_core::Color::BLUE);
        engine.clear_screen();
        let frame = engine.end_drawing();
        assert_eq!(frame.calls, vec![DrawCall::Clear(gal_core::Color::BLUE)]);
    }

    #[test]
    fn test_calls_merge_into_one_range() {
        let mut engine = GalEngine::default();
        engine.begin_drawing();
        engine.draw_line(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        engine.draw_line(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        let frame = engine.end_drawing();
        assert_eq!(frame.calls, vec![DrawCall::Immediate(0..12)]);
    }

    #[test]
    fn test_cursor_to_world_roundtrip() {
        let mut engine = GalEngine::default();
        engine.set_zoom_factor(3.0);
        engine.set_look_at_point(Point::new(12.0, -4.0));
        engine.compute_world_screen_matrix();

        let world = Point::new(13.0, -2.0);
        let screen = engine.world_screen_matrix() * world;
        let back = engine.compute_cursor_to_world(screen).unwrap();
        assert!(back.distance(world) < 1e-9);
    }

    #[test]
    fn test_custom_resolution() {
        let engine = GalEngine::new(EngineConfig::default().with_circle_points(16));
        assert_eq!(engine.tables.circle_points(), 16);
    }
}
