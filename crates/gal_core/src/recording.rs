//! A `DrawContext` that records calls instead of tessellating them.
//!
//! Used by painters and text layout code that need to inspect what would be
//! drawn, and by tests that have no GPU.

use slotmap::SlotMap;

use crate::context::{DrawContext, GroupContext, GroupId};
use crate::error::GalError;
use crate::geometry::Point;
use crate::matrix::Matrix3x3;
use crate::paint::PaintState;
use crate::transform::TransformStack;

/// World-space geometry of a recorded call
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedShape {
    Line {
        start: Point,
        end: Point,
    },
    Polyline {
        points: Vec<Point>,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Rectangle {
        start: Point,
        end: Point,
    },
    Polygon {
        points: Vec<Point>,
    },
    PolyContours {
        contours: Vec<Vec<Point>>,
    },
    Curve {
        start: Point,
        control_a: Point,
        control_b: Point,
        end: Point,
    },
}

/// One recorded call with the matrix and paint state active at call time
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub shape: RecordedShape,
    pub matrix: Matrix3x3,
    pub paint: PaintState,
}

impl DrawCommand {
    /// Defining points of the shape mapped through the recorded matrix
    pub fn screen_points(&self) -> Vec<Point> {
        let world: Vec<Point> = match &self.shape {
            RecordedShape::Line { start, end } => vec![*start, *end],
            RecordedShape::Polyline { points } | RecordedShape::Polygon { points } => {
                points.clone()
            }
            RecordedShape::Circle { center, .. } | RecordedShape::Arc { center, .. } => {
                vec![*center]
            }
            RecordedShape::Rectangle { start, end } => vec![
                *start,
                Point::new(end.x, start.y),
                *end,
                Point::new(start.x, end.y),
            ],
            RecordedShape::PolyContours { contours } => contours.concat(),
            RecordedShape::Curve {
                start,
                control_a,
                control_b,
                end,
            } => vec![*start, *control_a, *control_b, *end],
        };

        world
            .into_iter()
            .map(|p| self.matrix.transform_point(p))
            .collect()
    }

    /// Line width as it appears on screen
    pub fn screen_line_width(&self) -> f64 {
        self.paint.line_width * self.matrix.uniform_scale()
    }
}

pub struct RecordingContext {
    paint: PaintState,
    transforms: TransformStack,
    commands: Vec<DrawCommand>,
    groups: SlotMap<GroupId, Vec<DrawCommand>>,
    open_group: Option<GroupId>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::with_matrix(Matrix3x3::IDENTITY)
    }

    /// Start recording under a base matrix (typically the world/screen matrix)
    pub fn with_matrix(base: Matrix3x3) -> Self {
        Self {
            paint: PaintState::default(),
            transforms: TransformStack::new(base),
            commands: Vec::new(),
            groups: SlotMap::with_key(),
            open_group: None,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn transform_depth(&self) -> usize {
        self.transforms.depth()
    }

    fn record(&mut self, shape: RecordedShape) {
        if self.paint.is_invisible() {
            return;
        }

        let command = DrawCommand {
            shape,
            matrix: *self.transforms.current(),
            paint: self.paint.clone(),
        };

        match self.open_group.and_then(|id| self.groups.get_mut(id)) {
            Some(group) => group.push(command),
            None => self.commands.push(command),
        }
    }
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawContext for RecordingContext {
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
        self.record(RecordedShape::Line { start, end });
    }

    fn draw_polyline(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }
        self.record(RecordedShape::Polyline {
            points: points.to_vec(),
        });
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        self.record(RecordedShape::Circle { center, radius });
    }

    fn draw_arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        self.record(RecordedShape::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn draw_rectangle(&mut self, start: Point, end: Point) {
        self.record(RecordedShape::Rectangle { start, end });
    }

    fn draw_polygon(&mut self, points: &[Point]) {
        if points.len() < 3 {
            return;
        }
        self.record(RecordedShape::Polygon {
            points: points.to_vec(),
        });
    }

    fn draw_poly_contours(&mut self, contours: &[Vec<Point>]) {
        if contours.iter().all(|c| c.len() < 3) {
            return;
        }
        self.record(RecordedShape::PolyContours {
            contours: contours.to_vec(),
        });
    }

    fn draw_curve(&mut self, start: Point, control_a: Point, control_b: Point, end: Point) {
        self.record(RecordedShape::Curve {
            start,
            control_a,
            control_b,
            end,
        });
    }
}

impl GroupContext for RecordingContext {
    fn begin_group(&mut self) -> Result<GroupId, GalError> {
        if self.open_group.is_some() {
            return Err(GalError::GroupAlreadyOpen);
        }
        let id = self.groups.insert(Vec::new());
        self.open_group = Some(id);
        Ok(id)
    }

    fn end_group(&mut self) -> Result<(), GalError> {
        self.open_group
            .take()
            .map(|_| ())
            .ok_or(GalError::NoOpenGroup)
    }

    fn draw_group(&mut self, group: GroupId) {
        let Some(recorded) = self.groups.get(group) else {
            tracing::warn!(?group, "draw_group on a deleted group");
            return;
        };

        match self.open_group {
            Some(open) if open == group => {
                tracing::warn!(?group, "draw_group on the group being recorded");
            }
            // Nested replay bakes a copy into the group being recorded
            Some(open) => {
                let copy = recorded.clone();
                if let Some(target) = self.groups.get_mut(open) {
                    target.extend(copy);
                }
            }
            None => self.commands.extend(recorded.iter().cloned()),
        }
    }

    fn delete_group(&mut self, group: GroupId) {
        if self.open_group == Some(group) {
            self.open_group = None;
        }
        self.groups.remove(group);
    }

    fn is_group_valid(&self, group: GroupId) -> bool {
        self.groups.contains_key(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn test_records_with_current_matrix() {
        let mut ctx = RecordingContext::new();
        ctx.translate(Vec2::new(10.0, 20.0));
        ctx.draw_line(Point::new(0.0, 0.0), Point::new(1.0, 0.0));

        let pts = ctx.commands()[0].screen_points();
        assert_eq!(pts, vec![Point::new(10.0, 20.0), Point::new(11.0, 20.0)]);
    }

    #[test]
    fn test_invisible_paint_is_noop() {
        let mut ctx = RecordingContext::new();
        ctx.set_stroke_enabled(false);
        ctx.set_fill_enabled(false);
        ctx.draw_circle(Point::ZERO, 5.0);
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn test_group_replay() {
        let mut ctx = RecordingContext::new();
        let group = ctx.begin_group().unwrap();
        ctx.draw_line(Point::ZERO, Point::new(1.0, 1.0));
        assert_eq!(ctx.begin_group(), Err(GalError::GroupAlreadyOpen));
        ctx.end_group().unwrap();
        assert!(ctx.commands().is_empty());

        ctx.draw_group(group);
        ctx.draw_group(group);
        assert_eq!(ctx.commands().len(), 2);

        ctx.delete_group(group);
        ctx.draw_group(group);
        assert_eq!(ctx.commands().len(), 2);
        assert!(!ctx.is_group_valid(group));
    }

    #[test]
    fn test_replay_inside_open_group_is_baked() {
        let mut ctx = RecordingContext::new();
        let inner = ctx.begin_group().unwrap();
        ctx.draw_line(Point::ZERO, Point::new(1.0, 0.0));
        ctx.end_group().unwrap();

        let outer = ctx.begin_group().unwrap();
        ctx.draw_group(inner);
        ctx.draw_circle(Point::ZERO, 2.0);
        ctx.end_group().unwrap();
        assert!(ctx.commands().is_empty());

        // the copy survives deleting the original
        ctx.delete_group(inner);
        ctx.draw_group(outer);
        assert_eq!(ctx.commands().len(), 2);
        assert!(matches!(ctx.commands()[0].shape, RecordedShape::Line { .. }));
    }
}
