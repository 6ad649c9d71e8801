//! Shape tessellation
//!
//! Converts one primitive call into triangles in screen space. World points
//! go through the current matrix first; line widths are scaled by the
//! matrix's uniform scale. Stroke pieces are emitted before the fill so the
//! outline sits in front of the interior (see [`crate::depth`]).

use std::f64::consts::TAU;

use gal_core::{Color, LineCap, LineJoin, Matrix3x3, PaintState, Point, Vec2};

use crate::depth::DepthCompositor;
use crate::mesh::Mesh;
use crate::polygon;
use crate::tables::UnitTables;

/// Points closer than this in screen space are merged
const MERGE_EPSILON: f64 = 1e-9;

/// Normalizes an arc into a counter-clockwise `(start, sweep)` pair.
///
/// Angles are reduced into `[0, 2π)`; a start greater than the end wraps
/// around. A raw span of at least 2π is a full circle and a zero sweep is
/// degenerate (`None`).
pub fn arc_sweep(start_angle: f64, end_angle: f64) -> Option<(f64, f64)> {
    if !start_angle.is_finite() || !end_angle.is_finite() {
        return None;
    }

    let start = start_angle.rem_euclid(TAU);
    if (end_angle - start_angle).abs() >= TAU {
        return Some((start, TAU));
    }

    let end = end_angle.rem_euclid(TAU);
    let mut sweep = end - start;
    if sweep < 0.0 {
        sweep += TAU;
    }

    if sweep <= MERGE_EPSILON {
        None
    } else {
        Some((start, sweep))
    }
}

pub struct Tessellator<'a> {
    tables: &'a UnitTables,
    paint: &'a PaintState,
    matrix: &'a Matrix3x3,
    depth: &'a mut DepthCompositor,
    miter_limit: f64,
    mesh: &'a mut Mesh,
}

impl<'a> Tessellator<'a> {
    /// Starts a new primitive at the paint state's layer depth
    pub fn new(
        tables: &'a UnitTables,
        paint: &'a PaintState,
        matrix: &'a Matrix3x3,
        depth: &'a mut DepthCompositor,
        miter_limit: f64,
        mesh: &'a mut Mesh,
    ) -> Self {
        depth.begin(paint.layer_depth);
        Self {
            tables,
            paint,
            matrix,
            depth,
            miter_limit,
            mesh,
        }
    }

    fn to_screen(&self, p: Point) -> Point {
        self.matrix.transform_point(p)
    }

    fn screen_half_width(&self) -> f64 {
        self.paint.half_width() * self.matrix.uniform_scale()
    }

    // === Primitives ===

    /// One oriented quad; caps only when stroking
    pub fn line(&mut self, start: Point, end: Point) {
        let a = self.to_screen(start);
        let b = self.to_screen(end);
        let dir = (b - a).normalized();
        if dir == Vec2::ZERO {
            return;
        }

        let hw = self.screen_half_width();
        let color = if self.paint.stroke_enabled {
            self.paint.stroke_color
        } else {
            self.paint.fill_color
        };

        self.segment(a, b, hw, color);
        if self.paint.stroke_enabled {
            self.cap(a, -dir, hw, color);
            self.cap(b, dir, hw, color);
        }
    }

    pub fn polyline(&mut self, points: &[Point]) {
        if !self.paint.stroke_enabled {
            return;
        }
        let screen: Vec<Point> = points.iter().map(|p| self.to_screen(*p)).collect();
        self.stroke_path(&screen, false, self.paint.stroke_color);
    }

    pub fn circle(&mut self, center: Point, radius: f64) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let c = self.to_screen(center);
        let (tables, matrix) = (self.tables, self.matrix);
        let ring = |r: f64| -> Vec<Point> {
            tables
                .circle()
                .iter()
                .map(|u| matrix.transform_point(center + *u * r))
                .collect()
        };

        if self.paint.stroke_enabled {
            let hw = self.paint.half_width();
            let outer = ring(radius + hw);
            let inner_radius = (radius - hw).max(0.0);
            let z = self.depth.next_piece();
            if inner_radius > 0.0 {
                let inner = ring(inner_radius);
                self.mesh
                    .push_strip(&inner, &outer, z, self.paint.stroke_color);
            } else {
                self.mesh.push_fan(c, &outer, z, self.paint.stroke_color);
            }
        }

        if self.paint.fill_enabled {
            let rim = ring(radius);
            let z = self.depth.next_piece();
            self.mesh.push_fan(c, &rim, z, self.paint.fill_color);
        }
    }

    /// Counter-clockwise arc; the fill is the circular segment under the chord
    pub fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let Some((start, sweep)) = arc_sweep(start_angle, end_angle) else {
            return;
        };
        if sweep >= TAU {
            self.circle(center, radius);
            return;
        }

        let rim: Vec<Point> = self
            .tables
            .unit_arc(start, sweep)
            .into_iter()
            .map(|u| self.to_screen(center + u * radius))
            .collect();

        if self.paint.stroke_enabled {
            self.stroke_path(&rim, false, self.paint.stroke_color);
        }

        if self.paint.fill_enabled {
            let (Some(first), Some(last)) = (rim.first(), rim.last()) else {
                return;
            };
            let chord_mid = first.lerp(*last, 0.5);
            let z = self.depth.next_piece();
            self.mesh.push_fan(chord_mid, &rim, z, self.paint.fill_color);
        }
    }

    pub fn rectangle(&mut self, start: Point, end: Point) {
        let corners = [
            self.to_screen(start),
            self.to_screen(Point::new(end.x, start.y)),
            self.to_screen(end),
            self.to_screen(Point::new(start.x, end.y)),
        ];

        if self.paint.stroke_enabled {
            self.stroke_path(&corners, true, self.paint.stroke_color);
        }

        if self.paint.fill_enabled {
            let z = self.depth.next_piece();
            let [a, b, c, d] = corners;
            self.mesh.push_quad(a, b, c, d, z, self.paint.fill_color);
        }
    }

    pub fn polygon(&mut self, points: &[Point]) {
        self.contours(&[points]);
    }

    /// Contours are outlines and holes combined under the paint's fill rule
    pub fn contours<C: AsRef<[Point]>>(&mut self, contours: &[C]) {
        let screen: Vec<Vec<Point>> = contours
            .iter()
            .map(|c| c.as_ref().iter().map(|p| self.to_screen(*p)).collect())
            .filter(|c: &Vec<Point>| c.len() >= 3)
            .collect();
        if screen.is_empty() {
            return;
        }

        if self.paint.stroke_enabled {
            for contour in &screen {
                self.stroke_path(contour, true, self.paint.stroke_color);
            }
        }

        if self.paint.fill_enabled {
            let z = self.depth.next_piece();
            polygon::fill_contours(
                &screen,
                self.paint.fill_rule,
                z,
                self.paint.fill_color,
                self.mesh,
            );
        }
    }

    /// Cubic Bezier sampled at the table's fixed resolution
    pub fn curve(&mut self, start: Point, control_a: Point, control_b: Point, end: Point) {
        if !self.paint.stroke_enabled {
            return;
        }
        let points: Vec<Point> = self
            .tables
            .curve_weights()
            .iter()
            .map(|[w0, w1, w2, w3]| {
                self.to_screen(start * *w0 + control_a * *w1 + control_b * *w2 + end * *w3)
            })
            .collect();
        self.stroke_path(&points, false, self.paint.stroke_color);
    }

    // === Stroke synthesis, screen space ===

    /// Segment quads, joins at shared vertices, caps at open ends
    fn stroke_path(&mut self, points: &[Point], closed: bool, color: Color) {
        let mut pts: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            if pts.last().map_or(true, |last| last.distance(*p) > MERGE_EPSILON) {
                pts.push(*p);
            }
        }
        if closed && pts.len() > 2 && pts[0].distance(pts[pts.len() - 1]) <= MERGE_EPSILON {
            pts.pop();
        }
        if pts.len() < 2 {
            return;
        }

        let closed = closed && pts.len() > 2;
        let n = pts.len();
        let hw = self.screen_half_width();
        let segments = if closed { n } else { n - 1 };

        for i in 0..segments {
            self.segment(pts[i], pts[(i + 1) % n], hw, color);
        }

        let direction = |i: usize| (pts[(i + 1) % n] - pts[i]).normalized();
        let joints = if closed { 0..n } else { 1..n - 1 };
        for i in joints {
            let incoming = direction((i + n - 1) % n);
            let outgoing = direction(i);
            self.join(pts[i], incoming, outgoing, hw, color);
        }

        if !closed {
            self.cap(pts[0], -direction(0), hw, color);
            self.cap(pts[n - 1], direction(n - 2), hw, color);
        }
    }

    fn segment(&mut self, a: Point, b: Point, hw: f64, color: Color) {
        let normal = (b - a).normalized().perpendicular() * hw;
        let z = self.depth.next_piece();
        self.mesh
            .push_quad(a + normal, b + normal, b - normal, a - normal, z, color);
    }

    /// Fills the gap on the outer side of the corner at `p`
    fn join(&mut self, p: Point, incoming: Vec2, outgoing: Vec2, hw: f64, color: Color) {
        let cross = incoming.cross(outgoing);
        if cross.abs() < MERGE_EPSILON {
            // Straight continuation or full reversal: no wedge to fill
            return;
        }

        let side = if cross > 0.0 { -1.0 } else { 1.0 };
        let n_in = incoming.perpendicular() * side;
        let n_out = outgoing.perpendicular() * side;
        let a = p + n_in * hw;
        let b = p + n_out * hw;
        let z = self.depth.next_piece();

        match self.paint.line_join {
            LineJoin::Bevel => self.mesh.push_triangle(p, a, b, z, color),
            LineJoin::Miter => {
                let bisector = (n_in + n_out).normalized();
                let cos_half = bisector.dot(n_in);
                let extension = if cos_half > MERGE_EPSILON {
                    hw / cos_half
                } else {
                    f64::INFINITY
                };

                if extension <= self.miter_limit * 2.0 * hw {
                    let tip = p + bisector * extension;
                    self.mesh.push_quad(p, a, tip, b, z, color);
                } else {
                    self.mesh.push_triangle(p, a, b, z, color);
                }
            }
            LineJoin::Round => {
                let sweep = n_in.cross(n_out).atan2(n_in.dot(n_out));
                let steps = (sweep.abs() / self.tables.angle_step()).ceil().max(1.0) as usize;
                let rim: Vec<Point> = (0..=steps)
                    .map(|i| p + n_in.rotated(sweep * i as f64 / steps as f64) * hw)
                    .collect();
                self.mesh.push_fan(p, &rim, z, color);
            }
        }
    }

    /// Cap at `end`; `outward` points away from the line
    fn cap(&mut self, end: Point, outward: Vec2, hw: f64, color: Color) {
        let normal = outward.perpendicular();
        match self.paint.line_cap {
            LineCap::Butt => {}
            LineCap::Square => {
                let z = self.depth.next_piece();
                let ext = outward * hw;
                let n = normal * hw;
                self.mesh
                    .push_quad(end + n, end + n + ext, end - n + ext, end - n, z, color);
            }
            LineCap::Round => {
                let z = self.depth.next_piece();
                let rim: Vec<Point> = self
                    .tables
                    .semicircle()
                    .iter()
                    .map(|u| end + (normal * u.x + outward * u.y) * hw)
                    .collect();
                self.mesh.push_fan(end, &rim, z, color);
            }
        }
    }
}
