//! Board item kinds
//!
//! Angles are in radians; lengths and positions in world units.

use gal_core::{Box2D, Point, Vec2};
use gal_text::TextAttributes;
use smallvec::{smallvec, SmallVec};

use crate::layer::{ItemLayer, Layer};
use crate::view::Viewable;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub start: Point,
    pub end: Point,
    pub width: f64,
    pub layer: u8,
    pub net: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Via {
    pub center: Point,
    /// Outer diameter
    pub width: f64,
    pub drill: f64,
    pub net: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadShape {
    Circle,
    Oval,
    Rect,
    Trapezoid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    pub position: Point,
    pub size: Vec2,
    /// Shape offset from the drill position, in pad coordinates
    pub offset: Vec2,
    pub orientation: f64,
    pub shape: PadShape,
    /// Zero for surface mount pads
    pub drill: Vec2,
    pub drill_shape: PadShape,
    pub layer: u8,
    pub net: i32,
    pub name: String,
    pub netname: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentShape {
    Line {
        start: Point,
        end: Point,
    },
    Rect {
        start: Point,
        end: Point,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Polygon(Vec<Point>),
    Curve {
        start: Point,
        control_a: Point,
        control_b: Point,
        end: Point,
    },
}

/// A graphic line, arc, circle, polygon or curve
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub shape: SegmentShape,
    pub width: f64,
    pub layer: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
    pub position: Point,
    pub orientation: f64,
    pub thickness: f64,
    pub attributes: TextAttributes,
    pub layer: u8,
}

/// A copper zone as its already filled polygons
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub polygons: Vec<Vec<Point>>,
    pub filled: bool,
    /// Thermal relief bridge width; outlines are drawn at half of it
    pub bridge_width: f64,
    pub layer: u8,
    pub net: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    /// Crossbar, feature lines and arrow heads
    pub lines: Vec<(Point, Point)>,
    pub width: f64,
    pub text: Text,
    pub layer: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    Plus,
    Cross,
}

/// Alignment target
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub position: Point,
    pub size: f64,
    pub shape: TargetShape,
    pub width: f64,
    pub layer: u8,
}

impl Target {
    pub fn radius(&self) -> f64 {
        match self.shape {
            TargetShape::Cross => self.size / 2.0,
            TargetShape::Plus => self.size / 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardItem {
    Track(Track),
    Via(Via),
    Pad(Pad),
    Segment(Segment),
    Text(Text),
    Zone(Zone),
    Dimension(Dimension),
    Target(Target),
}

fn points_bbox(points: impl IntoIterator<Item = Point>, margin: f64) -> Box2D {
    Box2D::compute(points).unwrap_or_default().inflate(margin)
}

fn circle_bbox(center: Point, radius: f64) -> Box2D {
    Box2D::from_corners(center, center).inflate(radius)
}

fn text_bbox(text: &Text) -> Box2D {
    let lines = text.text.split('\n').count().max(1) as f64;
    let chars = text
        .text
        .split('\n')
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as f64;
    let size = text.attributes.glyph_size;
    // Generous: any justification and rotation stays inside
    let reach = (chars * size.x).hypot(lines * size.y * 1.5) + text.thickness;
    circle_bbox(text.position, reach)
}

impl Viewable for BoardItem {
    fn view_layers(&self) -> SmallVec<[Layer; 4]> {
        match self {
            BoardItem::Track(track) => smallvec![Layer::Board(track.layer)],
            BoardItem::Via(_) => smallvec![
                Layer::Item(ItemLayer::Vias),
                Layer::Item(ItemLayer::ViaHoles)
            ],
            BoardItem::Pad(pad) => {
                let mut layers = smallvec![Layer::Board(pad.layer)];
                if pad.drill.x > 0.0 && pad.drill.y > 0.0 {
                    layers.push(Layer::Item(ItemLayer::PadHoles));
                }
                layers.push(Layer::Item(ItemLayer::Netnames));
                layers
            }
            BoardItem::Segment(segment) => smallvec![Layer::Board(segment.layer)],
            BoardItem::Text(text) => smallvec![Layer::Board(text.layer)],
            BoardItem::Zone(zone) => smallvec![Layer::Board(zone.layer)],
            BoardItem::Dimension(dimension) => smallvec![Layer::Board(dimension.layer)],
            BoardItem::Target(target) => smallvec![Layer::Board(target.layer)],
        }
    }

    fn view_bbox(&self) -> Box2D {
        match self {
            BoardItem::Track(track) => points_bbox([track.start, track.end], track.width / 2.0),
            BoardItem::Via(via) => circle_bbox(via.center, via.width / 2.0),
            BoardItem::Pad(pad) => {
                let half = pad.size * 0.5 + Vec2::new(pad.offset.x.abs(), pad.offset.y.abs());
                circle_bbox(pad.position, half.euclidean_norm())
            }
            BoardItem::Segment(segment) => {
                let margin = segment.width / 2.0;
                match &segment.shape {
                    SegmentShape::Line { start, end } | SegmentShape::Rect { start, end } => {
                        points_bbox([*start, *end], margin)
                    }
                    SegmentShape::Arc { center, radius, .. }
                    | SegmentShape::Circle { center, radius } => {
                        circle_bbox(*center, radius + margin)
                    }
                    SegmentShape::Polygon(points) => points_bbox(points.iter().copied(), margin),
                    SegmentShape::Curve {
                        start,
                        control_a,
                        control_b,
                        end,
                    } => points_bbox([*start, *control_a, *control_b, *end], margin),
                }
            }
            BoardItem::Text(text) => text_bbox(text),
            BoardItem::Zone(zone) => points_bbox(
                zone.polygons.iter().flatten().copied(),
                zone.bridge_width / 4.0,
            ),
            BoardItem::Dimension(dimension) => {
                let lines = points_bbox(
                    dimension.lines.iter().flat_map(|&(a, b)| [a, b]),
                    dimension.width / 2.0,
                );
                let text = text_bbox(&dimension.text);
                lines.merge_point(text.origin).merge_point(text.end())
            }
            BoardItem::Target(target) => {
                circle_bbox(target.position, target.size / 2.0 + target.width / 2.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(drill: f64) -> Pad {
        Pad {
            position: Point::new(10.0, 10.0),
            size: Vec2::new(2.0, 1.0),
            offset: Vec2::ZERO,
            orientation: 0.0,
            shape: PadShape::Oval,
            drill: Vec2::splat(drill),
            drill_shape: PadShape::Circle,
            layer: 15,
            net: 1,
            name: "1".into(),
            netname: String::new(),
        }
    }

    #[test]
    fn test_pad_layers() {
        let smd = BoardItem::Pad(pad(0.0));
        assert_eq!(
            smd.view_layers().as_slice(),
            &[Layer::Board(15), Layer::Item(ItemLayer::Netnames)]
        );

        let through_hole = BoardItem::Pad(pad(0.5));
        assert!(through_hole
            .view_layers()
            .contains(&Layer::Item(ItemLayer::PadHoles)));
    }

    #[test]
    fn test_track_bbox_includes_width() {
        let track = BoardItem::Track(Track {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 0.0),
            width: 2.0,
            layer: 0,
            net: 0,
        });
        let bbox = track.view_bbox();
        assert_eq!(bbox.origin, Point::new(-1.0, -1.0));
        assert_eq!(bbox.end(), Point::new(11.0, 1.0));
    }
}
