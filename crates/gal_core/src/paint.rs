//! Paint state consulted by every primitive call

use crate::color::Color;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Winding rule used when filling polygons
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Attributes set by the caller between primitive calls.
///
/// Read-only while a single call is tessellated; last write wins.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintState {
    pub fill_enabled: bool,
    pub stroke_enabled: bool,
    pub fill_color: Color,
    pub stroke_color: Color,
    pub background_color: Color,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub fill_rule: FillRule,
    pub layer_depth: f64,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill_enabled: false,
            stroke_enabled: true,
            fill_color: Color::BLACK,
            stroke_color: Color::WHITE,
            background_color: Color::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            fill_rule: FillRule::NonZero,
            layer_depth: 0.0,
        }
    }
}

impl PaintState {
    /// Neither fill nor stroke is enabled: every primitive is a no-op
    pub fn is_invisible(&self) -> bool {
        !self.fill_enabled && !self.stroke_enabled
    }

    pub fn half_width(&self) -> f64 {
        self.line_width * 0.5
    }
}
