//! Board painter
//!
//! Turns one layer of a [`BoardItem`] into drawing calls. Every draw sets
//! the paint state it relies on; nothing is inherited from the previous item.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};

use gal_core::{Color, DrawContext, GalError, LineCap, LineJoin, Point, Vec2};
use gal_text::{HorizontalJustify, StrokeFont, TextAttributes, VerticalJustify};

use crate::board::{
    BoardItem, Dimension, Pad, PadShape, Segment, SegmentShape, Target, TargetShape, Text, Track,
    Via, Zone,
};
use crate::layer::{ItemLayer, Layer};
use crate::settings::RenderSettings;
use crate::view::ItemPainter;

/// Maps an angle into `(-PI/2, PI/2]` so labels never read upside down
fn normalize_upright(angle: f64) -> f64 {
    FRAC_PI_2 - (FRAC_PI_2 - angle).rem_euclid(PI)
}

pub struct Painter {
    settings: RenderSettings,
    font: StrokeFont,
}

impl Default for Painter {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl Painter {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            font: StrokeFont::new(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Cached groups keep the old colors; update the affected view items
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn font(&self) -> &StrokeFont {
        &self.font
    }

    /// Draws `item` as it appears on `layer`; returns whether anything was
    /// drawn
    pub fn draw<C>(&mut self, ctx: &mut C, item: &BoardItem, layer: Layer) -> Result<bool, GalError>
    where
        C: DrawContext + ?Sized,
    {
        match item {
            BoardItem::Track(track) => self.draw_track(ctx, track),
            BoardItem::Via(via) => Ok(self.draw_via(ctx, via, layer)),
            BoardItem::Pad(pad) => self.draw_pad(ctx, pad, layer),
            BoardItem::Segment(segment) => Ok(self.draw_segment(ctx, segment)),
            BoardItem::Text(text) => self.draw_text(ctx, text),
            BoardItem::Zone(zone) => Ok(self.draw_zone(ctx, zone)),
            BoardItem::Dimension(dimension) => self.draw_dimension(ctx, dimension),
            BoardItem::Target(target) => Ok(self.draw_target(ctx, target)),
        }
    }

    fn draw_track<C>(&self, ctx: &mut C, track: &Track) -> Result<bool, GalError>
    where
        C: DrawContext + ?Sized,
    {
        let color = self.settings.color(Layer::Board(track.layer), track.net);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        ctx.set_stroke_color(color);
        ctx.set_fill_enabled(false);
        ctx.set_stroke_enabled(true);

        if !self.settings.sketch.tracks {
            ctx.set_line_width(track.width);
            ctx.draw_line(track.start, track.end);
            return Ok(true);
        }

        // Outline: two sides and a semicircle at each end
        let line = track.end - track.start;
        let length = line.euclidean_norm();
        let half = track.width / 2.0;

        ctx.set_line_width(self.settings.outline_width);
        ctx.save();
        ctx.translate(track.start);
        ctx.rotate(line.angle());
        ctx.draw_line(Point::new(0.0, half), Point::new(length, half));
        ctx.draw_line(Point::new(0.0, -half), Point::new(length, -half));
        ctx.draw_arc(Point::ZERO, half, FRAC_PI_2, 3.0 * FRAC_PI_2);
        ctx.draw_arc(Point::new(length, 0.0), half, -FRAC_PI_2, FRAC_PI_2);
        ctx.restore()?;
        Ok(true)
    }

    fn draw_via<C>(&self, ctx: &mut C, via: &Via, layer: Layer) -> bool
    where
        C: DrawContext + ?Sized,
    {
        let radius = match layer {
            Layer::Item(ItemLayer::Vias) => via.width / 2.0,
            Layer::Item(ItemLayer::ViaHoles) => via.drill / 2.0,
            _ => return false,
        };

        let color = self.settings.color(layer, via.net);
        if self.settings.sketch.vias {
            ctx.set_fill_enabled(false);
            ctx.set_stroke_enabled(true);
            ctx.set_line_width(self.settings.outline_width);
            ctx.set_stroke_color(color);
        } else {
            ctx.set_fill_enabled(true);
            ctx.set_stroke_enabled(false);
            ctx.set_fill_color(color);
        }
        ctx.draw_circle(via.center, radius);
        true
    }

    fn draw_pad<C>(&mut self, ctx: &mut C, pad: &Pad, layer: Layer) -> Result<bool, GalError>
    where
        C: DrawContext + ?Sized,
    {
        let orientation = normalize_upright(pad.orientation);
        let color = self.settings.color(layer, pad.net);

        if layer == Layer::Item(ItemLayer::Netnames) {
            return self.draw_pad_label(ctx, pad, orientation, color);
        }

        let is_hole = layer == Layer::Item(ItemLayer::PadHoles);
        if is_hole && (pad.drill.x <= 0.0 || pad.drill.y <= 0.0) {
            return Ok(false);
        }

        let sketch = self.settings.sketch.pads;
        ctx.save();
        ctx.translate(pad.position);
        ctx.rotate(-orientation);

        if sketch {
            ctx.set_fill_enabled(false);
            ctx.set_stroke_enabled(true);
            ctx.set_line_cap(LineCap::Round);
            ctx.set_line_join(LineJoin::Miter);
            ctx.set_line_width(self.settings.outline_width);
            ctx.set_stroke_color(color);
        } else {
            ctx.set_fill_enabled(true);
            ctx.set_stroke_enabled(false);
            ctx.set_fill_color(color);
        }

        let (size, shape) = if is_hole {
            (pad.drill / 2.0, pad.drill_shape)
        } else {
            ctx.translate(pad.offset);
            (pad.size / 2.0, pad.shape)
        };

        match shape {
            PadShape::Oval => draw_oval(ctx, size, sketch),
            PadShape::Rect | PadShape::Trapezoid => {
                ctx.draw_rectangle(Point::new(-size.x, -size.y), Point::new(size.x, size.y))
            }
            PadShape::Circle => ctx.draw_circle(Point::ZERO, size.x),
        }

        ctx.restore()?;
        Ok(true)
    }

    /// Pad name, with the net name above it when there is one
    fn draw_pad_label<C>(
        &mut self,
        ctx: &mut C,
        pad: &Pad,
        mut orientation: f64,
        color: Color,
    ) -> Result<bool, GalError>
    where
        C: DrawContext + ?Sized,
    {
        if pad.name.is_empty() && pad.netname.is_empty() {
            return Ok(false);
        }

        let max = self.settings.max_font_size;
        let mut size = Vec2::new((pad.size.x / 2.0).min(max), (pad.size.y / 2.0).min(max));

        // Keep the glyph aspect ratio, reading along the long side
        if size.x < size.y {
            orientation -= FRAC_PI_2;
            size.y = size.x * 4.0 / 3.0;
        } else {
            size.x = size.y * 3.0 / 4.0;
        }

        ctx.save();
        ctx.translate(pad.position);
        ctx.rotate(-orientation);
        ctx.set_stroke_color(color);
        self.font.load_attributes(
            &TextAttributes::default()
                .with_justify(HorizontalJustify::Center, VerticalJustify::Center),
        );

        if !pad.netname.is_empty() {
            size = size / 2.0;
            self.font.set_glyph_size(size);
            ctx.set_line_width(size.y / 10.0);
            self.font.draw(ctx, &pad.netname, Point::new(0.0, size.y), 0.0)?;
            ctx.translate(Vec2::new(0.0, -size.y / 2.0));
        } else {
            self.font.set_glyph_size(size);
            ctx.set_line_width(size.y / 10.0);
        }

        self.font.draw(ctx, &pad.name, Point::ZERO, 0.0)?;
        ctx.restore()?;
        Ok(true)
    }

    fn draw_segment<C>(&self, ctx: &mut C, segment: &Segment) -> bool
    where
        C: DrawContext + ?Sized,
    {
        let color = self.settings.color(Layer::Board(segment.layer), 0);
        ctx.set_fill_enabled(false);
        ctx.set_stroke_enabled(true);
        ctx.set_stroke_color(color);
        ctx.set_line_width(segment.width);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);

        match &segment.shape {
            SegmentShape::Line { start, end } => ctx.draw_line(*start, *end),
            SegmentShape::Rect { start, end } => {
                ctx.set_line_cap(LineCap::Square);
                ctx.set_line_join(LineJoin::Bevel);
                ctx.draw_rectangle(*start, *end);
            }
            SegmentShape::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => ctx.draw_arc(*center, *radius, *start_angle, *end_angle),
            SegmentShape::Circle { center, radius } => ctx.draw_circle(*center, *radius),
            SegmentShape::Polygon(points) => ctx.draw_polygon(points),
            SegmentShape::Curve {
                start,
                control_a,
                control_b,
                end,
            } => ctx.draw_curve(*start, *control_a, *control_b, *end),
        }
        true
    }

    fn draw_text<C>(&mut self, ctx: &mut C, text: &Text) -> Result<bool, GalError>
    where
        C: DrawContext + ?Sized,
    {
        let color = self.settings.color(Layer::Board(text.layer), 0);
        ctx.set_stroke_color(color);
        ctx.set_line_width(text.thickness);
        self.font.load_attributes(&text.attributes);
        self.font.draw(ctx, &text.text, text.position, text.orientation)?;
        Ok(!text.text.is_empty())
    }

    fn draw_zone<C>(&self, ctx: &mut C, zone: &Zone) -> bool
    where
        C: DrawContext + ?Sized,
    {
        let color = self.settings.color(Layer::Board(zone.layer), zone.net);
        ctx.set_line_cap(LineCap::Butt);
        ctx.set_line_join(LineJoin::Round);
        ctx.set_fill_color(color);
        ctx.set_stroke_color(color);
        ctx.set_fill_enabled(zone.filled);
        ctx.set_stroke_enabled(true);
        ctx.set_line_width(zone.bridge_width / 2.0);

        let mut drawn = false;
        for polygon in zone.polygons.iter().filter(|p| p.len() >= 3) {
            ctx.draw_polygon(polygon);
            drawn = true;
        }
        drawn
    }

    fn draw_dimension<C>(&mut self, ctx: &mut C, dimension: &Dimension) -> Result<bool, GalError>
    where
        C: DrawContext + ?Sized,
    {
        let color = self.settings.color(Layer::Board(dimension.layer), 0);
        ctx.set_stroke_color(color);
        ctx.set_fill_enabled(false);
        ctx.set_stroke_enabled(true);
        ctx.set_line_width(dimension.width);

        for &(start, end) in &dimension.lines {
            ctx.draw_line(start, end);
        }

        self.draw_text(ctx, &dimension.text)?;
        Ok(true)
    }

    fn draw_target<C>(&self, ctx: &mut C, target: &Target) -> bool
    where
        C: DrawContext + ?Sized,
    {
        let color = self.settings.color(Layer::Board(target.layer), 0);
        ctx.set_stroke_color(color);
        ctx.set_fill_enabled(false);
        ctx.set_stroke_enabled(true);
        ctx.set_line_width(target.width);
        ctx.draw_circle(target.position, target.radius());

        let arm = target.size / 2.0;
        let (a, b) = match target.shape {
            TargetShape::Plus => (Vec2::new(arm, 0.0), Vec2::new(0.0, arm)),
            TargetShape::Cross => (
                Vec2::new(arm, arm) * FRAC_1_SQRT_2,
                Vec2::new(arm, -arm) * FRAC_1_SQRT_2,
            ),
        };
        ctx.draw_line(target.position - a, target.position + a);
        ctx.draw_line(target.position - b, target.position + b);
        true
    }
}

/// Oval centered on the origin with half extents `size`: two half circles
/// joined along the long side
fn draw_oval<C>(ctx: &mut C, size: Vec2, sketch: bool)
where
    C: DrawContext + ?Sized,
{
    if size.y >= size.x {
        let m = size.y - size.x;
        let n = size.x;
        if sketch {
            ctx.draw_arc(Point::new(0.0, -m), n, -PI, 0.0);
            ctx.draw_arc(Point::new(0.0, m), n, 0.0, PI);
            ctx.draw_line(Point::new(-n, -m), Point::new(-n, m));
            ctx.draw_line(Point::new(n, -m), Point::new(n, m));
        } else {
            ctx.draw_circle(Point::new(0.0, -m), n);
            ctx.draw_circle(Point::new(0.0, m), n);
            ctx.draw_rectangle(Point::new(-n, -m), Point::new(n, m));
        }
    } else {
        let m = size.x - size.y;
        let n = size.y;
        if sketch {
            ctx.draw_arc(Point::new(-m, 0.0), n, FRAC_PI_2, 3.0 * FRAC_PI_2);
            ctx.draw_arc(Point::new(m, 0.0), n, -FRAC_PI_2, FRAC_PI_2);
            ctx.draw_line(Point::new(-m, -n), Point::new(m, -n));
            ctx.draw_line(Point::new(-m, n), Point::new(m, n));
        } else {
            ctx.draw_circle(Point::new(-m, 0.0), n);
            ctx.draw_circle(Point::new(m, 0.0), n);
            ctx.draw_rectangle(Point::new(-m, -n), Point::new(m, n));
        }
    }
}

impl ItemPainter<BoardItem> for Painter {
    fn draw<C>(&mut self, ctx: &mut C, item: &BoardItem, layer: Layer) -> Result<bool, GalError>
    where
        C: DrawContext + ?Sized,
    {
        Painter::draw(self, ctx, item, layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_upright() {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-12;
        assert!(close(normalize_upright(0.0), 0.0));
        assert!(close(normalize_upright(FRAC_PI_2), FRAC_PI_2));
        assert!(close(normalize_upright(-FRAC_PI_2), FRAC_PI_2));
        assert!(close(normalize_upright(PI), 0.0));
        assert!(close(normalize_upright(3.0 * PI / 4.0), -PI / 4.0));
    }
}
