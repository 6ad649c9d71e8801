//! Stroke font text drawing and metrics
//!
//! Text is drawn as polylines through any [`DrawContext`], so it takes part
//! in the current transform, paint state and group recording like every
//! other primitive.
//!
//! A single `~` toggles an overbar over the following glyphs; `~~` draws a
//! literal tilde.

use std::sync::Arc;

use gal_core::{DrawContext, GalError, Point, Vec2};

use crate::attributes::{HorizontalJustify, TextAttributes, VerticalJustify};
use crate::glyph::GlyphTable;

/// Line pitch relative to glyph height
pub const INTERLINE_PITCH_RATIO: f64 = 1.5;

/// Overbar height above the baseline relative to glyph height
pub const OVERBAR_POSITION_FACTOR: f64 = 1.22;

/// Line width multiplier for bold text
pub const BOLD_FACTOR: f64 = 1.3;

/// Horizontal shear of italic text per unit of height
pub const ITALIC_TILT: f64 = 1.0 / 8.0;

const OVERBAR_MARKER: char = '~';

/// Size of a single line of text as computed by
/// [`StrokeFont::compute_string_boundary_limits`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringExtents {
    /// Total width including line thickness, and the glyph height
    pub size: Vec2,
    /// Highest stroke point, as a (negative) offset below the baseline
    pub top: f64,
    /// Lowest stroke point (descenders), as an offset below the baseline
    pub bottom: f64,
}

/// Characters of `text` that produce a glyph, with the overbar state each one
/// is drawn with
fn glyph_runs(text: &str) -> impl Iterator<Item = (char, bool)> + '_ {
    let mut chars = text.chars();
    let mut overbar = false;

    std::iter::from_fn(move || {
        let mut ch = chars.next()?;
        if ch == OVERBAR_MARKER {
            ch = chars.next()?;
            if ch != OVERBAR_MARKER {
                overbar = !overbar;
            }
        }
        Some((ch, overbar))
    })
}

pub struct StrokeFont {
    glyphs: Arc<GlyphTable>,
    attributes: TextAttributes,
}

impl Default for StrokeFont {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeFont {
    /// Font backed by the embedded glyph table
    pub fn new() -> Self {
        Self::with_table(GlyphTable::builtin())
    }

    pub fn with_table(glyphs: Arc<GlyphTable>) -> Self {
        Self {
            glyphs,
            attributes: TextAttributes::default(),
        }
    }

    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    pub fn attributes(&self) -> &TextAttributes {
        &self.attributes
    }

    /// Takes the text attributes of an item before drawing it
    pub fn load_attributes(&mut self, attributes: &TextAttributes) {
        self.attributes = *attributes;
    }

    pub fn set_glyph_size(&mut self, size: Vec2) {
        self.attributes.glyph_size = size;
    }

    /// Distance between two consecutive baselines
    pub fn interline(&self, line_width: f64) -> f64 {
        (self.attributes.glyph_size.y * INTERLINE_PITCH_RATIO + line_width).round()
    }

    /// Height of the overbar above the baseline
    pub fn overbar_position(&self, line_width: f64) -> f64 {
        self.attributes.glyph_size.y * OVERBAR_POSITION_FACTOR + line_width
    }

    /// Width and vertical limits of a single line of text, without drawing it.
    ///
    /// Overbar markers take no space; `~~` counts as one tilde.
    pub fn compute_string_boundary_limits(
        &self,
        text: &str,
        glyph_size: Vec2,
        thickness: f64,
    ) -> StringExtents {
        let mut advance = 0.0;
        let mut y_min: f64 = 0.0;
        let mut y_max: f64 = 0.0;

        for (ch, _) in glyph_runs(text) {
            let Some(glyph) = self.glyphs.glyph(ch) else {
                continue;
            };
            let bbox = glyph.bounding_box();
            advance += glyph.advance();
            y_min = y_min.min(bbox.y()).min(bbox.end().y);
            y_max = y_max.max(bbox.y()).max(bbox.end().y);
        }

        let mut width = advance * glyph_size.x + thickness;
        if self.attributes.italic {
            width += glyph_size.y * ITALIC_TILT;
        }

        StringExtents {
            size: Vec2::new(width, glyph_size.y),
            top: y_min * glyph_size.y,
            bottom: y_max * glyph_size.y,
        }
    }

    /// Width of a single line drawn with the current attributes
    pub fn compute_text_line_size(&self, text: &str, line_width: f64) -> Vec2 {
        self.compute_string_boundary_limits(text, self.attributes.glyph_size, line_width)
            .size
    }

    /// Draws `text` anchored at `position`, rotated by `angle` (radians,
    /// counter-clockwise on screen).
    ///
    /// Lines are separated by `'\n'`. Stroking is enabled and fill disabled
    /// for the duration of the call; the caller's paint state and transform
    /// are restored afterwards.
    pub fn draw<C>(
        &self,
        ctx: &mut C,
        text: &str,
        position: Point,
        angle: f64,
    ) -> Result<(), GalError>
    where
        C: DrawContext + ?Sized,
    {
        if text.is_empty() {
            return Ok(());
        }

        let saved_paint = ctx.paint().clone();
        let line_width = ctx.line_width();
        let glyph_height = self.attributes.glyph_size.y;

        ctx.save();
        ctx.translate(position);
        ctx.rotate(-angle);

        match self.attributes.vertical {
            VerticalJustify::Top => ctx.translate(Vec2::new(0.0, glyph_height)),
            VerticalJustify::Center => ctx.translate(Vec2::new(0.0, glyph_height / 2.0)),
            VerticalJustify::Bottom => {}
        }

        let lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let pitch = self.interline(line_width);

        if lines.len() > 1 {
            let block = (lines.len() - 1) as f64 * pitch;
            match self.attributes.vertical {
                VerticalJustify::Top => {}
                VerticalJustify::Center => ctx.translate(Vec2::new(0.0, -block / 2.0)),
                VerticalJustify::Bottom => ctx.translate(Vec2::new(0.0, -block)),
            }
        }

        ctx.set_stroke_enabled(true);
        ctx.set_fill_enabled(false);
        if self.attributes.bold {
            ctx.set_line_width(line_width * BOLD_FACTOR);
        }

        let mut result = Ok(());
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                ctx.translate(Vec2::new(0.0, pitch));
            }
            if let Err(err) = self.draw_single_line(ctx, line) {
                result = Err(err);
                break;
            }
        }

        *ctx.paint_mut() = saved_paint;
        result.and(ctx.restore())
    }

    /// Draws one line at the current origin (baseline, left edge before
    /// justification) and returns the horizontal extent it consumed.
    pub fn draw_single_line<C>(&self, ctx: &mut C, text: &str) -> Result<f64, GalError>
    where
        C: DrawContext + ?Sized,
    {
        let attrs = &self.attributes;
        let line_width = ctx.line_width();
        let mut glyph_size = attrs.glyph_size;

        let overbar_y = -self.overbar_position(line_width);
        let mut overbar_indent = if attrs.italic {
            -overbar_y * ITALIC_TILT
        } else {
            0.0
        };
        if attrs.mirrored {
            overbar_indent = -overbar_indent;
        }

        let width = self.compute_text_line_size(text, line_width).x;

        ctx.save();
        // Strokes extend half a line width past their points, keep them
        // inside 0..width
        ctx.translate(Vec2::new(line_width / 2.0, 0.0));

        match (attrs.horizontal, attrs.mirrored) {
            (HorizontalJustify::Center, _) => ctx.translate(Vec2::new(-width / 2.0, 0.0)),
            (HorizontalJustify::Right, false) | (HorizontalJustify::Left, true) => {
                ctx.translate(Vec2::new(-width, 0.0))
            }
            _ => {}
        }

        let start = if attrs.mirrored {
            glyph_size.x = -glyph_size.x;
            width - line_width
        } else {
            0.0
        };
        let mut x_offset = start;
        let mut in_overbar_run = false;
        let tilt = if attrs.mirrored { ITALIC_TILT } else { -ITALIC_TILT };

        for (ch, overbar) in glyph_runs(text) {
            let Some(glyph) = self.glyphs.glyph(ch) else {
                continue;
            };
            let advance = glyph_size.x * glyph.advance();

            if overbar {
                let mut bar_start = x_offset;
                if !in_overbar_run {
                    bar_start += overbar_indent;
                    in_overbar_run = true;
                }
                ctx.draw_line(
                    Point::new(bar_start, overbar_y),
                    Point::new(x_offset + advance, overbar_y),
                );
            } else {
                in_overbar_run = false;
            }

            for stroke in glyph.strokes() {
                let points: Vec<Point> = stroke
                    .iter()
                    .map(|p| {
                        let mut pos =
                            Point::new(p.x * glyph_size.x + x_offset, p.y * glyph_size.y);
                        if attrs.italic {
                            pos.x += pos.y * tilt;
                        }
                        pos
                    })
                    .collect();
                ctx.draw_polyline(&points);
            }

            x_offset += advance;
        }

        ctx.restore()?;

        let mut consumed = (x_offset - start).abs() + line_width;
        if attrs.italic {
            consumed += attrs.glyph_size.y * ITALIC_TILT;
        }
        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gal_core::{RecordedShape, RecordingContext};

    fn font(attributes: TextAttributes) -> StrokeFont {
        let mut font = StrokeFont::new();
        font.load_attributes(&attributes);
        font
    }

    fn ctx(line_width: f64) -> RecordingContext {
        let mut ctx = RecordingContext::new();
        ctx.set_line_width(line_width);
        ctx
    }

    #[test]
    fn test_glyph_runs() {
        let runs: Vec<_> = glyph_runs("A~B~C").collect();
        assert_eq!(runs, vec![('A', false), ('B', true), ('C', false)]);

        let runs: Vec<_> = glyph_runs("A~~B").collect();
        assert_eq!(runs, vec![('A', false), ('~', false), ('B', false)]);

        // a trailing marker toggles nothing and draws nothing
        let runs: Vec<_> = glyph_runs("A~").collect();
        assert_eq!(runs, vec![('A', false)]);
    }

    #[test]
    fn test_metrics_match_consumed_width() {
        let attrs = TextAttributes::default().with_glyph_size(Vec2::new(50.0, 60.0));
        for text in ["ABC", "A~B~C", "~overbar~ text", "A~~B", "x~"] {
            for italic in [false, true] {
                for mirrored in [false, true] {
                    let font = font(attrs.with_italic(italic).with_mirrored(mirrored));
                    let mut ctx = ctx(4.0);
                    let consumed = font.draw_single_line(&mut ctx, text).unwrap();
                    let measured = font.compute_text_line_size(text, 4.0).x;
                    assert!(
                        (consumed - measured).abs() < 1e-9,
                        "{text:?} italic={italic} mirrored={mirrored}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_escaped_marker_is_a_glyph() {
        let font = font(TextAttributes::default());
        let glyphs = font.glyphs();
        let expected = glyphs.glyph('A').unwrap().advance()
            + glyphs.glyph('~').unwrap().advance()
            + glyphs.glyph('B').unwrap().advance();

        let width = font.compute_string_boundary_limits("A~~B", Vec2::splat(1.0), 0.0);
        assert!((width.size.x - expected).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_limits() {
        let font = font(TextAttributes::default());
        let caps = font.compute_string_boundary_limits("H", Vec2::splat(21.0), 0.0);
        assert!((caps.top + 21.0).abs() < 1e-9);
        assert!(caps.bottom.abs() < 1e-9);

        let descender = font.compute_string_boundary_limits("Hg", Vec2::splat(21.0), 0.0);
        assert!((descender.bottom - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_bold_restores_paint() {
        let font = font(TextAttributes::default().with_bold(true));
        let mut ctx = ctx(10.0);
        ctx.set_fill_enabled(true);
        font.draw(&mut ctx, "I", Point::ZERO, 0.0).unwrap();

        let drawn = &ctx.commands()[0];
        assert!((drawn.paint.line_width - 13.0).abs() < 1e-12);
        assert!(!drawn.paint.fill_enabled);
        assert_eq!(ctx.line_width(), 10.0);
        assert!(ctx.paint().fill_enabled);
        assert_eq!(ctx.transform_depth(), 0);
    }

    #[test]
    fn test_overbar_run_is_continuous() {
        let attrs = TextAttributes::default()
            .with_glyph_size(Vec2::splat(21.0))
            .with_italic(true);
        let font = font(attrs);
        let mut ctx = ctx(2.0);
        font.draw_single_line(&mut ctx, "~AB").unwrap();

        let bars: Vec<(Point, Point)> = ctx
            .commands()
            .iter()
            .filter_map(|cmd| match cmd.shape {
                RecordedShape::Line { start, end } => Some((start, end)),
                _ => None,
            })
            .collect();

        assert_eq!(bars.len(), 2);
        // only the first bar of the run is indented
        assert!(bars[0].0.x > 0.0);
        assert_eq!(bars[1].0.x, bars[0].1.x);
    }
}
