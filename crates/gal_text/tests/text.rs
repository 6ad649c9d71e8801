//! Text drawing observed through a recording context

use gal_core::{DrawContext, Point, RecordedShape, RecordingContext, Vec2};
use gal_text::{HorizontalJustify, StrokeFont, TextAttributes, VerticalJustify};

const LINE_WIDTH: f64 = 6.0;

fn font(attributes: TextAttributes) -> StrokeFont {
    let mut font = StrokeFont::new();
    font.load_attributes(&attributes);
    font
}

fn left_bottom() -> TextAttributes {
    TextAttributes::default()
        .with_glyph_size(Vec2::new(80.0, 100.0))
        .with_justify(HorizontalJustify::Left, VerticalJustify::Bottom)
}

fn record(font: &StrokeFont, text: &str, position: Point) -> RecordingContext {
    let mut ctx = RecordingContext::new();
    ctx.set_line_width(LINE_WIDTH);
    font.draw(&mut ctx, text, position, 0.0).unwrap();
    assert_eq!(ctx.transform_depth(), 0);
    ctx
}

/// Screen-space horizontal extent of all overbar segments, stroke width included
fn overbar_extent(ctx: &RecordingContext) -> (f64, f64) {
    ctx.commands()
        .iter()
        .filter(|cmd| matches!(cmd.shape, RecordedShape::Line { .. }))
        .fold((f64::MAX, f64::MIN), |(lo, hi), cmd| {
            let half = cmd.screen_line_width() / 2.0;
            cmd.screen_points()
                .iter()
                .fold((lo, hi), |(lo, hi), p| (lo.min(p.x - half), hi.max(p.x + half)))
        })
}

fn polylines(ctx: &RecordingContext) -> Vec<Vec<Point>> {
    ctx.commands()
        .iter()
        .filter(|cmd| matches!(cmd.shape, RecordedShape::Polyline { .. }))
        .map(|cmd| cmd.screen_points())
        .collect()
}

fn line_count(ctx: &RecordingContext) -> usize {
    ctx.commands()
        .iter()
        .filter(|cmd| matches!(cmd.shape, RecordedShape::Line { .. }))
        .count()
}

#[test]
fn overbarred_width_matches_metrics() {
    let font = font(left_bottom());
    let position = Point::new(100.0, 50.0);
    let ctx = record(&font, "~ABC", position);

    let width = font.compute_text_line_size("ABC", LINE_WIDTH).x;
    let (lo, hi) = overbar_extent(&ctx);
    assert!((lo - position.x).abs() < 1e-9);
    assert!((hi - position.x - width).abs() < 1e-9);

    // the markers take no space
    assert_eq!(font.compute_text_line_size("~ABC", LINE_WIDTH).x, width);
}

#[test]
fn single_marker_toggles_overbar() {
    let font = font(left_bottom());

    // one bar segment, over B only
    let ctx = record(&font, "A~B~C", Point::ZERO);
    assert_eq!(line_count(&ctx), 1);

    let plain = record(&font, "ABC", Point::ZERO);
    assert_eq!(polylines(&ctx), polylines(&plain));
}

#[test]
fn doubled_marker_is_literal() {
    let font = font(left_bottom());
    let escaped = record(&font, "A~~B", Point::ZERO);
    assert_eq!(line_count(&escaped), 0);

    let tilde = font.glyphs().glyph('~').unwrap().strokes().len();
    let a = font.glyphs().glyph('A').unwrap().strokes().len();
    let b = font.glyphs().glyph('B').unwrap().strokes().len();
    assert_eq!(polylines(&escaped).len(), a + tilde + b);
}

#[test]
fn mirrored_text_keeps_width() {
    let plain = font(left_bottom());
    let mirrored = font(left_bottom().with_mirrored(true));
    let position = Point::new(500.0, 0.0);

    let (lo, hi) = overbar_extent(&record(&plain, "~AB", position));
    let (mlo, mhi) = overbar_extent(&record(&mirrored, "~AB", position));

    assert!(((hi - lo) - (mhi - mlo)).abs() < 1e-9);
    // left justified mirrored text ends at the anchor
    assert!((mhi - position.x).abs() < 1e-9);
}

#[test]
fn mirrored_glyph_is_flipped() {
    let plain = polylines(&record(&font(left_bottom()), "L", Point::ZERO));
    let mirrored = polylines(&record(
        &font(left_bottom().with_mirrored(true)),
        "L",
        Point::ZERO,
    ));

    assert_eq!(plain.len(), mirrored.len());
    for (a, b) in plain.iter().flatten().zip(mirrored.iter().flatten()) {
        assert!((a.x + b.x).abs() < 1e-9);
        assert!((a.y - b.y).abs() < 1e-9);
    }
}

#[test]
fn unknown_characters_draw_fallback() {
    let font = font(left_bottom());
    let question = polylines(&record(&font, "?", Point::ZERO));
    assert!(!question.is_empty());

    for text in ["\u{263a}", "\t", "\u{00e9}"] {
        assert_eq!(polylines(&record(&font, text, Point::ZERO)), question, "{text:?}");
    }
}

#[test]
fn multiline_uses_interline_pitch() {
    let font = font(left_bottom().with_justify(HorizontalJustify::Left, VerticalJustify::Top));
    let single = polylines(&record(&font, "I", Point::ZERO));
    let double = polylines(&record(&font, "I\nI", Point::ZERO));
    assert_eq!(double.len(), 2 * single.len());

    // round(100 * 1.5 + 6)
    let pitch = font.interline(LINE_WIDTH);
    assert_eq!(pitch, 156.0);

    let first = &double[0];
    let second = &double[single.len()];
    for (a, b) in first.iter().zip(second) {
        assert!((b.y - a.y - pitch).abs() < 1e-9);
        assert!((b.x - a.x).abs() < 1e-9);
    }
}

#[test]
fn vertical_justification_offsets_block() {
    let attrs = left_bottom();
    let lowest_y = |vertical: VerticalJustify, text: &str| {
        let font = font(attrs.with_justify(HorizontalJustify::Left, vertical));
        polylines(&record(&font, text, Point::ZERO))
            .iter()
            .flatten()
            .fold(f64::MIN, |acc, p| acc.max(p.y))
    };

    // "I" sits on the baseline, which bottom justification puts at the anchor
    assert!(lowest_y(VerticalJustify::Bottom, "I").abs() < 1e-9);
    assert!((lowest_y(VerticalJustify::Top, "I") - 100.0).abs() < 1e-9);
    assert!((lowest_y(VerticalJustify::Center, "I") - 50.0).abs() < 1e-9);

    // the last baseline of a bottom justified block stays on the anchor
    assert!(lowest_y(VerticalJustify::Bottom, "I\nI\nI").abs() < 1e-9);
}

#[test]
fn rotated_text() {
    let font = font(left_bottom());
    let mut ctx = RecordingContext::new();
    ctx.set_line_width(LINE_WIDTH);
    font.draw(&mut ctx, "I", Point::ZERO, std::f64::consts::FRAC_PI_2)
        .unwrap();

    let stroke = &polylines(&ctx)[0];
    let (a, b) = (stroke[0], stroke[stroke.len() - 1]);
    // the upright stem now runs horizontally
    assert!((a.y - b.y).abs() < 1e-9);
    assert!(((a.x - b.x).abs() - 100.0).abs() < 1e-9);
}
