//! Glyph table parsing
//!
//! A glyph is a set of polylines ("strokes") in font units where the cap
//! height is 1.0, x grows to the right from the glyph's left advance bound and
//! y grows downwards from the baseline.

use std::sync::{Arc, OnceLock};

use gal_core::{Box2D, Point};

use crate::font_data::BUILTIN_FONT;
use crate::{FontError, Result};

/// Font units per raw coordinate step
pub const STROKE_FONT_SCALE: f64 = 1.0 / 21.0;

/// Shift applied to raw y values so the baseline lands on zero
const FONT_OFFSET: i32 = -10;

const COORD_ORIGIN: u8 = b'R';

const PEN_UP: (u8, u8) = (b' ', b'R');

/// First character of the table; glyph `n` encodes `FIRST_CHAR + n`
pub const FIRST_CHAR: char = ' ';

/// Drawn in place of characters the table does not cover
pub const FALLBACK_CHAR: char = '?';

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Glyph {
    strokes: Vec<Vec<Point>>,
    bbox: Box2D,
}

impl Glyph {
    pub fn strokes(&self) -> &[Vec<Point>] {
        &self.strokes
    }

    /// Covers the advance width horizontally and every stroke point
    /// (plus the baseline) vertically
    pub fn bounding_box(&self) -> Box2D {
        self.bbox
    }

    /// Horizontal distance to the next glyph's origin
    pub fn advance(&self) -> f64 {
        self.bbox.end().x
    }
}

fn raw(c: u8) -> f64 {
    (c as i32 - COORD_ORIGIN as i32) as f64
}

fn parse_glyph(index: usize, encoded: &[u8]) -> Result<Glyph> {
    if encoded.len() < 2 {
        return Err(FontError::MissingBounds { glyph: index });
    }
    if encoded.len() % 2 != 0 {
        return Err(FontError::OddCoordinateCount { glyph: index });
    }

    let start_x = raw(encoded[0]) * STROKE_FONT_SCALE;
    let end_x = raw(encoded[1]) * STROKE_FONT_SCALE;
    let width = end_x - start_x;

    let mut strokes = Vec::new();
    let mut stroke: Vec<Point> = Vec::new();
    let mut extent = Box2D::from_corners(Point::ZERO, Point::new(width, 0.0));

    for pair in encoded[2..].chunks_exact(2) {
        if (pair[0], pair[1]) == PEN_UP {
            if !stroke.is_empty() {
                strokes.push(std::mem::take(&mut stroke));
            }
            continue;
        }

        let x = raw(pair[0]) * STROKE_FONT_SCALE - start_x;
        let y = (raw(pair[1]) + FONT_OFFSET as f64) * STROKE_FONT_SCALE;
        stroke.push(Point::new(x, y));
        extent = extent.merge_point(Point::new(0.0, y));
    }

    if !stroke.is_empty() {
        strokes.push(stroke);
    }

    Ok(Glyph {
        strokes,
        bbox: extent.normalize(),
    })
}

/// Parsed glyphs indexed from [`FIRST_CHAR`]
#[derive(Clone, Debug, Default)]
pub struct GlyphTable {
    glyphs: Vec<Glyph>,
}

impl GlyphTable {
    /// Parses one encoded string per glyph.
    ///
    /// Each string starts with the left and right advance bounds, followed by
    /// `(x, y)` pairs offset by `'R'`; the pair `" R"` lifts the pen.
    pub fn parse<S: AsRef<str>>(table: &[S]) -> Result<Self> {
        if table.is_empty() {
            return Err(FontError::EmptyTable);
        }

        let glyphs = table
            .iter()
            .enumerate()
            .map(|(index, encoded)| parse_glyph(index, encoded.as_ref().as_bytes()))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(glyphs = glyphs.len(), "stroke font loaded");
        Ok(Self { glyphs })
    }

    /// The embedded font, parsed once per process
    pub fn builtin() -> Arc<GlyphTable> {
        static BUILTIN: OnceLock<Arc<GlyphTable>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| match Self::parse(BUILTIN_FONT) {
                Ok(table) => Arc::new(table),
                Err(err) => {
                    tracing::error!(%err, "embedded stroke font rejected");
                    Arc::new(GlyphTable::default())
                }
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Glyph> {
        self.glyphs.get(index)
    }

    /// Table index for `ch`, falling back to [`FALLBACK_CHAR`] when out of range
    pub fn index_of(&self, ch: char) -> usize {
        let fallback = FALLBACK_CHAR as usize - FIRST_CHAR as usize;
        (ch as usize)
            .checked_sub(FIRST_CHAR as usize)
            .filter(|&index| index < self.glyphs.len())
            .unwrap_or(fallback)
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.get(self.index_of(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_printable_ascii() {
        let table = GlyphTable::builtin();
        assert_eq!(table.len(), ('~' as usize) - (' ' as usize) + 1);
        assert!(table.glyph(' ').unwrap().strokes().is_empty());
        assert!(table.glyph('A').unwrap().advance() > 0.0);
    }

    #[test]
    fn test_parse_coordinates() {
        // Bounds -8..8, one stroke from (-6, baseline) to (6, cap height)
        let table = GlyphTable::parse(&["JZL\\XG"]).unwrap();
        let glyph = table.get(0).unwrap();

        assert!((glyph.advance() - 16.0 / 21.0).abs() < 1e-12);
        let stroke = &glyph.strokes()[0];
        assert!(stroke[0].distance(Point::new(2.0 / 21.0, 0.0)) < 1e-12);
        assert!(stroke[1].distance(Point::new(14.0 / 21.0, -1.0)) < 1e-12);

        let bbox = glyph.bounding_box();
        assert!((bbox.y() + 1.0).abs() < 1e-12);
        assert!(bbox.end().y.abs() < 1e-12);
    }

    #[test]
    fn test_pen_up_splits_strokes() {
        let table = GlyphTable::parse(&["JZL\\XG RLGX\\"]).unwrap();
        assert_eq!(table.get(0).unwrap().strokes().len(), 2);
    }

    #[test]
    fn test_malformed_tables() {
        assert_eq!(
            GlyphTable::parse::<&str>(&[]).unwrap_err(),
            FontError::EmptyTable
        );
        assert_eq!(
            GlyphTable::parse(&["JZ", "J"]).unwrap_err(),
            FontError::MissingBounds { glyph: 1 }
        );
        assert_eq!(
            GlyphTable::parse(&["JZL"]).unwrap_err(),
            FontError::OddCoordinateCount { glyph: 0 }
        );
    }

    #[test]
    fn test_out_of_range_falls_back() {
        let table = GlyphTable::builtin();
        let question = table.index_of('?');
        assert_eq!(table.index_of('\t'), question);
        assert_eq!(table.index_of('\u{00e9}'), question);
        assert_eq!(table.index_of('A'), 'A' as usize - ' ' as usize);
    }
}
