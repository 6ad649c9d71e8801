//! Stroke font text rendering
//!
//! This crate provides:
//! - The embedded single-stroke glyph table and its parser
//! - Text attributes (size, justification, bold/italic/mirrored)
//! - String metrics computed without drawing
//! - Text drawing onto any [`gal_core::DrawContext`]

pub mod attributes;
pub mod font_data;
pub mod glyph;
pub mod stroke_font;

pub use attributes::{HorizontalJustify, TextAttributes, VerticalJustify};
pub use glyph::{Glyph, GlyphTable};
pub use stroke_font::{StringExtents, StrokeFont};

use thiserror::Error;

/// Glyph table loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FontError {
    #[error("glyph {glyph} has no advance bounds")]
    MissingBounds { glyph: usize },

    #[error("glyph {glyph} has an unpaired coordinate")]
    OddCoordinateCount { glyph: usize },

    #[error("font table is empty")]
    EmptyTable,
}

pub type Result<T> = std::result::Result<T, FontError>;
