//! Text attributes

use gal_core::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalJustify {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalJustify {
    Top,
    #[default]
    Center,
    Bottom,
}

/// How a string is laid out relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextAttributes {
    /// Width and cap height of one glyph in world units
    pub glyph_size: Vec2,
    pub horizontal: HorizontalJustify,
    pub vertical: VerticalJustify,
    pub bold: bool,
    pub italic: bool,
    /// Drawn right-to-left with every glyph flipped horizontally
    pub mirrored: bool,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            glyph_size: Vec2::splat(1.0),
            horizontal: HorizontalJustify::default(),
            vertical: VerticalJustify::default(),
            bold: false,
            italic: false,
            mirrored: false,
        }
    }
}

impl TextAttributes {
    pub fn with_glyph_size(mut self, size: Vec2) -> Self {
        self.glyph_size = size;
        self
    }

    pub fn with_justify(
        mut self,
        horizontal: HorizontalJustify,
        vertical: VerticalJustify,
    ) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }
}
