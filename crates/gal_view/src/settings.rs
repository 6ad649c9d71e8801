//! Board render settings
//!
//! Colors are kept per board layer and per item layer, each with derived
//! highlighted, darkened and selected variants. Settings load from TOML;
//! anything omitted keeps its default.

use gal_core::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layer::{ItemLayer, Layer, BOARD_LAYER_COUNT};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid render settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize render settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Item classes that can be drawn as outlines instead of filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchMode {
    pub tracks: bool,
    pub vias: bool,
    pub pads: bool,
}

/// Display toggles as exposed to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub pad_fill: bool,
    pub via_fill: bool,
    pub track_fill: bool,
    pub high_contrast: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            pad_fill: true,
            via_fill: true,
            track_fill: true,
            high_contrast: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemColors {
    pub vias: Color,
    pub via_holes: Color,
    pub pads: Color,
    pub pad_holes: Color,
    pub netnames: Color,
}

impl Default for ItemColors {
    fn default() -> Self {
        Self {
            vias: Color::gray(0.7),
            via_holes: Color::rgb(0.5, 0.4, 0.0),
            pads: Color::gray(0.7),
            pad_holes: Color::rgb(0.0, 0.5, 0.5),
            netnames: Color::gray(0.9),
        }
    }
}

impl ItemColors {
    pub fn get(&self, layer: ItemLayer) -> Color {
        match layer {
            ItemLayer::Vias => self.vias,
            ItemLayer::ViaHoles => self.via_holes,
            ItemLayer::Pads => self.pads,
            ItemLayer::PadHoles => self.pad_holes,
            ItemLayer::Netnames => self.netnames,
        }
    }
}

/// A base color and its derived variants
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorVariants {
    pub normal: Color,
    pub highlighted: Color,
    pub darkened: Color,
    pub selected: Color,
}

#[derive(Debug, Clone, Default)]
struct ColorTables {
    board: Vec<ColorVariants>,
    items: Vec<(ItemLayer, ColorVariants)>,
    high_contrast: Color,
}

fn default_board_colors() -> Vec<Color> {
    const PALETTE: [Color; 8] = [
        Color::rgb(0.0, 0.52, 0.0),
        Color::rgb(0.76, 0.76, 0.0),
        Color::rgb(0.76, 0.0, 0.76),
        Color::rgb(0.0, 0.52, 0.52),
        Color::rgb(0.52, 0.0, 0.0),
        Color::rgb(0.0, 0.0, 0.76),
        Color::rgb(0.52, 0.52, 0.52),
        Color::rgb(0.76, 0.38, 0.0),
    ];

    let mut colors: Vec<Color> = (0..BOARD_LAYER_COUNT as usize)
        .map(|i| PALETTE[i % PALETTE.len()])
        .collect();
    // back and front copper
    colors[0] = Color::rgb(0.0, 0.52, 0.0);
    colors[15] = Color::rgb(0.76, 0.0, 0.0);
    colors
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Indexed by board layer number
    pub board_colors: Vec<Color>,
    pub item_colors: ItemColors,
    pub highlight_factor: f32,
    pub select_factor: f32,
    /// Alpha applied to every layer and item color
    pub layer_opacity: f32,
    /// Gray level used for inactive layers in high contrast mode
    pub high_contrast_factor: f32,
    pub high_contrast: bool,
    pub active_layer: Layer,
    /// Net drawn highlighted; every other net is darkened
    pub highlight_net: Option<i32>,
    pub sketch: SketchMode,
    /// Stroke width of outlines drawn in sketch mode
    pub outline_width: f64,
    /// Upper bound for pad label glyph sizes
    pub max_font_size: f64,

    #[serde(skip)]
    tables: ColorTables,
}

impl Default for RenderSettings {
    fn default() -> Self {
        let mut settings = Self {
            board_colors: default_board_colors(),
            item_colors: ItemColors::default(),
            highlight_factor: 0.5,
            select_factor: 0.5,
            layer_opacity: 0.8,
            high_contrast_factor: 0.2,
            high_contrast: false,
            active_layer: Layer::default(),
            highlight_net: None,
            sketch: SketchMode::default(),
            outline_width: 0.06,
            max_font_size: 1.5,
            tables: ColorTables::default(),
        };
        settings.update();
        settings
    }
}

impl RenderSettings {
    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let mut settings: RenderSettings = toml::from_str(source)?;
        settings.update();
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string(self)?)
    }

    /// Recomputes the derived color variants; call after editing colors or
    /// factors directly
    pub fn update(&mut self) {
        let variants = |base: Color| {
            let normal = base.with_alpha(self.layer_opacity);
            ColorVariants {
                normal,
                highlighted: normal.highlighted(self.highlight_factor),
                darkened: normal.darkened(1.0 - self.highlight_factor),
                selected: normal.highlighted(self.select_factor),
            }
        };

        self.tables = ColorTables {
            board: self.board_colors.iter().map(|&c| variants(c)).collect(),
            items: ItemLayer::ALL
                .iter()
                .map(|&layer| (layer, variants(self.item_colors.get(layer))))
                .collect(),
            high_contrast: Color::gray(self.high_contrast_factor)
                .with_alpha(self.layer_opacity),
        };
    }

    pub fn load_display_options(&mut self, options: &DisplayOptions) {
        self.high_contrast = options.high_contrast;
        self.sketch = SketchMode {
            tracks: !options.track_fill,
            vias: !options.via_fill,
            pads: !options.pad_fill,
        };
    }

    pub fn variants(&self, layer: Layer) -> ColorVariants {
        let found = match layer {
            Layer::Board(index) => self.tables.board.get(index as usize).copied(),
            Layer::Item(item) => self
                .tables
                .items
                .iter()
                .find(|(l, _)| *l == item)
                .map(|&(_, v)| v),
        };

        found.unwrap_or_else(|| {
            tracing::warn!(?layer, "no color configured for layer");
            ColorVariants::default()
        })
    }

    /// Color of something on `layer` belonging to net `net` (0 for none)
    pub fn color(&self, layer: Layer, net: i32) -> Color {
        if self.high_contrast && layer != self.active_layer {
            return self.tables.high_contrast;
        }

        let variants = self.variants(layer);
        match self.highlight_net {
            Some(highlighted) if highlighted == net => variants.highlighted,
            Some(_) => variants.darkened,
            None => variants.normal,
        }
    }

    pub fn selected_color(&self, layer: Layer) -> Color {
        self.variants(layer).selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_applies_to_every_color() {
        let settings = RenderSettings::default();
        for layer in (0..BOARD_LAYER_COUNT).map(Layer::Board) {
            assert_eq!(settings.color(layer, 0).a, 0.8);
        }
        for layer in ItemLayer::ALL.map(Layer::Item) {
            assert_eq!(settings.color(layer, 0).a, 0.8);
        }
    }

    #[test]
    fn test_high_contrast() {
        let mut settings = RenderSettings::default();
        settings.high_contrast = true;
        settings.active_layer = Layer::Board(15);

        let front = settings.color(Layer::Board(15), 0);
        let back = settings.color(Layer::Board(0), 0);
        assert_eq!(front, settings.variants(Layer::Board(15)).normal);
        assert_eq!(back, Color::gray(0.2).with_alpha(0.8));
    }

    #[test]
    fn test_net_highlight() {
        let mut settings = RenderSettings::default();
        settings.highlight_net = Some(7);
        let layer = Layer::Board(0);
        let variants = settings.variants(layer);

        assert_eq!(settings.color(layer, 7), variants.highlighted);
        assert_eq!(settings.color(layer, 3), variants.darkened);
        assert_ne!(variants.highlighted, variants.darkened);
    }

    #[test]
    fn test_display_options() {
        let mut settings = RenderSettings::default();
        settings.load_display_options(&DisplayOptions {
            pad_fill: false,
            ..DisplayOptions::default()
        });
        assert!(settings.sketch.pads);
        assert!(!settings.sketch.vias);
        assert!(!settings.sketch.tracks);
    }

    #[test]
    fn test_toml_overrides() {
        let settings = RenderSettings::from_toml(
            r#"
            layer_opacity = 1.0
            highlight_net = 4
            active_layer = { board = 15 }

            [item_colors.vias]
            r = 1.0
            g = 0.0
            b = 0.0
            a = 1.0

            [sketch]
            tracks = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.active_layer, Layer::Board(15));
        assert!(settings.sketch.tracks);
        assert_eq!(settings.board_colors.len(), BOARD_LAYER_COUNT as usize);
        assert_eq!(
            settings.variants(Layer::Item(ItemLayer::Vias)).normal,
            Color::RED
        );

        let round_trip = RenderSettings::from_toml(&settings.to_toml().unwrap()).unwrap();
        assert_eq!(round_trip.highlight_net, Some(4));
    }

    #[test]
    fn test_missing_layer_is_transparent() {
        let mut settings = RenderSettings::default();
        settings.board_colors.truncate(2);
        settings.update();
        assert_eq!(settings.color(Layer::Board(20), 0), Color::default());
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            RenderSettings::from_toml("layer_opacity = \"opaque\""),
            Err(SettingsError::Parse(_))
        ));
    }
}
