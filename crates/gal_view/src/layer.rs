//! Drawing layers
//!
//! Board layers carry the physical stack (copper, silkscreen, ...); item
//! layers hold per-kind overlays such as via holes or pad labels.

use serde::{Deserialize, Serialize};

pub const BOARD_LAYER_COUNT: u8 = 32;

/// Number of distinct [`Layer::slot`] values
pub const LAYER_SLOTS: usize = 256 + ItemLayer::ALL.len();

/// Overlay layers, in drawing order (later is in front)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLayer {
    Vias,
    ViaHoles,
    Pads,
    PadHoles,
    Netnames,
}

impl ItemLayer {
    pub const ALL: [ItemLayer; 5] = [
        ItemLayer::Vias,
        ItemLayer::ViaHoles,
        ItemLayer::Pads,
        ItemLayer::PadHoles,
        ItemLayer::Netnames,
    ];
}

/// Board layers sort before item layers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Board(u8),
    Item(ItemLayer),
}

impl Layer {
    /// Position in [`Layer`] order, independent of which layers are in use
    pub fn slot(self) -> usize {
        match self {
            Layer::Board(index) => index as usize,
            Layer::Item(kind) => 256 + kind as usize,
        }
    }
}

impl Default for Layer {
    fn default() -> Self {
        Layer::Board(0)
    }
}

impl From<ItemLayer> for Layer {
    fn from(layer: ItemLayer) -> Self {
        Layer::Item(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_follow_layer_order() {
        let mut layers = vec![Layer::Board(0), Layer::Board(31), Layer::Board(255)];
        layers.extend(ItemLayer::ALL.map(Layer::Item));

        for pair in layers.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].slot() < pair[1].slot());
        }
        assert_eq!(Layer::Item(ItemLayer::Netnames).slot(), LAYER_SLOTS - 1);
    }
}
