//! View layer on top of the GAL
//!
//! - [`View`]: items drawn layer by layer, each (item, layer) pair cached as
//!   a group and replayed until the item changes
//! - [`ViewItem`]: per-item visibility, cached groups and pending updates
//! - [`Painter`]: draws the sample [`BoardItem`] kinds with [`RenderSettings`]
//!
//! # Example
//!
//! ```rust
//! use gal_core::{Point, RecordingContext};
//! use gal_view::{BoardItem, Painter, Track, View};
//!
//! let mut view = View::new();
//! view.add(BoardItem::Track(Track {
//!     start: Point::new(0.0, 0.0),
//!     end: Point::new(10.0, 0.0),
//!     width: 0.25,
//!     layer: 0,
//!     net: 1,
//! }));
//!
//! let mut ctx = RecordingContext::new();
//! let stats = view.redraw(&mut ctx, &mut Painter::default(), None).unwrap();
//! assert_eq!(stats.cached, 1);
//! ```

pub mod board;
pub mod item;
pub mod layer;
pub mod painter;
pub mod settings;
pub mod view;

pub use board::{
    BoardItem, Dimension, Pad, PadShape, Segment, SegmentShape, Target, TargetShape, Text, Track,
    Via, Zone,
};
pub use item::{UpdateFlags, ViewItem};
pub use layer::{ItemLayer, Layer, BOARD_LAYER_COUNT, LAYER_SLOTS};
pub use painter::Painter;
pub use settings::{
    ColorVariants, DisplayOptions, ItemColors, RenderSettings, SettingsError, SketchMode,
};
pub use view::{ItemId, ItemPainter, RedrawStats, View, Viewable};
