//! GAL Core
//!
//! Foundational types for the graphics abstraction layer:
//!
//! - **Geometry**: double precision points/vectors, boxes and 3x3 affine matrices
//! - **Paint state**: fill/stroke flags, colors, line width, caps, joins, layer depth
//! - **Transforms**: a save/restore matrix stack plus the world-to-screen view
//! - **Drawing API**: the [`DrawContext`] trait implemented by every backend
//!
//! # Example
//!
//! ```rust
//! use gal_core::{DrawContext, Point, RecordingContext};
//!
//! let mut ctx = RecordingContext::new();
//! ctx.set_stroke_enabled(true);
//! ctx.set_line_width(2.0);
//!
//! ctx.save();
//! ctx.translate(Point::new(10.0, 0.0));
//! ctx.draw_line(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
//! ctx.restore().unwrap();
//!
//! assert_eq!(ctx.commands().len(), 1);
//! ```

pub mod color;
pub mod context;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod paint;
pub mod recording;
pub mod transform;

pub use color::Color;
pub use context::{DrawContext, GroupContext, GroupId};
pub use error::GalError;
pub use geometry::{Box2D, Point, Vec2};
pub use matrix::Matrix3x3;
pub use paint::{FillRule, LineCap, LineJoin, PaintState};
pub use recording::{DrawCommand, RecordedShape, RecordingContext};
pub use transform::{TransformStack, WorldView};
