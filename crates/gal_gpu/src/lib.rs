//! GAL GPU Backend
//!
//! Tessellates `DrawContext` calls into depth-sorted triangle meshes, caches
//! groups of them, and renders frames with wgpu.
//!
//! - [`GalEngine`]: the drawing engine (no window, no device)
//! - [`GpuRenderer`]: uploads and draws what the engine produced
//! - [`SurfaceHost`]: ties a native window to both

pub mod depth;
pub mod engine;
pub mod group;
pub mod host;
pub mod mesh;
pub mod polygon;
pub mod renderer;
pub mod shaders;
pub mod surfaces;
pub mod tables;
pub mod tessellator;

pub use engine::{EngineConfig, GalEngine};
pub use group::{DrawCall, FrameBatch, GroupCache};
pub use host::{HostError, SurfaceHost};
pub use mesh::{Mesh, Vertex};
pub use renderer::{GpuRenderer, RendererConfig, RendererError};
pub use surfaces::{FrameSurfaces, OverlayScope, PixelRegion};
pub use tables::UnitTables;
