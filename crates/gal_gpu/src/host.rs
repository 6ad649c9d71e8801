//! Window surface ownership
//!
//! `SurfaceHost` holds the native window, its wgpu surface, the renderer and
//! the engine. Windowing code forwards resize, paint and cursor events to it;
//! the engine itself never sees the window.

use std::sync::Arc;

use gal_core::{GalError, Point};

use crate::engine::{EngineConfig, GalEngine};
use crate::renderer::{GpuRenderer, RendererConfig, RendererError};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Renderer(#[from] RendererError),

    #[error(transparent)]
    Engine(#[from] GalError),
}

pub struct SurfaceHost<W> {
    window: Arc<W>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: GpuRenderer,
    engine: GalEngine,
}

impl<W> SurfaceHost<W>
where
    W: raw_window_handle::HasWindowHandle
        + raw_window_handle::HasDisplayHandle
        + Send
        + Sync
        + 'static,
{
    /// Creates the surface, renderer and engine for a window of the given
    /// physical size
    pub fn new(
        window: Arc<W>,
        width: u32,
        height: u32,
        engine_config: EngineConfig,
        renderer_config: RendererConfig,
    ) -> Result<Self, HostError> {
        let (mut renderer, surface, caps) =
            pollster::block_on(GpuRenderer::with_surface(window.clone(), renderer_config))?;

        // Frames are copied from the main target into the surface texture
        if !caps.usages.contains(wgpu::TextureUsages::COPY_DST) {
            return Err(RendererError::SurfaceConfig(
                "surface textures cannot be copy destinations".into(),
            )
            .into());
        }

        let (width, height) = (width.max(1), height.max(1));
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format: renderer.texture_format(),
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(renderer.device(), &surface_config);
        renderer.resize(width, height);

        let mut engine = GalEngine::new(engine_config);
        engine.resize_screen(width as i64, height as i64)?;

        Ok(Self {
            window,
            surface,
            surface_config,
            renderer,
            engine,
        })
    }

    pub fn window(&self) -> &Arc<W> {
        &self.window
    }

    pub fn engine(&self) -> &GalEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GalEngine {
        &mut self.engine
    }

    pub fn renderer(&self) -> &GpuRenderer {
        &self.renderer
    }

    /// Window resize; a zero size (minimized window) is ignored
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), HostError> {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring resize to an empty window");
            return Ok(());
        }

        self.engine.resize_screen(width as i64, height as i64)?;
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface
            .configure(self.renderer.device(), &self.surface_config);
        self.renderer.resize(width, height);
        Ok(())
    }

    /// Runs `draw` inside a frame and presents the result
    pub fn paint(&mut self, draw: impl FnOnce(&mut GalEngine)) -> Result<(), HostError> {
        self.engine.begin_drawing();
        draw(&mut self.engine);
        self.engine.end_drawing();

        let (frame, groups) = self.engine.frame_and_groups();
        match self.renderer.present(&self.surface, frame, groups) {
            Ok(()) => Ok(()),
            Err(RendererError::SurfaceTexture(
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
            )) => {
                tracing::debug!("surface lost, reconfiguring");
                self.surface
                    .configure(self.renderer.device(), &self.surface_config);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Cursor position in physical pixels mapped to world coordinates
    pub fn cursor_to_world(&self, x: f64, y: f64) -> Result<Point, GalError> {
        self.engine.compute_cursor_to_world(Point::new(x, y))
    }
}
