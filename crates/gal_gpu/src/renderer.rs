//! GPU renderer implementation
//!
//! Uploads the engine's frame batch and cached groups to wgpu buffers and
//! draws them into the main frame surface with one depth-tested pipeline.
//! Group meshes are uploaded once and kept until the engine deletes the
//! group.

use std::sync::Arc;

use gal_core::{Color, GroupId};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::group::{DrawCall, FrameBatch, GroupCache};
use crate::mesh::{Mesh, Vertex};
use crate::shaders::{MeshUniforms, MESH_SHADER};
use crate::surfaces::{FrameSurfaces, DEPTH_FORMAT};

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
}

/// Error type for renderer operations
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("No suitable GPU adapter found")]
    AdapterNotFound,

    #[error("Failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("Surface cannot be configured: {0}")]
    SurfaceConfig(String),

    #[error("Failed to acquire the next surface texture: {0}")]
    SurfaceTexture(#[from] wgpu::SurfaceError),

    /// Geometry does not fit in a single GPU buffer
    #[error("buffer of {requested} bytes exceeds the {limit} byte limit")]
    BufferTooLarge { requested: u64, limit: u64 },
}

/// Configuration for creating a renderer
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// MSAA sample count; anti-aliasing comes from multisampling
    pub sample_count: u32,
    /// Preferred texture format (None = use surface preferred)
    pub texture_format: Option<wgpu::TextureFormat>,
    /// Largest vertex or index buffer the renderer will allocate
    pub max_buffer_bytes: u64,
    /// Color used when a frame has no explicit clear
    pub clear_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            sample_count: 4,
            texture_format: None,
            max_buffer_bytes: 64 * 1024 * 1024,
            clear_color: Color::BLACK,
        }
    }
}

/// Applies `GAL_MSAA_SAMPLES` and `GAL_MAX_BUFFER_MB`, clamped to the device limits
fn apply_renderer_config_overrides(
    mut config: RendererConfig,
    limits: &wgpu::Limits,
) -> RendererConfig {
    if let Some(samples) = env_u32("GAL_MSAA_SAMPLES") {
        if matches!(samples, 1 | 4) {
            config.sample_count = samples;
        } else {
            tracing::warn!(samples, "GAL_MSAA_SAMPLES must be 1 or 4, ignoring");
        }
    }
    if let Some(mib) = env_u64("GAL_MAX_BUFFER_MB") {
        config.max_buffer_bytes = mib.saturating_mul(1024 * 1024);
    }
    config.max_buffer_bytes = config.max_buffer_bytes.min(limits.max_buffer_size);
    config
}

fn log_renderer_config(config: &RendererConfig) {
    tracing::info!(
        "gpu config: sample_count={}, max_buffer={} MiB, texture_format={:?}",
        config.sample_count,
        config.max_buffer_bytes / (1024 * 1024),
        config.texture_format
    );
}

fn check_size(requested: u64, limit: u64) -> Result<(), RendererError> {
    if requested > limit {
        return Err(RendererError::BufferTooLarge { requested, limit });
    }
    Ok(())
}

/// Vertex and index buffers of one mesh
struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(
        device: &wgpu::Device,
        label: &str,
        mesh: &Mesh,
        limit: u64,
    ) -> Result<Self, RendererError> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&mesh.indices);
        check_size(vertex_bytes.len() as u64, limit)?;
        check_size(index_bytes.len() as u64, limit)?;

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: index_bytes,
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
        })
    }
}

/// Growable buffers for the immediate part of a frame
struct FrameBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    vertex_capacity: u64,
    index_capacity: u64,
}

impl FrameBuffers {
    const INITIAL_BYTES: u64 = 64 * 1024;

    fn new(device: &wgpu::Device) -> Self {
        Self {
            vertices: Self::create(
                device,
                "Frame Vertices",
                Self::INITIAL_BYTES,
                wgpu::BufferUsages::VERTEX,
            ),
            indices: Self::create(
                device,
                "Frame Indices",
                Self::INITIAL_BYTES,
                wgpu::BufferUsages::INDEX,
            ),
            vertex_capacity: Self::INITIAL_BYTES,
            index_capacity: Self::INITIAL_BYTES,
        }
    }

    fn create(
        device: &wgpu::Device,
        label: &str,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &Mesh,
        limit: u64,
    ) -> Result<(), RendererError> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&mesh.indices);
        check_size(vertex_bytes.len() as u64, limit)?;
        check_size(index_bytes.len() as u64, limit)?;

        if vertex_bytes.len() as u64 > self.vertex_capacity {
            self.vertex_capacity = (vertex_bytes.len() as u64).next_power_of_two().min(limit);
            self.vertices = Self::create(
                device,
                "Frame Vertices",
                self.vertex_capacity,
                wgpu::BufferUsages::VERTEX,
            );
            tracing::debug!(bytes = self.vertex_capacity, "frame vertex buffer grown");
        }
        if index_bytes.len() as u64 > self.index_capacity {
            self.index_capacity = (index_bytes.len() as u64).next_power_of_two().min(limit);
            self.indices = Self::create(
                device,
                "Frame Indices",
                self.index_capacity,
                wgpu::BufferUsages::INDEX,
            );
            tracing::debug!(bytes = self.index_capacity, "frame index buffer grown");
        }

        queue.write_buffer(&self.vertices, 0, vertex_bytes);
        queue.write_buffer(&self.indices, 0, index_bytes);
        Ok(())
    }
}

pub struct GpuRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: RendererConfig,
    texture_format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    frame_buffers: FrameBuffers,
    group_buffers: FxHashMap<GroupId, GpuMesh>,
    surfaces: FrameSurfaces,
}

impl GpuRenderer {
    fn preferred_backends() -> wgpu::Backends {
        #[cfg(target_os = "macos")]
        {
            wgpu::Backends::METAL
        }
        #[cfg(target_os = "windows")]
        {
            wgpu::Backends::DX12
        }
        #[cfg(target_os = "linux")]
        {
            wgpu::Backends::VULKAN
        }
        #[cfg(target_arch = "wasm32")]
        {
            wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL
        }
        #[cfg(not(any(
            target_os = "macos",
            target_os = "windows",
            target_os = "linux",
            target_arch = "wasm32"
        )))]
        {
            wgpu::Backends::PRIMARY
        }
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(Arc<wgpu::Device>, Arc<wgpu::Queue>), RendererError> {
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("GAL GPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;
        Ok((Arc::new(device), Arc::new(queue)))
    }

    /// Create a new renderer without a surface (for headless rendering)
    pub async fn new(config: RendererConfig) -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        let (device, queue) = Self::request_device(&adapter).await?;
        let config = apply_renderer_config_overrides(config, &device.limits());
        log_renderer_config(&config);

        let texture_format = config
            .texture_format
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        Ok(Self::create_renderer(device, queue, texture_format, config, (800, 600)))
    }

    /// Create a new renderer with a window surface
    pub async fn with_surface<W>(
        window: Arc<W>,
        config: RendererConfig,
    ) -> Result<(Self, wgpu::Surface<'static>, wgpu::SurfaceCapabilities), RendererError>
    where
        W: raw_window_handle::HasWindowHandle
            + raw_window_handle::HasDisplayHandle
            + Send
            + Sync
            + 'static,
    {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        let (device, queue) = Self::request_device(&adapter).await?;
        let config = apply_renderer_config_overrides(config, &device.limits());
        log_renderer_config(&config);

        let caps = surface.get_capabilities(&adapter);
        tracing::debug!("Surface capabilities - formats: {:?}", caps.formats);

        let texture_format = match config.texture_format {
            Some(format) => format,
            None => caps
                .formats
                .iter()
                .find(|f| f.is_srgb())
                .or_else(|| caps.formats.first())
                .copied()
                .ok_or_else(|| RendererError::SurfaceConfig("no supported formats".into()))?,
        };
        tracing::debug!("Selected texture format: {:?}", texture_format);

        let renderer = Self::create_renderer(device, queue, texture_format, config, (800, 600));
        Ok((renderer, surface, caps))
    }

    fn create_renderer(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        texture_format: wgpu::TextureFormat,
        config: RendererConfig,
        (width, height): (u32, u32),
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
        });

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Uniforms"),
            contents: bytemuck::bytes_of(&MeshUniforms {
                viewport: [width as f32, height as f32],
                _padding: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: config.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let frame_buffers = FrameBuffers::new(&device);
        let surfaces = FrameSurfaces::new(texture_format, config.sample_count, width, height);

        Self {
            device,
            queue,
            config,
            texture_format,
            pipeline,
            uniforms,
            bind_group,
            frame_buffers,
            group_buffers: FxHashMap::default(),
            surfaces,
        }
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn texture_format(&self) -> wgpu::TextureFormat {
        self.texture_format
    }

    pub fn surfaces_mut(&mut self) -> &mut FrameSurfaces {
        &mut self.surfaces
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.surfaces.resize(width, height);
        let (width, height) = self.surfaces.dimensions();
        self.queue.write_buffer(
            &self.uniforms,
            0,
            bytemuck::bytes_of(&MeshUniforms {
                viewport: [width as f32, height as f32],
                _padding: [0.0; 2],
            }),
        );
    }

    /// Drops buffers of deleted groups and uploads ended groups seen for the
    /// first time
    pub fn sync_groups(&mut self, groups: &mut GroupCache) -> Result<(), RendererError> {
        for id in groups.take_released() {
            if self.group_buffers.remove(&id).is_some() {
                tracing::debug!(?id, "group buffers released");
            }
        }

        for (id, mesh) in groups.sealed() {
            if mesh.is_empty() || self.group_buffers.contains_key(&id) {
                continue;
            }
            let uploaded =
                GpuMesh::upload(&self.device, "Group Mesh", mesh, self.config.max_buffer_bytes)?;
            self.group_buffers.insert(id, uploaded);
        }
        Ok(())
    }

    /// Renders a frame into the main surface
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameBatch,
        groups: &mut GroupCache,
    ) -> Result<(), RendererError> {
        self.sync_groups(groups)?;
        if !frame.mesh.is_empty() {
            self.frame_buffers
                .write(&self.device, &self.queue, &frame.mesh, self.config.max_buffer_bytes)?;
        }

        // Draws before the last clear are overwritten by it; without one the
        // configured clear color is used
        let start = frame
            .calls
            .iter()
            .rposition(|call| matches!(call, DrawCall::Clear(_)));
        let clear = match start.map(|i| &frame.calls[i]) {
            Some(DrawCall::Clear(color)) => *color,
            _ => self.config.clear_color,
        };
        let load = wgpu::LoadOp::Clear(wgpu::Color {
            r: clear.r as f64,
            g: clear.g as f64,
            b: clear.b as f64,
            a: clear.a as f64,
        });
        let calls = &frame.calls[start.map_or(0, |i| i + 1)..];

        let target = self.surfaces.main(&self.device);
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("GAL Frame Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.attachment(),
                resolve_target: target.resolve_target(),
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);

        for call in calls {
            match call {
                DrawCall::Clear(_) => {}
                DrawCall::Immediate(range) => {
                    pass.set_vertex_buffer(0, self.frame_buffers.vertices.slice(..));
                    pass.set_index_buffer(
                        self.frame_buffers.indices.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(range.clone(), 0, 0..1);
                }
                DrawCall::Group(id) => match self.group_buffers.get(id) {
                    Some(group) => {
                        pass.set_vertex_buffer(0, group.vertices.slice(..));
                        pass.set_index_buffer(group.indices.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..group.index_count, 0, 0..1);
                    }
                    None => tracing::trace!(?id, "skipping group without geometry"),
                },
            }
        }

        Ok(())
    }

    /// Renders a frame and presents it on `surface`
    pub fn present(
        &mut self,
        surface: &wgpu::Surface<'_>,
        frame: &FrameBatch,
        groups: &mut GroupCache,
    ) -> Result<(), RendererError> {
        let output = surface.get_current_texture()?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("GAL Frame Encoder"),
            });

        self.render(&mut encoder, frame, groups)?;
        self.surfaces
            .copy_to_surface(&self.device, &mut encoder, &output.texture);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Number of groups resident on the GPU
    pub fn resident_groups(&self) -> usize {
        self.group_buffers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_limit() {
        assert!(check_size(16, 16).is_ok());
        assert!(matches!(
            check_size(17, 16),
            Err(RendererError::BufferTooLarge {
                requested: 17,
                limit: 16
            })
        ));
    }

    #[test]
    fn test_default_config() {
        let config = RendererConfig::default();
        assert_eq!(config.sample_count, 4);
        assert!(config.texture_format.is_none());
    }
}
