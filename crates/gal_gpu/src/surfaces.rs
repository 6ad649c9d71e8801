//! Main and backup render targets
//!
//! Every frame is rendered into the main target and then copied to the
//! window surface. The backup target holds a copy of the main one so a
//! transient overlay (a cursor, a rubber band) can be erased by copying the
//! saved pixels back instead of redrawing the scene.
//!
//! Both targets are created on first use and dropped when the size changes.

use gal_core::Box2D;

/// A texture with its default view
struct Buffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Color (resolved), optional multisampled color, and depth
pub struct RenderTarget {
    color: Buffer,
    msaa: Option<Buffer>,
    depth: Buffer,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let color = create_buffer(
            device,
            &format!("{label} Color"),
            (width, height),
            format,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
        );
        let msaa = (sample_count > 1).then(|| {
            create_buffer(
                device,
                &format!("{label} MSAA"),
                (width, height),
                format,
                sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::COPY_SRC
                    | wgpu::TextureUsages::COPY_DST,
            )
        });
        let depth = create_buffer(
            device,
            &format!("{label} Depth"),
            (width, height),
            DEPTH_FORMAT,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
        );

        Self { color, msaa, depth }
    }

    /// View to render into (multisampled when MSAA is on)
    pub fn attachment(&self) -> &wgpu::TextureView {
        self.msaa.as_ref().map_or(&self.color.view, |m| &m.view)
    }

    /// Where multisampled rendering resolves to
    pub fn resolve_target(&self) -> Option<&wgpu::TextureView> {
        self.msaa.as_ref().map(|_| &self.color.view)
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color.texture
    }

    fn textures(&self) -> impl Iterator<Item = &wgpu::Texture> {
        std::iter::once(&self.color.texture)
            .chain(self.msaa.as_ref().map(|m| &m.texture))
            .chain(std::iter::once(&self.depth.texture))
    }
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

fn create_buffer(
    device: &wgpu::Device,
    label: &str,
    (width, height): (u32, u32),
    format: wgpu::TextureFormat,
    sample_count: u32,
    usage: wgpu::TextureUsages,
) -> Buffer {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Buffer { texture, view }
}

/// A pixel rectangle clamped to the surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    /// Outward-rounded pixel cover of `region`, clipped to `width x height`.
    ///
    /// `None` when nothing of the region is on screen.
    pub fn clamp(region: Box2D, width: u32, height: u32) -> Option<Self> {
        let region = region.normalize();
        let x0 = region.x().floor().max(0.0);
        let y0 = region.y().floor().max(0.0);
        let x1 = region.end().x.ceil().min(width as f64);
        let y1 = region.end().y.ceil().min(height as f64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

fn copy_texture(
    encoder: &mut wgpu::CommandEncoder,
    src: &wgpu::Texture,
    dst: &wgpu::Texture,
    region: PixelRegion,
) {
    let origin = wgpu::Origin3d {
        x: region.x,
        y: region.y,
        z: 0,
    };
    encoder.copy_texture_to_texture(
        wgpu::ImageCopyTexture {
            texture: src,
            mip_level: 0,
            origin,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyTexture {
            texture: dst,
            mip_level: 0,
            origin,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::Extent3d {
            width: region.width,
            height: region.height,
            depth_or_array_layers: 1,
        },
    );
}

pub struct FrameSurfaces {
    format: wgpu::TextureFormat,
    sample_count: u32,
    width: u32,
    height: u32,
    main: Option<RenderTarget>,
    backup: Option<RenderTarget>,
}

impl FrameSurfaces {
    pub fn new(format: wgpu::TextureFormat, sample_count: u32, width: u32, height: u32) -> Self {
        Self {
            format,
            sample_count: sample_count.max(1),
            width: width.max(1),
            height: height.max(1),
            main: None,
            backup: None,
        }
    }

    /// Drops both targets when the size changes; they come back on next use
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.main = None;
        self.backup = None;
        tracing::debug!(width, height, "frame surfaces invalidated");
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn full_region(&self) -> PixelRegion {
        PixelRegion {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    pub fn main(&mut self, device: &wgpu::Device) -> &RenderTarget {
        let size = (self.width, self.height);
        let (format, samples) = (self.format, self.sample_count);
        self.main.get_or_insert_with(|| {
            tracing::debug!(?size, "creating main surface");
            RenderTarget::new(device, "Main Surface", size, format, samples)
        })
    }

    fn ensure_backup(&mut self, device: &wgpu::Device) {
        let size = (self.width, self.height);
        let (format, samples) = (self.format, self.sample_count);
        self.backup.get_or_insert_with(|| {
            tracing::debug!(?size, "creating backup surface");
            RenderTarget::new(device, "Backup Surface", size, format, samples)
        });
    }

    /// Copies the whole main target into the backup target
    pub fn save_screen(&mut self, device: &wgpu::Device, encoder: &mut wgpu::CommandEncoder) {
        self.main(device);
        self.ensure_backup(device);
        let region = self.full_region();
        if let (Some(main), Some(backup)) = (&self.main, &self.backup) {
            for (src, dst) in main.textures().zip(backup.textures()) {
                copy_texture(encoder, src, dst, region);
            }
        }
    }

    /// Copies the backup target back over the main target
    pub fn restore_screen(&mut self, device: &wgpu::Device, encoder: &mut wgpu::CommandEncoder) {
        self.main(device);
        let region = self.full_region();
        match (&self.main, &self.backup) {
            (Some(main), Some(backup)) => {
                for (src, dst) in backup.textures().zip(main.textures()) {
                    copy_texture(encoder, src, dst, region);
                }
            }
            _ => tracing::warn!("restore_screen without a saved screen"),
        }
    }

    /// Scope that restores `region` of the resolved main color when dropped
    pub fn overlay_scope<'a>(
        &'a mut self,
        device: &wgpu::Device,
        encoder: &'a mut wgpu::CommandEncoder,
        region: Box2D,
    ) -> OverlayScope<'a> {
        self.main(device);
        self.ensure_backup(device);
        let region = PixelRegion::clamp(region, self.width, self.height);
        if let (Some(region), Some(main), Some(backup)) = (region, &self.main, &self.backup) {
            copy_texture(encoder, &main.color.texture, &backup.color.texture, region);
        }
        OverlayScope {
            surfaces: self,
            encoder,
            region,
        }
    }

    /// Copies the resolved main color to a window surface texture
    pub fn copy_to_surface(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        surface_texture: &wgpu::Texture,
    ) {
        let region = self.full_region();
        let main = self.main(device);
        copy_texture(encoder, &main.color.texture, surface_texture, region);
    }
}

/// Saved region under a transient overlay.
///
/// Draw the overlay into the main target while the scope is alive; on drop
/// the saved pixels are copied back.
pub struct OverlayScope<'a> {
    surfaces: &'a FrameSurfaces,
    encoder: &'a mut wgpu::CommandEncoder,
    region: Option<PixelRegion>,
}

impl OverlayScope<'_> {
    pub fn target(&self) -> Option<&RenderTarget> {
        self.surfaces.main.as_ref()
    }

    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        &mut *self.encoder
    }

    pub fn region(&self) -> Option<PixelRegion> {
        self.region
    }
}

impl Drop for OverlayScope<'_> {
    fn drop(&mut self) {
        if let (Some(region), Some(main), Some(backup)) =
            (self.region, &self.surfaces.main, &self.surfaces.backup)
        {
            copy_texture(self.encoder, &backup.color.texture, &main.color.texture, region);
        }
    }
}
