//! Off-screen render targets, one per scene.

use crate::gpu::GpuContext;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// An off-screen color buffer with its own depth buffer.
///
/// The color texture is both a render attachment (the scene pass draws into
/// it) and a sampled texture (the compositor reads it). Its format matches
/// the surface. Its size follows the clamped render size, not the window, so
/// the compositor scales it up on dense displays.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub(crate) depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Create a `width × height` target. Zero dimensions are raised to one.
    pub fn new(gpu: &GpuContext, width: u32, height: u32, label: &str) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label} Depth")),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            depth_view,
            width,
            height,
        }
    }

    /// Recreate the target if its size differs from `width × height`.
    /// Returns `true` if it did.
    pub fn ensure_size(&mut self, gpu: &GpuContext, width: u32, height: u32, label: &str) -> bool {
        let wanted = (width.max(1), height.max(1));
        if (self.width, self.height) != wanted {
            *self = Self::new(gpu, wanted.0, wanted.1, label);
            true
        } else {
            false
        }
    }
}

/// One [`RenderTarget`] per scene; index `i` always holds scene `i`.
pub struct RenderTargetSet {
    targets: Vec<RenderTarget>,
}

impl RenderTargetSet {
    pub fn new(gpu: &GpuContext, count: usize, (width, height): (u32, u32)) -> Self {
        let targets = (0..count)
            .map(|i| RenderTarget::new(gpu, width, height, &target_label(i)))
            .collect();
        Self { targets }
    }

    /// Follow the viewport's render size. Called once per frame; only
    /// reallocates after a resize.
    pub fn ensure_size(&mut self, gpu: &GpuContext, (width, height): (u32, u32)) {
        let mut resized = false;
        for (i, target) in self.targets.iter_mut().enumerate() {
            resized |= target.ensure_size(gpu, width, height, &target_label(i));
        }
        if resized {
            log::debug!("render targets resized to {width}x{height}");
        }
    }

    pub fn get(&self, index: usize) -> Option<&RenderTarget> {
        self.targets.get(index)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

fn target_label(index: usize) -> String {
    format!("Scene Target {index}")
}
