use std::path::Path;

use glam::Vec3;

use crate::color::Color;
use crate::config::MatcapSource;
use crate::error::SketchResult;
use crate::gpu::GpuContext;

/// Edge length of generated matcaps.
pub const PROCEDURAL_MATCAP_SIZE: u32 = 256;

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Matcaps are looked up by normal, so smooth filtering and no wrap.
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            view,
            sampler,
            width,
            height,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &Path) -> SketchResult<Self> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(
            gpu,
            &img,
            width,
            height,
            &path.display().to_string(),
        ))
    }

    /// Generate a lit-sphere matcap tinted with `tint`.
    pub fn procedural_matcap(gpu: &GpuContext, tint: Color, size: u32) -> Self {
        let data = matcap_pixels(tint, size);
        Self::from_rgba(gpu, &data, size, size, "Procedural Matcap")
    }

    /// Resolve a [`MatcapSource`] to a texture.
    ///
    /// A file that can't be read or decoded is logged and replaced with the
    /// procedural matcap of its fallback tint, so this never fails.
    pub fn load_matcap(gpu: &GpuContext, source: &MatcapSource) -> Self {
        match source {
            MatcapSource::File { path, fallback } => match Self::from_file(gpu, path) {
                Ok(texture) => {
                    log::debug!(
                        "loaded matcap {} ({}x{})",
                        path.display(),
                        texture.width,
                        texture.height
                    );
                    texture
                }
                Err(err) => {
                    log::warn!(
                        "matcap {} unavailable ({err}), using procedural fallback",
                        path.display()
                    );
                    Self::procedural_matcap(gpu, *fallback, PROCEDURAL_MATCAP_SIZE)
                }
            },
            MatcapSource::Procedural(tint) => {
                Self::procedural_matcap(gpu, *tint, PROCEDURAL_MATCAP_SIZE)
            }
        }
    }
}

/// RGBA8 pixels of a lit sphere as seen head-on, `size × size`.
///
/// Each texel stands for the view-space normal at that point of the disc:
/// a soft key light from the upper left, a specular highlight and a darker
/// rim. Texels outside the disc repeat the rim color so edge lookups stay
/// clean under filtering.
pub fn matcap_pixels(tint: Color, size: u32) -> Vec<u8> {
    let size = size.max(1);
    let light = Vec3::new(-0.45, 0.6, 0.65).normalize();
    let half = (light + Vec3::Z).normalize();
    let mut data = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
            let v = 1.0 - (y as f32 + 0.5) / size as f32 * 2.0;

            let mut xy = glam::Vec2::new(u, v);
            if xy.length_squared() > 1.0 {
                xy = xy.normalize();
            }
            let z = (1.0 - xy.length_squared()).max(0.0).sqrt();
            let normal = Vec3::new(xy.x, xy.y, z);

            let diffuse = normal.dot(light).max(0.0);
            let specular = normal.dot(half).max(0.0).powf(40.0);
            let rim = 1.0 - 0.35 * (1.0 - z).powi(2);

            let shade = (0.22 + 0.78 * diffuse) * rim;
            let lit = tint.shade(shade);
            let color = Color::rgba(
                lit.r + specular * 0.6,
                lit.g + specular * 0.6,
                lit.b + specular * 0.6,
                1.0,
            );
            data.extend_from_slice(&color.to_srgba8());
        }
    }

    data
}
