//! Full-screen compositing of two scene targets.
//!
//! The compositor draws the unit quad through the orthographic camera and
//! blends `texture1` into `texture2` by `progress`. The built-in shader lives
//! in `shaders/composite.wgsl`; a replacement can be loaded from disk and is
//! hot-reloaded when the file changes. A replacement must keep the same
//! bindings:
//!
//! | Binding | Resource                                       |
//! |---------|------------------------------------------------|
//! | 0       | `proj: mat4x4f, time: f32, progress: f32, _pad: vec2f` |
//! | 1       | `texture1` (the current scene)                 |
//! | 2       | `texture2` (the next scene)                    |
//! | 3       | filtering sampler                              |

use std::path::Path;

use crate::camera::OrthoCamera;
use crate::error::SketchResult;
use crate::frame::CompositeParams;
use crate::gpu::GpuContext;
use crate::hot_shader::{HotShader, try_compile};
use crate::mesh::{Mesh, Vertex3d};

const BUILTIN_SHADER: &str = include_str!("../shaders/composite.wgsl");

/// Uniforms for the compositor shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeUniforms {
    pub proj: [[f32; 4]; 4],
    pub time: f32,
    pub progress: f32,
    pub _pad: [f32; 2],
}

impl CompositeUniforms {
    pub fn new(camera: &OrthoCamera, params: &CompositeParams) -> Self {
        Self {
            proj: camera.projection_matrix().to_cols_array_2d(),
            time: params.time,
            progress: params.progress.clamp(0.0, 1.0),
            _pad: [0.0; 2],
        }
    }
}

/// GPU resources for the compositing pass.
pub struct Compositor {
    pipeline: wgpu::RenderPipeline,
    pipeline_layout: wgpu::PipelineLayout,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    quad: Mesh,
    shader_override: Option<HotShader>,
}

impl Compositor {
    /// Build the compositor, optionally from a WGSL file instead of the
    /// built-in shader.
    ///
    /// A file that can't be read is an error. A file that fails to compile
    /// is logged and the built-in shader is used until it is fixed.
    pub fn new(gpu: &GpuContext, shader_path: Option<&Path>) -> SketchResult<Self> {
        let device = &gpu.device;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Composite Uniforms"),
            size: std::mem::size_of::<CompositeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Composite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Composite Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader_override = shader_path.map(HotShader::new).transpose()?;

        let pipeline = shader_override
            .as_ref()
            .and_then(|shader| {
                try_compile(&shader.path().display().to_string(), || {
                    Self::create_pipeline(gpu, &pipeline_layout, shader.source())
                })
            })
            .unwrap_or_else(|| Self::create_pipeline(gpu, &pipeline_layout, BUILTIN_SHADER));

        Ok(Self {
            pipeline,
            pipeline_layout,
            bind_group_layout,
            uniform_buffer,
            sampler,
            quad: Mesh::quad(gpu),
            shader_override,
        })
    }

    fn create_pipeline(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        source: &str,
    ) -> wgpu::RenderPipeline {
        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Composite Shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        gpu.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Composite Pipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    /// Recompile the override shader if its file changed. Call once per
    /// frame; does nothing when the built-in shader is in use.
    pub fn check_reload(&mut self, gpu: &GpuContext) {
        let Some(shader) = self.shader_override.as_mut() else {
            return;
        };
        let label = shader.path().display().to_string();
        let Some(source) = shader.poll() else {
            return;
        };

        let layout = &self.pipeline_layout;
        if let Some(pipeline) = try_compile(&label, || Self::create_pipeline(gpu, layout, source)) {
            self.pipeline = pipeline;
            log::info!("compositor shader {label} reloaded");
        }
    }

    /// Record the compositing pass into `target`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        texture1: &wgpu::TextureView,
        texture2: &wgpu::TextureView,
        camera: &OrthoCamera,
        params: &CompositeParams,
    ) {
        let uniforms = CompositeUniforms::new(camera, params);
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture1),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(texture2),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
        pass.set_index_buffer(self.quad.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.quad.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use naga::ShaderStage;

    use super::*;
    use crate::render::wgsl_check;

    #[test]
    fn builtin_shader_validates() {
        let module = wgsl_check::validate("composite.wgsl", BUILTIN_SHADER);
        assert_eq!(
            wgsl_check::entry_points(&module),
            vec![("vs", ShaderStage::Vertex), ("fs", ShaderStage::Fragment)]
        );
    }

    #[test]
    fn builtin_shader_matches_bind_group_layout() {
        let module = wgsl_check::validate("composite.wgsl", BUILTIN_SHADER);
        assert_eq!(
            wgsl_check::bindings(&module),
            vec![(0, "uniform"), (1, "texture"), (2, "texture"), (3, "sampler")]
        );
        assert_eq!(
            wgsl_check::uniform_size(&module, 0),
            Some(std::mem::size_of::<CompositeUniforms>() as u32)
        );
    }

    #[test]
    fn builtin_shader_reads_only_quad_attributes() {
        let module = wgsl_check::validate("composite.wgsl", BUILTIN_SHADER);
        let provided = wgsl_check::layout_locations(&[Vertex3d::LAYOUT]);
        for location in wgsl_check::vertex_locations(&module) {
            assert!(provided.contains(&location), "location {location} has no attribute");
        }
    }

    #[test]
    fn builtin_shader_outputs_a_mix_of_both_scenes() {
        let module = wgsl_check::validate("composite.wgsl", BUILTIN_SHADER);
        assert!(wgsl_check::fragment_returns_mix(&module));
        // The ripple offset is scaled by this weight, so the sample
        // positions are unshifted at both ends of the blend.
        assert!(BUILTIN_SHADER.contains("let weight = p * (1.0 - p);"));
    }

    #[test]
    fn uniforms_clamp_progress() {
        let params = CompositeParams {
            time: 1.0,
            progress: 1.7,
            from_target: 0,
            to_target: 1,
        };
        let uniforms = CompositeUniforms::new(&OrthoCamera::unit_square(), &params);
        assert_eq!(uniforms.progress, 1.0);
        assert_eq!(std::mem::size_of::<CompositeUniforms>(), 80);
    }
}
