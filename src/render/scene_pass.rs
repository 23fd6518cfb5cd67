//! Instanced matcap rendering of particle scenes.
//!
//! All scenes share one sphere [`Mesh`] and one pipeline. Each scene owns a
//! [`GpuScene`]: an instance buffer with its clone offsets, a uniform buffer
//! with its root transform and a bind group pointing at its matcap. Because
//! every scene writes its own uniform buffer, the current and next scenes can
//! both be recorded into one command encoder before a single submit.
//!
//! # Bindings (group 0)
//!
//! | Binding | Resource                                   |
//! |---------|--------------------------------------------|
//! | 0       | [`SceneUniforms`] (view-proj, view, model) |
//! | 1       | matcap texture                             |
//! | 2       | matcap sampler                             |

use wgpu::util::DeviceExt;

use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::gpu::GpuContext;
use crate::mesh::{InstanceRaw, Mesh, Vertex3d};
use crate::render::target::{DEPTH_FORMAT, RenderTarget};
use crate::scene::Scene;
use crate::texture::Texture;

const SHADER: &str = include_str!("../shaders/matcap.wgsl");

/// Per-scene uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// Scene root transform.
    pub model: [[f32; 4]; 4],
}

impl SceneUniforms {
    pub fn new(camera: &PerspectiveCamera, scene: &Scene) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            model: scene.root_matrix().to_cols_array_2d(),
        }
    }
}

/// GPU resources owned by one scene.
pub struct GpuScene {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
}

/// The pipeline drawing particle scenes into their targets.
pub struct ScenePass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    clear_color: Color,
}

impl ScenePass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Matcap Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                // Uniforms
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
                // Matcap
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT, InstanceRaw::LAYOUT],
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
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            clear_color: Color::BLACK,
        }
    }

    /// Upload a scene's instance offsets and bind its matcap.
    pub fn prepare(&self, gpu: &GpuContext, scene: &Scene, matcap: &Texture, index: usize) -> GpuScene {
        let instances: Vec<InstanceRaw> = scene
            .instances()
            .iter()
            .map(|&offset| InstanceRaw::new(offset))
            .collect();

        let instance_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Scene {index} Instances")),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let uniform_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Scene {index} Uniforms")),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Scene {index} Bind Group")),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&matcap.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&matcap.sampler),
                },
            ],
        });

        GpuScene {
            uniform_buffer,
            bind_group,
            instance_buffer,
            instance_count: instances.len() as u32,
        }
    }

    /// Record a pass that clears `target` and draws `scene` into it.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget,
        mesh: &Mesh,
        gpu_scene: &GpuScene,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        let uniforms = SceneUniforms::new(camera, scene);
        gpu.queue.write_buffer(
            &gpu_scene.uniform_buffer,
            0,
            bytemuck::cast_slice(&[uniforms]),
        );

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &gpu_scene.bind_group, &[]);
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, gpu_scene.instance_buffer.slice(..));
        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..mesh.index_count, 0, 0..gpu_scene.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use naga::ShaderStage;

    use super::*;
    use crate::render::wgsl_check;

    /// Matcap lookup coordinates for a view-space position and normal.
    ///
    /// Mirrors the fragment shader's lookup, in texture space (v grows
    /// downward).
    fn matcap_uv(view_pos: Vec3, view_normal: Vec3) -> Vec2 {
        let n = view_normal.normalize_or_zero();
        let view_dir = (-view_pos).normalize_or(Vec3::Z);
        let x = Vec3::new(view_dir.z, 0.0, -view_dir.x).normalize_or(Vec3::X);
        let y = view_dir.cross(x);
        let uv = Vec2::new(x.dot(n), y.dot(n)) * 0.495 + 0.5;
        Vec2::new(uv.x, 1.0 - uv.y)
    }

    #[test]
    fn facing_normal_samples_the_center() {
        let uv = matcap_uv(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!((uv - Vec2::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn upward_normal_samples_the_top() {
        let uv = matcap_uv(Vec3::new(0.0, 0.0, -5.0), Vec3::Y);
        assert!((uv.x - 0.5).abs() < 1e-6);
        assert!(uv.y < 0.01);
    }

    #[test]
    fn right_normal_samples_the_right_edge() {
        let uv = matcap_uv(Vec3::new(0.0, 0.0, -5.0), Vec3::X);
        assert!(uv.x > 0.99);
        assert!((uv.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn off_axis_sphere_center_still_hits_the_middle() {
        let pos = Vec3::new(2.0, 1.0, -5.0);
        let toward_camera = (-pos).normalize();
        let uv = matcap_uv(pos, toward_camera);
        assert!((uv - Vec2::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn uniforms_are_three_matrices() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 3 * 64);
    }

    #[test]
    fn shader_validates() {
        let module = wgsl_check::validate("matcap.wgsl", SHADER);
        assert_eq!(
            wgsl_check::entry_points(&module),
            vec![("vs", ShaderStage::Vertex), ("fs", ShaderStage::Fragment)]
        );
    }

    #[test]
    fn shader_matches_bind_group_layout() {
        let module = wgsl_check::validate("matcap.wgsl", SHADER);
        assert_eq!(
            wgsl_check::bindings(&module),
            vec![(0, "uniform"), (1, "texture"), (2, "sampler")]
        );
        assert_eq!(
            wgsl_check::uniform_size(&module, 0),
            Some(std::mem::size_of::<SceneUniforms>() as u32)
        );
    }

    #[test]
    fn shader_reads_vertex_and_instance_attributes() {
        let module = wgsl_check::validate("matcap.wgsl", SHADER);
        let provided = wgsl_check::layout_locations(&[Vertex3d::LAYOUT, InstanceRaw::LAYOUT]);
        let read = wgsl_check::vertex_locations(&module);
        assert!(read.contains(&3), "instance offset is unused");
        for location in read {
            assert!(provided.contains(&location), "location {location} has no attribute");
        }
    }
}
