//! Mesh primitives for the particle scenes and the compositor quad.
//!
//! Geometry is generated on the CPU as plain [`Vertex3d`] / index lists so it
//! can be inspected without a GPU, then uploaded once into a [`Mesh`].
//!
//! # Vertex Layout
//!
//! [`Vertex3d`] occupies 32 bytes per vertex:
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |
//!
//! Per-instance offsets for the particle clones come from a second buffer
//! laid out as [`InstanceRaw::LAYOUT`] (location 3).

use glam::Vec3;

use crate::gpu::GpuContext;

/// A vertex with position, normal, and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// Position in model space.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    /// Texture coordinates in [0, 1].
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// Vertex buffer layout: position (loc 0), normal (loc 1), uv (loc 2).
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Per-instance data for a particle clone: its offset from the scene root.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub offset: [f32; 3],
    _pad: f32,
}

impl InstanceRaw {
    /// Instance buffer layout: offset (loc 3), stepped per instance.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<InstanceRaw>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };

    pub fn new(offset: Vec3) -> Self {
        Self {
            offset: offset.to_array(),
            _pad: 0.0,
        }
    }
}

/// CPU-side UV sphere description.
///
/// `segments` subdivide around the Y axis and `rings` from pole to pole.
/// Triangles wind counter-clockwise when seen from outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub segments: u32,
    pub rings: u32,
}

impl SphereGeometry {
    pub fn new(radius: f32, segments: u32, rings: u32) -> Self {
        Self {
            radius,
            segments: segments.max(3),
            rings: rings.max(2),
        }
    }

    /// Generate vertices and triangle indices.
    pub fn build(&self) -> (Vec<Vertex3d>, Vec<u32>) {
        let segments = self.segments;
        let rings = self.rings;
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let normal = [x, y, z];
                let position = [x * self.radius, y * self.radius, z * self.radius];
                let uv = [seg as f32 / segments as f32, ring as f32 / rings as f32];

                vertices.push(Vertex3d::new(position, normal, uv));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);
            }
        }

        (vertices, indices)
    }
}

/// Unit quad on the XY plane, centered at the origin, facing +Z.
///
/// UVs follow texture convention: (0, 0) is the top-left corner.
pub fn unit_quad() -> (Vec<Vertex3d>, Vec<u32>) {
    let n = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex3d::new([-0.5, -0.5, 0.0], n, [0.0, 1.0]),
        Vertex3d::new([0.5, -0.5, 0.0], n, [1.0, 1.0]),
        Vertex3d::new([0.5, 0.5, 0.0], n, [1.0, 0.0]),
        Vertex3d::new([-0.5, 0.5, 0.0], n, [0.0, 0.0]),
    ];
    let indices = vec![0, 1, 2, 2, 3, 0];
    (vertices, indices)
}

/// GPU-resident geometry with vertex and index buffers.
///
/// Meshes are immutable after creation.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    /// Upload vertex and index data.
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32], label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub fn sphere(gpu: &GpuContext, geometry: &SphereGeometry) -> Self {
        let (vertices, indices) = geometry.build();
        Self::new(gpu, &vertices, &indices, "Particle Sphere")
    }

    pub fn quad(gpu: &GpuContext) -> Self {
        let (vertices, indices) = unit_quad();
        Self::new(gpu, &vertices, &indices, "Compositor Quad")
    }
}
