//! GPU side of the sketch: executes a [`FramePlan`] each frame.
//!
//! Per frame the [`Renderer`]:
//! 1. makes sure every scene target matches the render size,
//! 2. draws the current and next scenes into their own targets,
//! 3. composites the two targets onto the swap-chain image,
//! 4. submits once and presents.

mod compositor;
mod scene_pass;
mod target;
#[cfg(test)]
mod wgsl_check;

pub use compositor::{CompositeUniforms, Compositor};
pub use scene_pass::{GpuScene, ScenePass, SceneUniforms};
pub use target::{RenderTarget, RenderTargetSet};

use std::path::Path;

use crate::camera::CameraRig;
use crate::config::SceneLayout;
use crate::error::SketchResult;
use crate::frame::FramePlan;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, SphereGeometry};
use crate::scene::ScenePool;
use crate::texture::Texture;

/// Every GPU resource the sketch draws with.
pub struct Renderer {
    scene_pass: ScenePass,
    compositor: Compositor,
    targets: RenderTargetSet,
    sphere: Mesh,
    scenes: Vec<GpuScene>,
}

impl Renderer {
    /// Upload the shared sphere, every scene's instances and matcap, and
    /// allocate one render target per scene.
    pub fn new(
        gpu: &GpuContext,
        pool: &ScenePool,
        layout: &SceneLayout,
        target_size: (u32, u32),
        composite_shader: Option<&Path>,
    ) -> SketchResult<Self> {
        let scene_pass = ScenePass::new(gpu);
        let compositor = Compositor::new(gpu, composite_shader)?;

        let geometry =
            SphereGeometry::new(layout.particle_radius, layout.segments, layout.rings);
        let sphere = Mesh::sphere(gpu, &geometry);

        let scenes = pool
            .iter()
            .enumerate()
            .map(|(i, scene)| {
                let matcap = Texture::load_matcap(gpu, &scene.matcap);
                log::debug!(
                    "scene {i}: {} instances, matcap {}",
                    scene.instances().len(),
                    scene.matcap.label()
                );
                scene_pass.prepare(gpu, scene, &matcap, i)
            })
            .collect();

        let targets = RenderTargetSet::new(gpu, pool.len(), target_size);

        Ok(Self {
            scene_pass,
            compositor,
            targets,
            sphere,
            scenes,
        })
    }

    /// Draw one frame according to `plan` and present it.
    ///
    /// Scene targets are (re)sized to `target_size` first. Surface
    /// acquisition errors are returned untouched so the caller can decide to
    /// reconfigure or give up.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        pool: &ScenePool,
        cameras: &CameraRig,
        plan: &FramePlan,
        target_size: (u32, u32),
    ) -> Result<(), wgpu::SurfaceError> {
        self.compositor.check_reload(gpu);
        self.targets.ensure_size(gpu, target_size);

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        for pass in &plan.passes {
            let (Some(scene), Some(gpu_scene), Some(target)) = (
                pool.get(pass.scene),
                self.scenes.get(pass.scene),
                self.targets.get(pass.target),
            ) else {
                log::warn!("frame plan names missing scene {}", pass.scene);
                continue;
            };
            self.scene_pass.render(
                gpu,
                &mut encoder,
                target,
                &self.sphere,
                gpu_scene,
                scene,
                &cameras.scene,
            );
        }

        let composite = &plan.composite;
        if let (Some(from), Some(to)) = (
            self.targets.get(composite.from_target),
            self.targets.get(composite.to_target),
        ) {
            self.compositor.render(
                gpu,
                &mut encoder,
                &view,
                &from.view,
                &to.view,
                &cameras.composite,
                composite,
            );
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
