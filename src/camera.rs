//! Cameras and viewport sizing.
//!
//! Every scene is viewed through one shared [`PerspectiveCamera`]. The
//! compositor draws its quad through an [`OrthoCamera`] whose frustum is the
//! unit square, independent of the window's aspect ratio.

use glam::{Mat4, Vec3};

/// A perspective camera looking down −Z from `position`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 75f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    /// Update the aspect ratio. Degenerate sizes keep the previous aspect.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Orthographic camera with explicit frustum planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoCamera {
    /// The compositor's fixed frustum: −0.5..0.5 on X and Y.
    pub fn unit_square() -> Self {
        Self {
            left: -0.5,
            right: 0.5,
            top: 0.5,
            bottom: -0.5,
            near: -1000.0,
            far: 1000.0,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::unit_square()
    }
}

/// The camera pair used by the sketch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraRig {
    pub scene: PerspectiveCamera,
    pub composite: OrthoCamera,
}

impl CameraRig {
    pub fn new(width: u32, height: u32) -> Self {
        let mut rig = Self::default();
        rig.resize(width, height);
        rig
    }

    /// Follow a viewport resize. Only the perspective aspect changes.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.set_aspect(width, height);
    }
}

/// Window size plus the pixel-ratio clamp applied to rendering.
///
/// Scene render targets are sized to the logical window size times
/// `min(scale_factor, max_pixel_ratio)`, so high-density displays don't
/// render more scene pixels than needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    physical: (u32, u32),
    scale_factor: f64,
    max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        Self {
            physical: (width, height),
            scale_factor,
            max_pixel_ratio,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.physical = (width, height);
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    pub fn physical_size(&self) -> (u32, u32) {
        self.physical
    }

    /// Effective device pixel ratio after clamping.
    pub fn pixel_ratio(&self) -> f64 {
        self.scale().min(self.max_pixel_ratio)
    }

    fn scale(&self) -> f64 {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        }
    }

    /// Size in pixels of the scene render targets.
    ///
    /// Zero when the window is minimized.
    pub fn render_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio() / self.scale();
        let (w, h) = self.physical;
        let scaled = |v: u32| {
            if v == 0 {
                0
            } else {
                ((v as f64 * ratio).round() as u32).max(1)
            }
        };
        (scaled(w), scaled(h))
    }

    pub fn is_zero_sized(&self) -> bool {
        self.physical.0 == 0 || self.physical.1 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_perspective_matches_sketch_setup() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));
        assert!((camera.fov - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!((camera.near, camera.far), (0.1, 100.0));
    }

    #[test]
    fn resize_updates_perspective_aspect_only() {
        let mut rig = CameraRig::new(800, 600);
        rig.resize(1920, 1080);
        assert!((rig.scene.aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(rig.composite, OrthoCamera::unit_square());
    }

    #[test]
    fn zero_height_keeps_previous_aspect() {
        let mut rig = CameraRig::new(800, 400);
        rig.resize(800, 0);
        assert_eq!(rig.scene.aspect, 2.0);
    }

    #[test]
    fn unit_square_maps_to_clip_corners() {
        let proj = OrthoCamera::unit_square().projection_matrix();
        let corner = proj.project_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y - 1.0).abs() < 1e-6);
        let corner = proj.project_point3(Vec3::new(-0.5, -0.5, 0.0));
        assert!((corner.x + 1.0).abs() < 1e-6);
        assert!((corner.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn origin_is_in_front_of_the_camera() {
        let camera = PerspectiveCamera::default();
        let view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((view.z + 5.0).abs() < 1e-5);
    }

    #[test]
    fn pixel_ratio_is_clamped() {
        let viewport = Viewport::new(3000, 2000, 3.0, 2.0);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.render_size(), (2000, 1333));
    }

    #[test]
    fn low_density_display_renders_at_native_size() {
        let viewport = Viewport::new(1280, 720, 1.0, 2.0);
        assert_eq!(viewport.render_size(), (1280, 720));
    }

    #[test]
    fn minimized_window_has_zero_render_size() {
        let viewport = Viewport::new(0, 0, 2.0, 2.0);
        assert!(viewport.is_zero_sized());
        assert_eq!(viewport.render_size(), (0, 0));
    }
}
