//! Application configuration.
//!
//! [`AppConfig`] gathers everything the sketch needs at startup: window
//! settings, the scene layout, transition timing and the matcap assets. It
//! follows a builder style so both the CLI and library users can tweak only
//! what they care about.

use std::path::PathBuf;

use crate::color::Color;
use crate::error::{SketchError, SketchResult};
use crate::scene::Easing;

const NEUTRAL_GRAY: Color = Color::rgb(0.62, 0.62, 0.66);

/// Where a scene's matcap comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum MatcapSource {
    /// Image file on disk. Falls back to `fallback` if it can't be decoded.
    File { path: PathBuf, fallback: Color },
    /// Built-in procedural matcap tinted with the given color.
    Procedural(Color),
}

impl MatcapSource {
    pub fn red() -> Self {
        MatcapSource::Procedural(Color::rgb(0.85, 0.18, 0.16))
    }

    pub fn green() -> Self {
        MatcapSource::Procedural(Color::rgb(0.22, 0.78, 0.35))
    }

    pub fn gray() -> Self {
        MatcapSource::Procedural(NEUTRAL_GRAY)
    }

    /// Load from `path`, using a neutral gray if the file is unusable.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        MatcapSource::File {
            path: path.into(),
            fallback: NEUTRAL_GRAY,
        }
    }

    /// Short human-readable name, used for labels and logs.
    pub fn label(&self) -> String {
        match self {
            MatcapSource::File { path, .. } => path.display().to_string(),
            MatcapSource::Procedural(c) => {
                format!("procedural({:.2}, {:.2}, {:.2})", c.r, c.g, c.b)
            }
        }
    }
}

/// How particles are scattered inside each scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLayout {
    /// Sphere clones per scene.
    pub instances_per_scene: usize,
    /// Distance of every clone from the scene origin.
    pub shell_radius: f32,
    /// Radius of the base sphere mesh.
    pub particle_radius: f32,
    /// Longitudinal / latitudinal subdivisions of the base sphere.
    pub segments: u32,
    pub rings: u32,
    /// Y rotation speed in radians per second.
    pub angular_rate: f32,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            instances_per_scene: 50,
            shell_radius: 2.0,
            particle_radius: 0.2,
            segments: 32,
            rings: 32,
            angular_rate: 0.1,
        }
    }
}

/// Timing of a scene-to-scene crossfade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionConfig {
    /// Duration in seconds.
    pub duration: f32,
    pub easing: Easing,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: 1.5,
            easing: Easing::Power4InOut,
        }
    }
}

/// Configuration for the sketch window and its scenes.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Upper bound on the device pixel ratio used for rendering.
    pub max_pixel_ratio: f64,
    pub matcaps: Vec<MatcapSource>,
    pub layout: SceneLayout,
    pub transition: TransitionConfig,
    /// Seed for particle placement. `None` picks a random one.
    pub seed: Option<u64>,
    /// Optional WGSL file replacing the built-in compositor shader.
    pub composite_shader: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Scenefade".to_string(),
            width: 1280,
            height: 720,
            max_pixel_ratio: 2.0,
            matcaps: vec![
                MatcapSource::red(),
                MatcapSource::green(),
                MatcapSource::gray(),
            ],
            layout: SceneLayout::default(),
            transition: TransitionConfig::default(),
            seed: None,
            composite_shader: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn matcaps(mut self, matcaps: Vec<MatcapSource>) -> Self {
        self.matcaps = matcaps;
        self
    }

    pub fn instances_per_scene(mut self, count: usize) -> Self {
        self.layout.instances_per_scene = count;
        self
    }

    pub fn shell_radius(mut self, radius: f32) -> Self {
        self.layout.shell_radius = radius;
        self
    }

    pub fn transition_duration(mut self, seconds: f32) -> Self {
        self.transition.duration = seconds;
        self
    }

    pub fn max_pixel_ratio(mut self, ratio: f64) -> Self {
        self.max_pixel_ratio = ratio;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn composite_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.composite_shader = Some(path.into());
        self
    }

    /// Reject settings the render loop can't work with.
    pub fn validate(&self) -> SketchResult<()> {
        if self.matcaps.is_empty() {
            return Err(SketchError::config("at least one scene matcap is required"));
        }
        if self.layout.instances_per_scene == 0 {
            return Err(SketchError::config("scenes need at least one instance"));
        }
        if !(self.layout.shell_radius.is_finite() && self.layout.shell_radius >= 0.0) {
            return Err(SketchError::config("shell radius must be finite and >= 0"));
        }
        if self.layout.segments < 3 || self.layout.rings < 2 {
            return Err(SketchError::config("sphere needs >= 3 segments and >= 2 rings"));
        }
        if !(self.transition.duration.is_finite() && self.transition.duration > 0.0) {
            return Err(SketchError::config("transition duration must be positive"));
        }
        if !(self.max_pixel_ratio.is_finite() && self.max_pixel_ratio > 0.0) {
            return Err(SketchError::config("max pixel ratio must be positive"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(SketchError::config("window size must be non-zero"));
        }
        Ok(())
    }
}
