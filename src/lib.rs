//! # Scenefade
//!
//! **Scroll-driven crossfades between off-screen particle scenes.**
//!
//! A fixed pool of scenes (clouds of matcap-shaded spheres) is rendered into
//! one off-screen target each. A full-screen compositor blends the current
//! scene into the next, driven by an eased tween that starts when the mouse
//! wheel moves with intent.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scenefade::*;
//!
//! fn main() -> SketchResult<()> {
//!     let config = AppConfig::new()
//!         .title("Scenes")
//!         .matcaps(vec![MatcapSource::red(), MatcapSource::file("matcap.png")])
//!         .transition_duration(2.0);
//!     run(config)
//! }
//! ```
//!
//! ## Layout
//!
//! - [`scene`], [`gesture`] and [`frame`] are pure state: they decide what a
//!   frame shows and never touch the GPU, so they test without a window.
//! - [`render`] turns a [`FramePlan`] into GPU work.
//! - [`run`] wires both halves to a winit event loop.

mod app;
mod camera;
mod color;
mod config;
mod error;
pub mod frame;
pub mod gesture;
mod gpu;
mod hot_shader;
mod mesh;
pub mod render;
pub mod scene;
mod texture;

pub use app::run;
pub use camera::{CameraRig, OrthoCamera, PerspectiveCamera, Viewport};
pub use color::Color;
pub use config::{AppConfig, MatcapSource, SceneLayout, TransitionConfig};
pub use error::{SketchError, SketchResult};
pub use frame::{CompositeParams, FrameClock, FrameLoop, FramePlan, FrameTime, ScenePassPlan};
pub use gesture::{
    GestureController, GestureOutcome, IntentFilter, IntentFilterConfig, ScrollDirection,
    WheelDelta,
};
pub use gpu::GpuContext;
pub use hot_shader::HotShader;
pub use mesh::{InstanceRaw, Mesh, SphereGeometry, Vertex3d};
pub use scene::{Easing, Scene, ScenePool, TransitionState, Tween};
pub use texture::Texture;
