//! Error type shared by setup and rendering.

/// Errors raised while setting up or driving the sketch.
///
/// Most of the per-frame path degrades silently (a missing matcap falls back
/// to a procedural one, a lost surface is reconfigured), so these only surface
/// from setup and from unrecoverable surface failures.
#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface texture unavailable: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SketchError {
    pub fn config<T: ToString>(msg: T) -> Self {
        SketchError::Config(msg.to_string())
    }
}

/// Result alias used throughout the crate.
pub type SketchResult<T> = Result<T, SketchError>;
