use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::{CameraRig, Viewport};
use crate::config::{AppConfig, TransitionConfig};
use crate::error::{SketchError, SketchResult};
use crate::frame::{FrameClock, FrameLoop};
use crate::gesture::{GestureController, GestureOutcome, WheelDelta};
use crate::gpu::GpuContext;
use crate::render::Renderer;
use crate::scene::{ScenePool, TransitionState};

/// Open the window and run the sketch until it is closed.
///
/// Scenes are generated before the event loop starts, so configuration
/// problems surface without opening a window.
///
/// # Example
/// ```no_run
/// use scenefade::AppConfig;
///
/// scenefade::run(AppConfig::new().title("Particles").seed(7)).unwrap();
/// ```
pub fn run(config: AppConfig) -> SketchResult<()> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
    log::info!(
        "generating {} scenes x {} instances (seed {seed})",
        config.matcaps.len(),
        config.layout.instances_per_scene
    );
    let mut rng = fastrand::Rng::with_seed(seed);
    let pool = ScenePool::generate(&config.matcaps, &config.layout, &mut rng)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SketchApp::Pending {
        config: Box::new(config),
        pool,
    };
    event_loop.run_app(&mut app)?;

    match app {
        SketchApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum SketchApp {
    Pending {
        config: Box<AppConfig>,
        pool: ScenePool,
    },
    Running(Box<Sketch>),
    Failed(SketchError),
    Exited,
}

/// Everything alive while the window is open.
struct Sketch {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    pool: ScenePool,
    cameras: CameraRig,
    viewport: Viewport,
    frames: FrameLoop,
    state: TransitionState,
    gestures: GestureController,
    transition: TransitionConfig,
    clock: FrameClock,
}

impl Sketch {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig, pool: ScenePool) -> SketchResult<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let size = window.inner_size();
        let viewport = Viewport::new(
            size.width,
            size.height,
            window.scale_factor(),
            config.max_pixel_ratio,
        );
        log::info!(
            "window {}x{}, pixel ratio {:.2}",
            size.width,
            size.height,
            viewport.pixel_ratio()
        );

        let gpu = GpuContext::new(window.clone(), size.width, size.height)?;
        let renderer = Renderer::new(
            &gpu,
            &pool,
            &config.layout,
            viewport.render_size(),
            config.composite_shader.as_deref(),
        )?;

        let frames = FrameLoop::new(pool.len(), config.layout.angular_rate);

        Ok(Self {
            window,
            gpu,
            renderer,
            pool,
            cameras: CameraRig::new(size.width, size.height),
            viewport,
            frames,
            state: TransitionState::new(),
            gestures: GestureController::default(),
            transition: config.transition,
            clock: FrameClock::new(),
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.viewport.resize(size.width, size.height);
        if self.viewport.is_zero_sized() {
            return;
        }
        self.gpu.resize(size.width, size.height);
        self.cameras.resize(size.width, size.height);
        let (w, h) = self.viewport.render_size();
        log::debug!(
            "resized to {}x{} (scene targets {w}x{h})",
            size.width,
            size.height
        );
    }

    fn wheel(&mut self, delta: WheelDelta) {
        let now = self.clock.since_start();
        let outcome = self
            .gestures
            .on_wheel(&mut self.state, delta, now, &self.transition);
        if let GestureOutcome::Started(direction) = outcome {
            log::info!(
                "scroll {:?}: crossfading scene {} -> {}",
                direction,
                self.state.current_index,
                self.state.next_index(self.frames.scene_count())
            );
        }
    }

    fn redraw(&mut self) -> SketchResult<()> {
        let time = self.clock.tick();
        let (state, plan) = self.frames.step(self.state, time);
        self.state = state;

        if let Some(index) = plan.completed {
            log::info!("transition complete, showing scene {index}");
        }

        let [current, next] = plan.passes;
        self.pool
            .set_rotation(&[current.scene, next.scene], plan.rotation_y);

        if self.viewport.is_zero_sized() {
            return Ok(());
        }

        match self.renderer.render(
            &self.gpu,
            &self.pool,
            &self.cameras,
            &plan,
            self.viewport.render_size(),
        ) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                Ok(())
            }
            Err(err @ wgpu::SurfaceError::OutOfMemory) => Err(err.into()),
            Err(err) => {
                log::warn!("surface error ({err}), skipping frame");
                Ok(())
            }
        }
    }
}

impl SketchApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SketchError) {
        log::error!("{err}");
        *self = SketchApp::Failed(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for SketchApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self, SketchApp::Pending { .. }) {
            return;
        }
        let SketchApp::Pending { config, pool } = std::mem::replace(self, SketchApp::Exited) else {
            return;
        };

        match Sketch::new(event_loop, &config, pool) {
            Ok(sketch) => {
                sketch.window.request_redraw();
                *self = SketchApp::Running(Box::new(sketch));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let SketchApp::Running(sketch) = self else {
            return;
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::info!("exiting");
                *self = SketchApp::Exited;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                sketch.resize(size);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                sketch.viewport.set_scale_factor(scale_factor);
                let size = sketch.window.inner_size();
                sketch.resize(size);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                sketch.wheel(WheelDelta::from_winit(&delta));
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = sketch.redraw() {
                    self.fail(event_loop, err);
                    return;
                }
                sketch.window.request_redraw();
            }
            _ => {}
        }
    }
}
