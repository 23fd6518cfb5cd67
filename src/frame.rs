//! The per-frame step.
//!
//! [`FrameLoop::step`] is pure: it takes the transition state and the frame
//! timing and returns the next state together with a [`FramePlan`] that tells
//! the renderer which scenes go into which targets and how to composite them.
//! The window host reads the clock, calls `step`, hands the plan to the GPU
//! and asks for the next redraw.

use std::time::Instant;

use crate::scene::TransitionState;

/// Timing for one frame, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the loop started.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
}

/// Wall-clock source for [`FrameTime`].
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Timing for the frame starting now. Advances the clock.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        FrameTime {
            elapsed: now.duration_since(self.start).as_secs_f32(),
            delta,
        }
    }

    /// Time since the clock was created, for timestamping input.
    pub fn since_start(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one scene into one off-screen target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScenePassPlan {
    pub scene: usize,
    pub target: usize,
}

/// Inputs of the compositor for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeParams {
    /// Seconds since start, for animated shaders.
    pub time: f32,
    /// Blend from `from_target` (0.0) to `to_target` (1.0).
    pub progress: f32,
    pub from_target: usize,
    pub to_target: usize,
}

/// Everything the renderer needs to draw one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlan {
    /// Current scene first, then the next one.
    pub passes: [ScenePassPlan; 2],
    /// Y rotation applied to both scenes before they render.
    pub rotation_y: f32,
    pub composite: CompositeParams,
    /// Set when a transition completed during this step: the new current
    /// index.
    pub completed: Option<usize>,
}

/// Per-frame driver for a fixed number of scenes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLoop {
    scene_count: usize,
    angular_rate: f32,
}

impl FrameLoop {
    /// `scene_count` is clamped to at least one.
    pub fn new(scene_count: usize, angular_rate: f32) -> Self {
        Self {
            scene_count: scene_count.max(1),
            angular_rate,
        }
    }

    pub fn scene_count(&self) -> usize {
        self.scene_count
    }

    /// Advance `state` by one frame and describe what to draw.
    ///
    /// The running tween (if any) is advanced by `time.delta` first, so a
    /// transition that completes in this step already renders with the new
    /// current scene and `progress == 0`.
    pub fn step(&self, mut state: TransitionState, time: FrameTime) -> (TransitionState, FramePlan) {
        let completed = state.advance(time.delta, self.scene_count);

        let current = state.current_index % self.scene_count;
        let next = state.next_index(self.scene_count);

        let plan = FramePlan {
            passes: [
                ScenePassPlan {
                    scene: current,
                    target: current,
                },
                ScenePassPlan {
                    scene: next,
                    target: next,
                },
            ],
            rotation_y: time.elapsed * self.angular_rate,
            composite: CompositeParams {
                time: time.elapsed,
                progress: state.progress,
                from_target: current,
                to_target: next,
            },
            completed,
        };

        (state, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransitionConfig;

    fn frame(elapsed: f32, delta: f32) -> FrameTime {
        FrameTime { elapsed, delta }
    }

    #[test]
    fn idle_frame_renders_current_and_next() {
        let frames = FrameLoop::new(3, 0.1);
        let (state, plan) = frames.step(TransitionState::new(), frame(2.0, 0.016));

        assert_eq!(state, TransitionState::new());
        assert_eq!(plan.passes[0], ScenePassPlan { scene: 0, target: 0 });
        assert_eq!(plan.passes[1], ScenePassPlan { scene: 1, target: 1 });
        assert_eq!(plan.composite.progress, 0.0);
        assert_eq!((plan.composite.from_target, plan.composite.to_target), (0, 1));
        assert!((plan.rotation_y - 0.2).abs() < 1e-6);
        assert_eq!(plan.completed, None);
    }

    #[test]
    fn last_scene_blends_into_first() {
        let frames = FrameLoop::new(3, 0.1);
        let mut state = TransitionState::new();
        state.current_index = 2;
        let (_, plan) = frames.step(state, frame(0.0, 0.0));
        assert_eq!(plan.passes[1].scene, 0);
        assert_eq!(plan.composite.to_target, 0);
    }

    #[test]
    fn completing_step_renders_the_new_scene() {
        let frames = FrameLoop::new(3, 0.1);
        let mut state = TransitionState::new();
        state.begin(&TransitionConfig::default());

        let (state, plan) = frames.step(state, frame(2.0, 2.0));
        assert_eq!(plan.completed, Some(1));
        assert_eq!(state.current_index, 1);
        assert!(!state.transitioning);
        assert_eq!(plan.composite.progress, 0.0);
        assert_eq!(plan.passes[0].scene, 1);
        assert_eq!(plan.passes[1].scene, 2);
    }

    #[test]
    fn progress_rises_during_transition() {
        let frames = FrameLoop::new(3, 0.1);
        let mut state = TransitionState::new();
        state.begin(&TransitionConfig::default());

        let mut last = 0.0;
        let mut elapsed = 0.0;
        for _ in 0..80 {
            elapsed += 0.016;
            let (next, plan) = frames.step(state, frame(elapsed, 0.016));
            state = next;
            if plan.completed.is_some() {
                break;
            }
            assert!(plan.composite.progress >= last);
            last = plan.composite.progress;
        }
        assert!(last > 0.9);
    }

    #[test]
    fn single_scene_blends_into_itself() {
        let frames = FrameLoop::new(1, 0.1);
        let (_, plan) = frames.step(TransitionState::new(), frame(0.0, 0.0));
        assert_eq!(plan.passes[0].scene, 0);
        assert_eq!(plan.passes[1].scene, 0);
    }

    #[test]
    fn clock_elapsed_is_monotonic() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert!(b.elapsed >= a.elapsed);
        assert!(a.delta >= 0.0 && b.delta >= 0.0);
    }
}
