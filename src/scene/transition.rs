//! Transition state, tweens and easing functions for scene crossfades.

use crate::config::TransitionConfig;

/// Easing functions for smooth transitions.
///
/// These control the acceleration curve of transition animations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Start slow, accelerate.
    EaseIn,
    /// Start fast, decelerate.
    EaseOut,
    /// Start slow, speed up, then slow down.
    EaseInOut,
    /// Quintic in-out: a long, soft start and a long, soft landing.
    Power4InOut,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::Power4InOut => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
        }
    }
}

/// A scalar animated from `from` to `to` over `duration` seconds.
///
/// Tweens are advanced explicitly with [`Tween::advance`]; nothing runs in
/// the background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance by `dt` seconds. Returns `true` once the tween has finished.
    ///
    /// Negative deltas are ignored so the value never runs backwards.
    pub fn advance(&mut self, dt: f32) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.is_finished()
    }

    /// Linear progress through the tween (0.0 to 1.0).
    pub fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Current eased value.
    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.easing.apply(self.ratio())
    }

    pub fn is_finished(&self) -> bool {
        self.ratio() >= 1.0
    }
}

/// Where the scene cycle currently stands.
///
/// This is a plain value: the frame loop takes one in and hands a new one
/// back, and gesture handling mutates it between frames. Only one crossfade
/// runs at a time; while `transitioning` is set, [`TransitionState::begin`]
/// is a no-op.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionState {
    /// Scene shown when `progress == 0`.
    pub current_index: usize,
    /// Blend toward the next scene, 0.0 to 1.0.
    pub progress: f32,
    /// Set from gesture acceptance until the tween completes.
    pub transitioning: bool,
    tween: Option<Tween>,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionState {
    pub fn new() -> Self {
        Self {
            current_index: 0,
            progress: 0.0,
            transitioning: false,
            tween: None,
        }
    }

    /// Scene that the current one blends into.
    pub fn next_index(&self, scene_count: usize) -> usize {
        (self.current_index + 1) % scene_count.max(1)
    }

    /// The running progress tween, if any.
    pub fn tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    /// Start a crossfade toward the next scene.
    ///
    /// Returns `false` (and leaves the state untouched) if a crossfade is
    /// already running.
    pub fn begin(&mut self, config: &TransitionConfig) -> bool {
        if self.transitioning {
            return false;
        }
        self.transitioning = true;
        self.tween = Some(Tween::new(
            self.progress,
            1.0,
            config.duration,
            config.easing,
        ));
        true
    }

    /// Advance the running tween by `dt` seconds.
    ///
    /// When the tween finishes the cycle moves on: `current_index` advances
    /// modulo `scene_count`, `progress` drops back to exactly 0 and
    /// `transitioning` clears. Returns the new index in that case.
    pub fn advance(&mut self, dt: f32, scene_count: usize) -> Option<usize> {
        let tween = self.tween.as_mut()?;
        let finished = tween.advance(dt);
        self.progress = tween.value();

        if !finished {
            return None;
        }

        self.tween = None;
        self.transitioning = false;
        self.progress = 0.0;
        self.current_index = self.next_index(scene_count);
        Some(self.current_index)
    }
}
