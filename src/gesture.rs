//! Wheel gesture interpretation.
//!
//! Trackpads and free-spinning wheels keep emitting wheel events long after
//! the user lets go. [`IntentFilter`] watches the recent stream of deltas and
//! only reports a sample when it looks like a fresh, deliberate scroll rather
//! than the decaying tail of an earlier one. [`GestureController`] ties that
//! filter to the transition guard.

use std::collections::VecDeque;
use std::time::Duration;

use winit::event::MouseScrollDelta;

use crate::config::TransitionConfig;
use crate::scene::TransitionState;

/// Wheel-delta units per scrolled line (one notch on a classic wheel).
const LINE_DELTA: f32 = 120.0;
/// Wheel-delta units per scrolled pixel.
const PIXEL_DELTA: f32 = 40.0;

/// Direction of an intentional scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Signed wheel delta: positive scrolls up, negative scrolls down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelDelta(pub f32);

impl WheelDelta {
    /// Vertical component of a winit scroll delta in wheel units.
    pub fn from_winit(delta: &MouseScrollDelta) -> Self {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => Self(*y * LINE_DELTA),
            MouseScrollDelta::PixelDelta(pos) => Self(pos.y as f32 * PIXEL_DELTA),
        }
    }
}

/// Tuning for [`IntentFilter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntentFilterConfig {
    /// Half the number of samples compared per direction.
    pub stability: usize,
    /// Minimum average magnitude of the recent half.
    pub sensitivity: f32,
    /// How much larger the recent half must be than the older half.
    pub tolerance: f32,
    /// Window during which a flat stream counts as inertia.
    pub delay: Duration,
}

impl Default for IntentFilterConfig {
    fn default() -> Self {
        Self {
            stability: 8,
            sensitivity: 100.0,
            tolerance: 1.1,
            delay: Duration::from_millis(150),
        }
    }
}

/// Inertia detector for wheel streams.
///
/// Keeps the last `2 * stability` positive and non-positive deltas in
/// separate windows plus the timestamps of the last `2 * stability` samples.
/// A sample is intentional when its window isn't full yet, or when the newer
/// half of the window is clearly stronger than the older half.
#[derive(Clone, Debug)]
pub struct IntentFilter {
    stability: usize,
    sensitivity: f32,
    tolerance: f32,
    delay: Duration,
    up: VecDeque<f32>,
    down: VecDeque<f32>,
    timestamps: VecDeque<Duration>,
}

impl Default for IntentFilter {
    fn default() -> Self {
        Self::new(IntentFilterConfig::default())
    }
}

impl IntentFilter {
    pub fn new(config: IntentFilterConfig) -> Self {
        let stability = config.stability.max(1);
        Self {
            stability,
            sensitivity: 1.0 + config.sensitivity.abs(),
            tolerance: 1.0 + config.tolerance.abs(),
            delay: config.delay,
            up: VecDeque::with_capacity(stability * 2),
            down: VecDeque::with_capacity(stability * 2),
            timestamps: VecDeque::with_capacity(stability * 2),
        }
    }

    /// Classify a wheel sample received at `now` (any monotonic clock).
    pub fn check(&mut self, delta: WheelDelta, now: Duration) -> Option<ScrollDirection> {
        let window = self.stability * 2;

        push_bounded(&mut self.timestamps, now, window);

        let direction = if delta.0 > 0.0 {
            push_bounded(&mut self.up, delta.0, window);
            ScrollDirection::Up
        } else {
            push_bounded(&mut self.down, delta.0, window);
            ScrollDirection::Down
        };

        self.is_intentional(direction, now).then_some(direction)
    }

    fn is_intentional(&self, direction: ScrollDirection, now: Duration) -> bool {
        let window = self.stability * 2;
        let deltas = match direction {
            ScrollDirection::Up => &self.up,
            ScrollDirection::Down => &self.down,
        };

        if deltas.len() < window {
            return true;
        }

        // A flat stream arriving faster than `delay` is the tail of a fling.
        if let Some(&recent) = self.timestamps.get(window - 2) {
            let flat = deltas.front() == deltas.back();
            if recent + self.delay > now && flat {
                return false;
            }
        }

        let old_avg = deltas.iter().take(self.stability).sum::<f32>() / self.stability as f32;
        let new_avg = deltas.iter().skip(self.stability).sum::<f32>() / self.stability as f32;

        old_avg.abs() < (new_avg * self.tolerance).abs() && self.sensitivity < new_avg.abs()
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, value: T, cap: usize) {
    if queue.len() == cap {
        queue.pop_front();
    }
    queue.push_back(value);
}

/// What happened to a wheel sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The intent filter classified the sample as inertia or noise.
    Filtered,
    /// Intentional, but a transition is already running.
    Dropped(ScrollDirection),
    /// Intentional; a new transition started.
    Started(ScrollDirection),
}

/// Turns wheel samples into transition triggers.
///
/// The scroll direction is reported but every accepted gesture advances to
/// the next scene.
#[derive(Clone, Debug, Default)]
pub struct GestureController {
    filter: IntentFilter,
}

impl GestureController {
    pub fn new(filter: IntentFilter) -> Self {
        Self { filter }
    }

    /// Feed one wheel sample and, if it is intentional and nothing is
    /// running yet, start a transition on `state`.
    pub fn on_wheel(
        &mut self,
        state: &mut TransitionState,
        delta: WheelDelta,
        now: Duration,
        config: &TransitionConfig,
    ) -> GestureOutcome {
        let Some(direction) = self.filter.check(delta, now) else {
            return GestureOutcome::Filtered;
        };

        if state.begin(config) {
            log::debug!("wheel {:?}: transition started", direction);
            GestureOutcome::Started(direction)
        } else {
            log::trace!("wheel {:?}: transition in progress, dropped", direction);
            GestureOutcome::Dropped(direction)
        }
    }
}
