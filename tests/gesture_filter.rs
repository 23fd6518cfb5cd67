use std::time::Duration;

use scenefade::{
    FrameLoop, FrameTime, GestureController, GestureOutcome, IntentFilter, IntentFilterConfig,
    TransitionConfig, TransitionState, WheelDelta,
};

const FRAME_MS: u64 = 16;

/// One wheel sample per frame, frames stepped in between, the way the event
/// loop interleaves them.
fn play(deltas: impl IntoIterator<Item = f32>) -> (TransitionState, Vec<GestureOutcome>) {
    let transition = TransitionConfig::default();
    let frames = FrameLoop::new(3, 0.1);
    let mut gestures = GestureController::default();
    let mut state = TransitionState::new();
    let mut outcomes = Vec::new();

    let dt = FRAME_MS as f32 / 1000.0;
    for (i, delta) in deltas.into_iter().enumerate() {
        let now = Duration::from_millis(i as u64 * FRAME_MS);
        outcomes.push(gestures.on_wheel(&mut state, WheelDelta(delta), now, &transition));

        let (next, _) = frames.step(
            state,
            FrameTime {
                elapsed: now.as_secs_f32(),
                delta: dt,
            },
        );
        state = next;
    }
    (state, outcomes)
}

#[test]
fn trackpad_fling_advances_exactly_once() {
    // 2.4 s of exponentially decaying inertia, longer than a transition.
    let (state, outcomes) = play((0..150).map(|i| -2000.0 * 0.9f32.powi(i)));

    let started = outcomes
        .iter()
        .filter(|o| matches!(o, GestureOutcome::Started(_)))
        .count();
    assert_eq!(started, 1);
    assert!(matches!(outcomes[0], GestureOutcome::Started(_)));
    assert_eq!(state.current_index, 1);
    assert!(!state.transitioning);
}

#[test]
fn swipe_after_the_fling_settles_advances_again() {
    let fling = (0..150).map(|i| -2000.0 * 0.9f32.powi(i));
    let swipe = std::iter::repeat_n(-1500.0, 4);
    let (state, outcomes) = play(fling.chain(swipe));

    let started = outcomes
        .iter()
        .filter(|o| matches!(o, GestureOutcome::Started(_)))
        .count();
    assert_eq!(started, 2);
    assert!(matches!(outcomes[150], GestureOutcome::Started(_)));
    assert!(state.transitioning);
}

#[test]
fn custom_filter_without_history_accepts_every_sample() {
    let mut filter = IntentFilter::new(IntentFilterConfig {
        stability: 64,
        ..IntentFilterConfig::default()
    });
    for i in 0..100u64 {
        assert!(
            filter
                .check(WheelDelta(-300.0), Duration::from_millis(i * FRAME_MS))
                .is_some()
        );
    }
}
