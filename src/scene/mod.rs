//! Scenes and the transition cycle between them.
//!
//! A sketch owns a fixed [`ScenePool`] built at startup. Exactly one scene is
//! "current"; a crossfade blends it into the next one and, once the blend
//! completes, the next scene becomes current.
//!
//! # Overview
//!
//! - [`ScenePool`] / [`Scene`]: particle clouds sharing a sphere mesh, one
//!   matcap per scene.
//! - [`TransitionState`]: current index, blend progress and the running
//!   [`Tween`], passed by value through the frame loop.
//! - [`Easing`]: curves available to the tween.
//!
//! # Example
//!
//! ```
//! use scenefade::{AppConfig, ScenePool, TransitionState};
//!
//! let config = AppConfig::default();
//! let mut rng = fastrand::Rng::with_seed(42);
//! let pool = ScenePool::generate(&config.matcaps, &config.layout, &mut rng).unwrap();
//!
//! let mut state = TransitionState::new();
//! state.begin(&config.transition);
//! state.advance(config.transition.duration, pool.len());
//! assert_eq!(state.current_index, 1);
//! ```

mod pool;
mod transition;

pub use pool::{Scene, ScenePool, random_direction};
pub use transition::{Easing, TransitionState, Tween};
