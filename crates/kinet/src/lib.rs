//! kinet: a tween and timeline interpolation engine.
//!
//! # Features
//!
//! - **Tweens**: interpolate any numeric attribute group of any target
//!   through a user-registered accessor, with delays, repeats, and yoyo
//! - **Timelines**: compose tweens sequentially or in parallel, nested to
//!   any depth, driven by one shared timing state machine
//! - **Signed time**: deltas may be negative; every lifecycle edge has a
//!   forward and a backward callback
//! - **Easing & paths**: the full Penner catalog and spline waypoints, from
//!   the `kinet_ease` crate
//! - **Fire and forget**: a [`TweenManager`] owns running animations, reaps
//!   them when done, and recycles instances through per-variant pools
//!
//! The engine owns no clock and performs no I/O; the caller measures time
//! and feeds deltas from its own loop:
//!
//! ```ignore
//! let mut manager = TweenManager::new();
//! register_accessor::<Sprite>(SpriteAccessor);
//!
//! Tween::to(&sprite, POSITION, 0.5)
//!     .target(&[120.0, 80.0])
//!     .ease(Easing::QuadOut)
//!     .start_in(&mut manager);
//!
//! loop {
//!     manager.update(frame_seconds);
//! }
//! ```

pub mod accessor;
pub mod animation;
pub mod error;
pub mod manager;
pub mod pool;
pub mod timeline;
pub mod timing;
pub mod tween;

pub use accessor::{register_accessor, register_animatable, Animatable, TweenAccessor};
pub use animation::Animation;
pub use error::TweenError;
pub use kinet_ease::{Easing, TweenPath};
pub use manager::TweenManager;
pub use pool::ensure_pool_capacity;
pub use timeline::{Timeline, TimelineMode};
pub use timing::{Trigger, Triggers, TweenCallback, TweenState, INFINITE};
pub use tween::{
    combined_attrs_limit, set_combined_attrs_limit, set_waypoints_limit, waypoints_limit, Tween,
};
