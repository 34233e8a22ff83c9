//! Instance pools.
//!
//! Tweens and timelines are drawn from per-variant pools so that a
//! fire-and-forget workload does not allocate once warm: a reclaimed
//! instance keeps its buffer capacity, while `reset` clears every reference
//! (target, accessor, callback, children, user data) before reuse.
//!
//! The pools are thread-local, matching the engine's single-threaded
//! cooperative scheduling model.

use std::cell::RefCell;

use crate::animation::Animation;
use crate::timeline::Timeline;
use crate::tween::Tween;

thread_local! {
    static TWEENS: RefCell<Vec<Tween>> = const { RefCell::new(Vec::new()) };
    static TIMELINES: RefCell<Vec<Timeline>> = const { RefCell::new(Vec::new()) };
}

/// Pre-fill both pools up to `capacity` idle instances each.
pub fn ensure_pool_capacity(capacity: usize) {
    TWEENS.with(|pool| {
        let mut pool = pool.borrow_mut();
        while pool.len() < capacity {
            pool.push(Tween::raw());
        }
    });
    TIMELINES.with(|pool| {
        let mut pool = pool.borrow_mut();
        while pool.len() < capacity {
            pool.push(Timeline::raw());
        }
    });
}

/// Idle tween instances currently pooled.
pub fn pooled_tweens() -> usize {
    TWEENS.with(|pool| pool.borrow().len())
}

/// Idle timeline instances currently pooled.
pub fn pooled_timelines() -> usize {
    TIMELINES.with(|pool| pool.borrow().len())
}

pub(crate) fn acquire_tween() -> Tween {
    TWEENS
        .with(|pool| pool.borrow_mut().pop())
        .unwrap_or_else(Tween::raw)
}

pub(crate) fn acquire_timeline() -> Timeline {
    TIMELINES
        .with(|pool| pool.borrow_mut().pop())
        .unwrap_or_else(Timeline::raw)
}

pub(crate) fn release_tween(mut tween: Tween) {
    tween.reset();
    TWEENS.with(|pool| pool.borrow_mut().push(tween));
}

pub(crate) fn release_timeline(mut timeline: Timeline) {
    // children go back to their own pools first
    for child in timeline.take_children() {
        release_animation(child);
    }
    timeline.reset();
    TIMELINES.with(|pool| pool.borrow_mut().push(timeline));
}

pub(crate) fn release_animation(animation: Animation) {
    match animation {
        Animation::Tween(tween) => release_tween(tween),
        Animation::Timeline(timeline) => release_timeline(timeline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_pool_capacity() {
        ensure_pool_capacity(4);
        assert!(pooled_tweens() >= 4);
        assert!(pooled_timelines() >= 4);
    }

    #[test]
    fn test_released_instances_come_back_clean() {
        let tween = Tween::mark().delay(3.0);
        tween.free();

        let reused = acquire_tween();
        assert_eq!(reused.state().delay(), 0.0);
        assert!(!reused.state().is_started());
        reused.free();
    }

    #[test]
    fn test_releasing_a_timeline_reclaims_children() {
        let timeline = Timeline::sequence()
            .push(Tween::mark())
            .push(Tween::mark());

        let tweens_before = pooled_tweens();
        let timelines_before = pooled_timelines();
        timeline.free();

        assert_eq!(pooled_tweens(), tweens_before + 2);
        assert_eq!(pooled_timelines(), timelines_before + 1);
    }
}
