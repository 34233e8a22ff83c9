//! The ownership wrapper unifying leaf tweens and timelines.
//!
//! Manager roots and timeline children are `Animation` values: ownership is
//! exclusive and by value, so a timeline frees its whole subtree when it is
//! reclaimed, and cycles are impossible by construction.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::timeline::Timeline;
use crate::timing::{self, TweenState};
use crate::tween::Tween;

/// Either a leaf [`Tween`] or a composite [`Timeline`].
pub enum Animation {
    Tween(Tween),
    Timeline(Timeline),
}

impl From<Tween> for Animation {
    fn from(tween: Tween) -> Self {
        Animation::Tween(tween)
    }
}

impl From<Timeline> for Animation {
    fn from(timeline: Timeline) -> Self {
        Animation::Timeline(timeline)
    }
}

impl Animation {
    /// Advance by a signed time delta, in seconds.
    pub fn update(&mut self, delta: f64) {
        match self {
            Animation::Tween(tween) => tween.update(delta),
            Animation::Timeline(timeline) => timeline.update(delta),
        }
    }

    /// Kill this animation; for a timeline, the whole subtree.
    pub fn kill(&mut self) {
        match self {
            Animation::Tween(tween) => tween.kill(),
            Animation::Timeline(timeline) => timeline.kill(),
        }
    }

    pub fn state(&self) -> &TweenState {
        match self {
            Animation::Tween(tween) => tween.state(),
            Animation::Timeline(timeline) => timeline.state(),
        }
    }

    pub fn state_mut(&mut self) -> &mut TweenState {
        match self {
            Animation::Tween(tween) => tween.state_mut(),
            Animation::Timeline(timeline) => timeline.state_mut(),
        }
    }

    pub fn is_tween(&self) -> bool {
        matches!(self, Animation::Tween(_))
    }

    pub fn is_timeline(&self) -> bool {
        matches!(self, Animation::Timeline(_))
    }

    /// Return this animation (and any children) to the instance pools.
    pub fn free(self) {
        crate::pool::release_animation(self);
    }

    pub(crate) fn build(&mut self) {
        match self {
            Animation::Tween(tween) => tween.build_checked(),
            Animation::Timeline(timeline) => timeline.build_checked(),
        }
    }

    pub(crate) fn start_in_place(&mut self) {
        match self {
            Animation::Tween(tween) => tween.start_in_place(),
            Animation::Timeline(timeline) => timeline.start_in_place(),
        }
    }

    pub(crate) fn force_to_start(&mut self) {
        match self {
            Animation::Tween(tween) => timing::force_to_start(tween),
            Animation::Timeline(timeline) => timing::force_to_start(timeline),
        }
    }

    pub(crate) fn force_to_end(&mut self, time: f64) {
        match self {
            Animation::Tween(tween) => timing::force_to_end(tween, time),
            Animation::Timeline(timeline) => timing::force_to_end(timeline, time),
        }
    }

    pub(crate) fn contains_target(
        &self,
        object: &Rc<RefCell<dyn Any>>,
        type_code: Option<i32>,
    ) -> bool {
        match self {
            Animation::Tween(tween) => tween.contains_target(object, type_code),
            Animation::Timeline(timeline) => timeline.contains_target(object, type_code),
        }
    }

    /// Unfinished leaf tweens in this subtree.
    pub(crate) fn running_tweens(&self) -> usize {
        match self {
            Animation::Tween(tween) => (!tween.state().is_finished()) as usize,
            Animation::Timeline(timeline) => timeline
                .children()
                .iter()
                .map(Animation::running_tweens)
                .sum(),
        }
    }

    /// Unfinished timelines in this subtree.
    pub(crate) fn running_timelines(&self) -> usize {
        match self {
            Animation::Tween(_) => 0,
            Animation::Timeline(timeline) => {
                (!timeline.state().is_finished()) as usize
                    + timeline
                        .children()
                        .iter()
                        .map(Animation::running_timelines)
                        .sum::<usize>()
            }
        }
    }
}
