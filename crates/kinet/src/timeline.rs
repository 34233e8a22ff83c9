//! Timeline orchestration: ordered groups of tweens played sequentially or in
//! parallel.
//!
//! A timeline is itself a tween: it has a delay, repeats, yoyo, callbacks,
//! and can nest inside another timeline. Its duration is computed at build
//! time from its children; a sequence folds each child's start offset into
//! that child's own delay, so advancing a timeline is just forwarding deltas
//! to children in the right order.
//!
//! ```ignore
//! Timeline::sequence()
//!     .push(Tween::to(&obj, POSITION, 0.5).target(&[100.0, 0.0]))
//!     .begin_parallel()
//!     .push(Tween::to(&obj, OPACITY, 0.3).target(&[0.0]))
//!     .push(Tween::to(&obj, ROTATION, 0.3).target(&[180.0]))
//!     .end()
//!     .repeat_yoyo(1, 0.2)
//!     .start_in(&mut manager);
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::Animation;
use crate::error::TweenError;
use crate::manager::TweenManager;
use crate::timing::{self, Animated, Trigger, Triggers, TweenCallback, TweenState};
use crate::tween::Tween;

/// How a timeline schedules its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimelineMode {
    /// Children play one after another.
    #[default]
    Sequence,
    /// Children all start together.
    Parallel,
}

struct Group {
    mode: TimelineMode,
    children: Vec<Animation>,
}

/// A composite tween playing an ordered list of children.
pub struct Timeline {
    pub(crate) state: TweenState,
    callback: Option<TweenCallback>,
    mode: TimelineMode,
    children: Vec<Animation>,
    open_groups: Vec<Group>,
}

impl Timeline {
    pub(crate) fn raw() -> Timeline {
        Timeline {
            state: TweenState::default(),
            callback: None,
            mode: TimelineMode::Sequence,
            children: Vec::new(),
            open_groups: Vec::new(),
        }
    }

    /// A timeline whose children play one after another.
    pub fn sequence() -> Timeline {
        let mut timeline = crate::pool::acquire_timeline();
        timeline.mode = TimelineMode::Sequence;
        timeline
    }

    /// A timeline whose children all start together.
    pub fn parallel() -> Timeline {
        let mut timeline = crate::pool::acquire_timeline();
        timeline.mode = TimelineMode::Parallel;
        timeline
    }

    // =========================================================================
    // Building
    // =========================================================================

    /// Append a child to the innermost open group.
    ///
    /// # Panics
    ///
    /// Panics if the child has already been started.
    pub fn push(mut self, child: impl Into<Animation>) -> Self {
        self.guard_not_started();
        let child = child.into();
        if child.state().is_started() {
            panic!("{}", TweenError::ChildAlreadyStarted);
        }
        self.push_node(child);
        self
    }

    /// Append a pure time beacon of the given length.
    pub fn push_pause(mut self, seconds: f64) -> Self {
        self.guard_not_started();
        self.push_node(Animation::Tween(Tween::mark().delay(seconds)));
        self
    }

    /// Open a nested sequence; close it with [`end`](Timeline::end).
    pub fn begin_sequence(mut self) -> Self {
        self.guard_not_started();
        self.open_groups.push(Group {
            mode: TimelineMode::Sequence,
            children: Vec::new(),
        });
        self
    }

    /// Open a nested parallel group; close it with [`end`](Timeline::end).
    pub fn begin_parallel(mut self) -> Self {
        self.guard_not_started();
        self.open_groups.push(Group {
            mode: TimelineMode::Parallel,
            children: Vec::new(),
        });
        self
    }

    /// Close the innermost open group.
    ///
    /// # Panics
    ///
    /// Panics if no group is open.
    pub fn end(mut self) -> Self {
        self.guard_not_started();
        let group = match self.open_groups.pop() {
            Some(group) => group,
            None => panic!("{}", TweenError::BadNesting),
        };
        let mut nested = crate::pool::acquire_timeline();
        nested.mode = group.mode;
        nested.children = group.children;
        self.push_node(Animation::Timeline(nested));
        self
    }

    fn push_node(&mut self, child: Animation) {
        match self.open_groups.last_mut() {
            Some(group) => group.children.push(child),
            None => self.children.push(child),
        }
    }

    // =========================================================================
    // Builder options
    // =========================================================================

    /// Idle time before the first iteration.
    pub fn delay(mut self, delay: f64) -> Self {
        self.guard_not_started();
        if delay < 0.0 {
            panic!("{}", TweenError::InvalidDelay(delay));
        }
        self.state.delay += delay;
        self
    }

    /// Repeat `count` additional times, with `delay` seconds between passes.
    pub fn repeat(mut self, count: i32, delay: f64) -> Self {
        self.guard_not_started();
        if delay < 0.0 {
            panic!("{}", TweenError::InvalidDelay(delay));
        }
        self.state.repeat_count = count;
        self.state.repeat_delay = delay;
        self.state.yoyo = false;
        self
    }

    /// Like [`repeat`](Timeline::repeat), but every odd pass plays backwards.
    pub fn repeat_yoyo(mut self, count: i32, delay: f64) -> Self {
        self.guard_not_started();
        if delay < 0.0 {
            panic!("{}", TweenError::InvalidDelay(delay));
        }
        self.state.repeat_count = count;
        self.state.repeat_delay = delay;
        self.state.yoyo = true;
        self
    }

    /// Lifecycle callback for the timeline itself.
    pub fn callback(mut self, callback: impl FnMut(Trigger, &mut TweenState) + 'static) -> Self {
        self.guard_not_started();
        self.callback = Some(Box::new(callback));
        self
    }

    /// Which lifecycle edges invoke the callback.
    pub fn callback_triggers(mut self, triggers: Triggers) -> Self {
        self.guard_not_started();
        self.state.triggers = triggers;
        self
    }

    /// Attach an opaque user value.
    pub fn user_data(mut self, data: impl Any) -> Self {
        self.guard_not_started();
        self.state.user_data = Some(Box::new(data));
        self
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Build and start detached; the caller feeds deltas through
    /// [`update`](Timeline::update).
    pub fn start(mut self) -> Self {
        self.start_in_place();
        self
    }

    /// Build, start, and hand ownership to `manager`.
    pub fn start_in(self, manager: &mut TweenManager) {
        manager.add(self);
    }

    /// Advance by a signed time delta, in seconds.
    pub fn update(&mut self, delta: f64) {
        timing::drive(self, delta);
    }

    /// Kill the timeline and every child, recursively.
    pub fn kill(&mut self) {
        self.state.kill();
        for child in &mut self.children {
            child.kill();
        }
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn resume(&mut self) {
        self.state.resume();
    }

    /// Return this instance and all its children to their pools.
    pub fn free(self) {
        crate::pool::release_timeline(self);
    }

    pub fn state(&self) -> &TweenState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TweenState {
        &mut self.state
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub(crate) fn children(&self) -> &[Animation] {
        &self.children
    }

    pub(crate) fn take_children(&mut self) -> Vec<Animation> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn start_in_place(&mut self) {
        self.build_checked();
        self.state.current_time = 0.0;
        self.state.started = true;
        for child in &mut self.children {
            child.start_in_place();
        }
    }

    /// Build children depth-first, then derive this timeline's duration:
    /// the sum of child full durations for a sequence (folding each child's
    /// start offset into its delay), the maximum for a parallel group.
    pub(crate) fn build_checked(&mut self) {
        if self.state.built {
            return;
        }
        if !self.open_groups.is_empty() {
            panic!("{}", TweenError::BadNesting);
        }
        self.state.duration = 0.0;
        for child in &mut self.children {
            if child.state().repeat_count() < 0 {
                panic!("{}", TweenError::InfiniteChildRepeat);
            }
            child.build();
            match self.mode {
                TimelineMode::Sequence => {
                    let offset = self.state.duration;
                    self.state.duration += child.state().full_duration();
                    child.state_mut().delay += offset;
                }
                TimelineMode::Parallel => {
                    self.state.duration = self.state.duration.max(child.state().full_duration());
                }
            }
        }
        self.state.built = true;
    }

    pub(crate) fn contains_target(
        &self,
        object: &Rc<RefCell<dyn Any>>,
        type_code: Option<i32>,
    ) -> bool {
        self.children
            .iter()
            .any(|child| child.contains_target(object, type_code))
    }

    pub(crate) fn reset(&mut self) {
        self.state.reset();
        self.callback = None;
        self.mode = TimelineMode::Sequence;
        self.children.clear();
        self.open_groups.clear();
    }

    fn guard_not_started(&self) {
        if self.state.is_started() {
            panic!("{}", TweenError::MutateAfterStart);
        }
    }

    /// Forward a delta to every child, in list order when time flows forward
    /// and in reverse order otherwise. Stops immediately if a child callback
    /// requested the death of this timeline.
    fn advance_children(&mut self, dt: f64) {
        if dt >= 0.0 {
            for child in self.children.iter_mut() {
                child.update(dt);
                if child.state().kill_parent_requested {
                    tracing::debug!("timeline killed from a child callback");
                    self.state.killed = true;
                    return;
                }
            }
        } else {
            for child in self.children.iter_mut().rev() {
                child.update(dt);
                if child.state().kill_parent_requested {
                    tracing::debug!("timeline killed from a child callback");
                    self.state.killed = true;
                    return;
                }
            }
        }
    }
}

impl Animated for Timeline {
    fn state(&self) -> &TweenState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TweenState {
        &mut self.state
    }

    fn take_callback(&mut self) -> Option<TweenCallback> {
        self.callback.take()
    }

    fn restore_callback(&mut self, callback: TweenCallback) {
        self.callback = Some(callback);
    }

    fn initialize_values(&mut self) {}

    fn update_values(&mut self, step: i32, last_step: i32, iteration_step: bool, delta: f64) {
        let reverse_last = self.state.is_reverse(last_step);
        let reverse_step = self.state.is_reverse(step);

        if !iteration_step && step > last_step {
            // a whole iteration was crossed going forward: flush children out
            // of their playable window (with margin) so each one finishes and
            // emits its callbacks
            debug_assert!(delta >= 0.0);
            let dt = if reverse_last { -delta - 1.0 } else { delta + 1.0 };
            self.advance_children(dt);
        } else if !iteration_step && step < last_step {
            // crossed going backward
            debug_assert!(delta <= 0.0);
            let dt = if reverse_last { -delta + 1.0 } else { delta - 1.0 };
            self.advance_children(dt);
        } else if step > last_step {
            // fresh iteration entered going forward: reset children to the
            // boundary the iteration plays from
            if reverse_step {
                self.force_end_values();
            } else {
                self.force_start_values();
            }
        } else if step < last_step {
            // fresh iteration entered going backward
            if reverse_step {
                self.force_start_values();
            } else {
                self.force_end_values();
            }
        } else {
            // motion inside the current iteration; a reversed pass flows the
            // children's time backwards
            debug_assert!(iteration_step);
            let dt = if reverse_step { -delta } else { delta };
            self.advance_children(dt);
        }
    }

    fn force_start_values(&mut self) {
        for child in self.children.iter_mut().rev() {
            child.force_to_start();
        }
    }

    fn force_end_values(&mut self) {
        let duration = self.state.duration;
        for child in self.children.iter_mut() {
            child.force_to_end(duration);
        }
    }
}
