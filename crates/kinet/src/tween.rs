//! The leaf tween: one interpolation of one attribute group of one target.
//!
//! A tween is created through its factories (`to`, `from`, `set_to`, `call`,
//! `mark`), configured through chained builder options, and then either
//! started detached (the caller feeds it deltas) or handed to a
//! [`TweenManager`](crate::manager::TweenManager).
//!
//! ```ignore
//! Tween::to(&particle, POSITION, 0.5)
//!     .target(&[120.0, 80.0])
//!     .ease(Easing::QuadOut)
//!     .start_in(&mut manager);
//! ```

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kinet_ease::{Easing, TweenPath};
use smallvec::{smallvec, SmallVec};

use crate::accessor::{self, ErasedAccessor};
use crate::error::TweenError;
use crate::manager::TweenManager;
use crate::timing::{
    self, Animated, Trigger, Triggers, TweenCallback, TweenState, EPS,
};

/// Inline buffer sized for the default combined-attributes limit.
type Values = SmallVec<[f64; 3]>;

thread_local! {
    static COMBINED_ATTRS_LIMIT: Cell<usize> = const { Cell::new(3) };
    static WAYPOINTS_LIMIT: Cell<usize> = const { Cell::new(0) };
}

/// Raise or lower the maximum number of interpolated components per tween.
/// Defaults to 3; change it before creating tweens that need more.
pub fn set_combined_attrs_limit(limit: usize) {
    COMBINED_ATTRS_LIMIT.with(|cell| cell.set(limit));
}

/// Current combined-attributes cap.
pub fn combined_attrs_limit() -> usize {
    COMBINED_ATTRS_LIMIT.with(Cell::get)
}

/// Raise or lower the maximum number of waypoints per tween. Defaults to 0.
pub fn set_waypoints_limit(limit: usize) {
    WAYPOINTS_LIMIT.with(|cell| cell.set(limit));
}

/// Current waypoints cap.
pub fn waypoints_limit() -> usize {
    WAYPOINTS_LIMIT.with(Cell::get)
}

struct TargetRef {
    object: Rc<RefCell<dyn Any>>,
    type_id: TypeId,
    type_name: &'static str,
}

/// A single interpolation of one attribute group over time.
pub struct Tween {
    pub(crate) state: TweenState,
    callback: Option<TweenCallback>,
    target: Option<TargetRef>,
    accessor: Option<Rc<dyn ErasedAccessor>>,
    type_code: i32,
    ease: Option<Easing>,
    path: Option<TweenPath>,
    is_from: bool,
    is_relative: bool,
    attr_count: usize,
    start_values: Values,
    target_values: Values,
    value_buffer: Values,
    waypoints: Vec<Values>,
    path_buffer: Vec<f64>,
}

impl Tween {
    pub(crate) fn raw() -> Tween {
        Tween {
            state: TweenState::default(),
            callback: None,
            target: None,
            accessor: None,
            type_code: 0,
            ease: None,
            path: None,
            is_from: false,
            is_relative: false,
            attr_count: 0,
            start_values: Values::new(),
            target_values: Values::new(),
            value_buffer: Values::new(),
            waypoints: Vec::new(),
            path_buffer: Vec::new(),
        }
    }

    // =========================================================================
    // Factories
    // =========================================================================

    /// Interpolate `target`'s attribute group `type_code` from its current
    /// values to the declared target values, over `duration` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `duration` is negative.
    pub fn to<T: 'static>(target: &Rc<RefCell<T>>, type_code: i32, duration: f64) -> Tween {
        Tween::animate(target, type_code, duration, false)
    }

    /// Like [`to`](Tween::to), but runs backwards: the declared values become
    /// the starting point and the target's current values the destination.
    pub fn from<T: 'static>(target: &Rc<RefCell<T>>, type_code: i32, duration: f64) -> Tween {
        Tween::animate(target, type_code, duration, true)
    }

    /// Instantly apply the declared target values (a zero-duration tween).
    pub fn set_to<T: 'static>(target: &Rc<RefCell<T>>, type_code: i32) -> Tween {
        Tween::animate(target, type_code, 0.0, false)
    }

    /// A target-less timer that fires `callback` on START, after any delay.
    pub fn call(callback: impl FnMut(Trigger, &mut TweenState) + 'static) -> Tween {
        let mut tween = crate::pool::acquire_tween();
        tween.callback = Some(Box::new(callback));
        tween.state.triggers = Triggers::START;
        tween
    }

    /// A pure time beacon: no target, no callback. Useful as a timeline
    /// spacer.
    pub fn mark() -> Tween {
        crate::pool::acquire_tween()
    }

    fn animate<T: 'static>(
        target: &Rc<RefCell<T>>,
        type_code: i32,
        duration: f64,
        is_from: bool,
    ) -> Tween {
        if duration < 0.0 {
            panic!("{}", TweenError::InvalidDuration(duration));
        }
        let mut tween = crate::pool::acquire_tween();
        tween.state.duration = duration;
        tween.target = Some(TargetRef {
            object: Rc::clone(target) as Rc<RefCell<dyn Any>>,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        });
        tween.type_code = type_code;
        tween.is_from = is_from;
        tween.ease = Some(Easing::QuadInOut);
        tween.path = Some(TweenPath::CatmullRom);
        tween
    }

    // =========================================================================
    // Builder options
    // =========================================================================

    /// Easing equation shaping the interpolation. Defaults to `QuadInOut`.
    pub fn ease(mut self, easing: Easing) -> Self {
        self.guard_not_started();
        self.ease = Some(easing);
        self
    }

    /// Curve to travel along when waypoints are present. Defaults to
    /// Catmull-Rom.
    pub fn path(mut self, path: TweenPath) -> Self {
        self.guard_not_started();
        self.path = Some(path);
        self
    }

    /// Idle time before the first iteration.
    pub fn delay(mut self, delay: f64) -> Self {
        self.guard_not_started();
        if delay < 0.0 {
            panic!("{}", TweenError::InvalidDelay(delay));
        }
        self.state.delay += delay;
        self
    }

    /// Repeat `count` additional times ([`INFINITE`](crate::INFINITE) for
    /// endless), with `delay` seconds between iterations.
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

    /// Like [`repeat`](Tween::repeat), but every odd iteration plays
    /// backwards.
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

    /// Destination values, one per component of the attribute group.
    pub fn target(mut self, values: &[f64]) -> Self {
        self.guard_not_started();
        self.check_attrs(values.len());
        self.target_values = Values::from_slice(values);
        self.is_relative = false;
        self
    }

    /// Destination values relative to the values sampled at start time.
    pub fn target_relative(mut self, values: &[f64]) -> Self {
        self.guard_not_started();
        self.check_attrs(values.len());
        self.target_values = Values::from_slice(values);
        self.is_relative = true;
        self
    }

    /// Add an intermediate waypoint the interpolation passes through. All
    /// components are copied.
    ///
    /// # Panics
    ///
    /// Panics if the waypoints cap is exceeded; raise it with
    /// [`set_waypoints_limit`] first.
    pub fn waypoint(mut self, values: &[f64]) -> Self {
        self.guard_not_started();
        self.check_attrs(values.len());
        let limit = waypoints_limit();
        if self.waypoints.len() + 1 > limit {
            panic!(
                "{}",
                TweenError::WaypointsOverflow {
                    given: self.waypoints.len() + 1,
                    limit,
                }
            );
        }
        self.waypoints.push(Values::from_slice(values));
        self
    }

    /// Lifecycle callback; subscribe to edges with
    /// [`callback_triggers`](Tween::callback_triggers) (COMPLETE only by
    /// default).
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

    /// Attach an opaque user value, retrievable from callbacks through
    /// [`TweenState::user_data`].
    pub fn user_data(mut self, data: impl Any) -> Self {
        self.guard_not_started();
        self.state.user_data = Some(Box::new(data));
        self
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Build and start detached; the caller feeds deltas through
    /// [`update`](Tween::update).
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

    pub fn kill(&mut self) {
        self.state.kill();
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn resume(&mut self) {
        self.state.resume();
    }

    /// Return this instance to the pool. Managed tweens are freed
    /// automatically when reaped.
    pub fn free(self) {
        crate::pool::release_tween(self);
    }

    pub fn state(&self) -> &TweenState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TweenState {
        &mut self.state
    }

    /// The attribute group this tween animates.
    pub fn type_code(&self) -> i32 {
        self.type_code
    }

    pub(crate) fn start_in_place(&mut self) {
        self.build_checked();
        self.state.current_time = 0.0;
        self.state.started = true;
    }

    /// Resolve the accessor and size the value buffers. Start values are not
    /// sampled here; that happens on the first entry into the first
    /// iteration.
    pub(crate) fn build_checked(&mut self) {
        if self.state.built {
            return;
        }
        if let Some(target) = &self.target {
            let accessor = match accessor::lookup(target.type_id) {
                Some(accessor) => accessor,
                None => panic!("{}", TweenError::NoAccessor(target.type_name)),
            };
            let limit = combined_attrs_limit();
            let mut probe: Values = smallvec![0.0; limit];
            let count = accessor.get_values(&*target.object.borrow(), self.type_code, &mut probe);
            if count > limit {
                panic!(
                    "{}",
                    TweenError::CombinedAttrsOverflow {
                        given: count,
                        limit,
                    }
                );
            }
            self.attr_count = count;
            self.start_values.resize(count, 0.0);
            self.target_values.resize(count, 0.0);
            self.value_buffer.resize(count, 0.0);
            for waypoint in &mut self.waypoints {
                waypoint.resize(count, 0.0);
            }
            self.path_buffer = Vec::with_capacity(self.waypoints.len() + 2);
            self.accessor = Some(accessor);
        }
        self.state.built = true;
    }

    pub(crate) fn contains_target(
        &self,
        object: &Rc<RefCell<dyn Any>>,
        type_code: Option<i32>,
    ) -> bool {
        match &self.target {
            Some(target) => {
                same_object(&target.object, object)
                    && type_code.map_or(true, |code| code == self.type_code)
            }
            None => false,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state.reset();
        self.callback = None;
        self.target = None;
        self.accessor = None;
        self.type_code = 0;
        self.ease = None;
        self.path = None;
        self.is_from = false;
        self.is_relative = false;
        self.attr_count = 0;
        self.start_values.clear();
        self.target_values.clear();
        self.value_buffer.clear();
        self.waypoints.clear();
        self.path_buffer = Vec::new();
    }

    fn guard_not_started(&self) {
        if self.state.started {
            panic!("{}", TweenError::MutateAfterStart);
        }
    }

    fn check_attrs(&self, count: usize) {
        let limit = combined_attrs_limit();
        if count > limit {
            panic!(
                "{}",
                TweenError::CombinedAttrsOverflow {
                    given: count,
                    limit,
                }
            );
        }
    }

    fn write(&self, values: &[f64]) {
        if let (Some(target), Some(accessor)) = (&self.target, &self.accessor) {
            accessor.set_values(&mut *target.object.borrow_mut(), self.type_code, values);
        }
    }
}

impl Animated for Tween {
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

    /// Sample the start values, then apply the relative and from modes.
    fn initialize_values(&mut self) {
        let (Some(target), Some(accessor)) = (&self.target, &self.accessor) else {
            return;
        };
        accessor.get_values(
            &*target.object.borrow(),
            self.type_code,
            &mut self.start_values,
        );
        for i in 0..self.attr_count {
            if self.is_relative {
                self.target_values[i] += self.start_values[i];
                for waypoint in &mut self.waypoints {
                    waypoint[i] += self.start_values[i];
                }
            }
            if self.is_from {
                let tmp = self.start_values[i];
                self.start_values[i] = self.target_values[i];
                self.target_values[i] = tmp;
            }
        }
    }

    fn update_values(&mut self, step: i32, last_step: i32, iteration_step: bool, delta: f64) {
        let Some(ease) = self.ease else { return };
        if self.target.is_none() || self.accessor.is_none() {
            return;
        }

        // the cursor stepped past this side of the iteration window: pin the
        // attribute to the exact endpoint so repeated passes cannot drift
        if !iteration_step && step > last_step {
            if self.state.is_reverse(last_step) {
                self.write(&self.start_values);
            } else {
                self.write(&self.target_values);
            }
            return;
        }
        if !iteration_step && step < last_step {
            if self.state.is_reverse(last_step) {
                self.write(&self.target_values);
            } else {
                self.write(&self.start_values);
            }
            return;
        }

        debug_assert!(iteration_step);
        debug_assert!(self.state.current_time >= -EPS);
        debug_assert!(self.state.current_time <= self.state.duration + EPS);

        if self.state.duration < EPS {
            // zero-length iteration: the entry write lands on the boundary
            // value for the travel direction; the exit write pins the other
            let reverse = self.state.is_reverse(step);
            if delta > -EPS {
                if reverse {
                    self.write(&self.target_values);
                } else {
                    self.write(&self.start_values);
                }
            } else if reverse {
                self.write(&self.start_values);
            } else {
                self.write(&self.target_values);
            }
            return;
        }

        let time = if self.state.is_reverse(step) {
            self.state.duration - self.state.current_time
        } else {
            self.state.current_time
        };
        let t = ease.apply(time / self.state.duration);

        match self.path {
            Some(path) if !self.waypoints.is_empty() => {
                for i in 0..self.attr_count {
                    self.path_buffer.clear();
                    self.path_buffer.push(self.start_values[i]);
                    for waypoint in &self.waypoints {
                        self.path_buffer.push(waypoint[i]);
                    }
                    self.path_buffer.push(self.target_values[i]);
                    self.value_buffer[i] = path.compute(t, &self.path_buffer);
                }
            }
            _ => {
                for i in 0..self.attr_count {
                    self.value_buffer[i] =
                        self.start_values[i] + t * (self.target_values[i] - self.start_values[i]);
                }
            }
        }

        if let (Some(target), Some(accessor)) = (&self.target, &self.accessor) {
            accessor.set_values(
                &mut *target.object.borrow_mut(),
                self.type_code,
                &self.value_buffer,
            );
        }
    }

    fn force_start_values(&mut self) {
        self.write(&self.start_values);
    }

    fn force_end_values(&mut self) {
        self.write(&self.target_values);
    }
}

pub(crate) fn same_object(a: &Rc<RefCell<dyn Any>>, b: &Rc<RefCell<dyn Any>>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}
