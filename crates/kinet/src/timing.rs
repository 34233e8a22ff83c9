//! The temporal state machine shared by tweens and timelines.
//!
//! Every animated entity embeds a [`TweenState`] and advances through the
//! same phases, indexed by `step`:
//!
//! ```text
//! step  -1   : pre-delay (waiting out `delay`)
//! step  2k   : iteration k, current_time in [0, duration]
//! step  2k+1 : repeat delay after iteration k (k < repeat_count)
//! step  > 2R : terminal
//! ```
//!
//! [`drive`] consumes a signed time delta, crossing as many phase boundaries
//! as the delta covers and firing the lifecycle callbacks for each edge, in
//! order, in both travel directions. The loop re-samples the kill flag after
//! every callback so a callback may kill the entity it was fired from (or
//! request the death of its owning timeline) without the update touching it
//! again.

use std::any::Any;

/// Sentinel repeat count for endless repetition.
pub const INFINITE: i32 = -1;

/// Times below this threshold are treated as zero.
pub(crate) const EPS: f64 = 1e-11;

/// A lifecycle edge crossed during an advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// First forward transition out of pre-delay, fired once ever
    Begin,
    /// Forward entry into an iteration
    Start,
    /// Forward exit from an iteration
    End,
    /// Forward transition into the terminal phase
    Complete,
    /// Reverse entry into an iteration
    BackStart,
    /// Reverse exit from an iteration
    BackEnd,
    /// Reverse transition out of the first iteration into pre-delay
    BackComplete,
}

impl Trigger {
    const fn bit(self) -> u8 {
        match self {
            Trigger::Begin => 0x01,
            Trigger::Start => 0x02,
            Trigger::End => 0x04,
            Trigger::Complete => 0x08,
            Trigger::BackStart => 0x10,
            Trigger::BackEnd => 0x20,
            Trigger::BackComplete => 0x40,
        }
    }
}

/// Bitmask of [`Trigger`] edges a callback subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triggers(pub u8);

impl Triggers {
    pub const BEGIN: Triggers = Triggers(0x01);
    pub const START: Triggers = Triggers(0x02);
    pub const END: Triggers = Triggers(0x04);
    pub const COMPLETE: Triggers = Triggers(0x08);
    pub const BACK_START: Triggers = Triggers(0x10);
    pub const BACK_END: Triggers = Triggers(0x20);
    pub const BACK_COMPLETE: Triggers = Triggers(0x40);
    pub const ANY: Triggers = Triggers(0xFF);

    pub const fn contains(self, trigger: Trigger) -> bool {
        self.0 & trigger.bit() != 0
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Triggers::COMPLETE
    }
}

impl std::ops::BitOr for Triggers {
    type Output = Triggers;

    fn bitor(self, rhs: Triggers) -> Triggers {
        Triggers(self.0 | rhs.0)
    }
}

/// Lifecycle callback: receives the crossed edge and the timing state of the
/// firing entity (a leaf tween or a timeline).
pub type TweenCallback = Box<dyn FnMut(Trigger, &mut TweenState)>;

/// Timing fields shared by every animated entity.
pub struct TweenState {
    pub(crate) duration: f64,
    pub(crate) delay: f64,
    pub(crate) repeat_count: i32,
    pub(crate) repeat_delay: f64,
    pub(crate) yoyo: bool,
    pub(crate) step: i32,
    pub(crate) current_time: f64,
    pub(crate) delta_time: f64,
    pub(crate) iteration_step: bool,
    pub(crate) started: bool,
    pub(crate) initialized: bool,
    pub(crate) finished: bool,
    pub(crate) killed: bool,
    pub(crate) paused: bool,
    pub(crate) built: bool,
    pub(crate) kill_parent_requested: bool,
    pub(crate) triggers: Triggers,
    pub(crate) user_data: Option<Box<dyn Any>>,
}

impl Default for TweenState {
    fn default() -> Self {
        Self {
            duration: 0.0,
            delay: 0.0,
            repeat_count: 0,
            repeat_delay: 0.0,
            yoyo: false,
            step: -1,
            current_time: 0.0,
            delta_time: 0.0,
            iteration_step: false,
            started: false,
            initialized: false,
            finished: false,
            killed: false,
            paused: false,
            built: false,
            kill_parent_requested: false,
            triggers: Triggers::default(),
            user_data: None,
        }
    }
}

impl TweenState {
    /// Length of one iteration, in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Idle time before the first iteration.
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Additional iterations after the first; [`INFINITE`] for endless.
    pub fn repeat_count(&self) -> i32 {
        self.repeat_count
    }

    /// Idle time inserted between iterations.
    pub fn repeat_delay(&self) -> f64 {
        self.repeat_delay
    }

    /// Whether odd iterations run reversed.
    pub fn is_yoyo(&self) -> bool {
        self.yoyo
    }

    /// Current phase index; see the module docs for the encoding.
    pub fn step(&self) -> i32 {
        self.step
    }

    /// Position within the current phase.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Total covered time from start to completion:
    /// `delay + (1 + repeat_count) * duration + repeat_count * repeat_delay`.
    /// Infinite for endless repetition.
    pub fn full_duration(&self) -> f64 {
        if self.repeat_count < 0 {
            return f64::INFINITY;
        }
        self.delay
            + (1 + self.repeat_count) as f64 * self.duration
            + self.repeat_count as f64 * self.repeat_delay
    }

    /// Normalized position: 0 in pre-delay, `current_time / duration` inside
    /// an iteration, 1 once terminal. Between iterations it reports the
    /// endpoint the previous iteration settled on.
    pub fn normal_time(&self) -> f64 {
        if self.step < 0 {
            return 0.0;
        }
        if self.repeat_count >= 0 && self.step > self.repeat_count * 2 {
            return 1.0;
        }
        if self.iteration_step {
            if self.duration < EPS {
                return 0.0;
            }
            return (self.current_time / self.duration).clamp(0.0, 1.0);
        }
        if self.is_reverse(self.step - 1) {
            0.0
        } else {
            1.0
        }
    }

    /// Stop advancing for good. Idempotent; the owner reclaims the instance
    /// on its next sweep.
    pub fn kill(&mut self) {
        self.killed = true;
    }

    /// Kill this entity together with the timeline that owns it, if any.
    /// The owning timeline observes the request as soon as the current child
    /// advance returns, before any sibling callback can fire. On a detached
    /// or root entity this is equivalent to [`kill`](Self::kill).
    pub fn kill_parent(&mut self) {
        self.killed = true;
        self.kill_parent_requested = true;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Attach an opaque user value.
    pub fn set_user_data(&mut self, data: impl Any) {
        self.user_data = Some(Box::new(data));
    }

    pub fn user_data<T: 'static>(&self) -> Option<&T> {
        self.user_data.as_ref().and_then(|data| data.downcast_ref())
    }

    pub fn user_data_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.user_data.as_mut().and_then(|data| data.downcast_mut())
    }

    /// Whether iteration `step` plays reversed under yoyo.
    pub(crate) fn is_reverse(&self, step: i32) -> bool {
        self.yoyo && (step % 4).abs() == 2
    }

    pub(crate) fn reset(&mut self) {
        *self = TweenState::default();
    }
}

/// The hooks an animated entity provides to the shared state machine.
pub(crate) trait Animated {
    fn state(&self) -> &TweenState;
    fn state_mut(&mut self) -> &mut TweenState;
    fn take_callback(&mut self) -> Option<TweenCallback>;
    fn restore_callback(&mut self, callback: TweenCallback);
    /// Runs once, on the first entry into step 0.
    fn initialize_values(&mut self);
    /// Runs on every in-iteration move and on every phase transition.
    fn update_values(&mut self, step: i32, last_step: i32, iteration_step: bool, delta: f64);
    /// Snap the animated values to the start of the first iteration.
    fn force_start_values(&mut self);
    /// Snap the animated values to the end of the last iteration.
    fn force_end_values(&mut self);
}

pub(crate) fn fire<A: Animated>(animated: &mut A, trigger: Trigger) {
    if !animated.state().triggers.contains(trigger) {
        return;
    }
    if let Some(mut callback) = animated.take_callback() {
        callback(trigger, animated.state_mut());
        animated.restore_callback(callback);
    }
}

/// Advance `animated` by a signed time delta, crossing every phase boundary
/// the delta covers and firing the matching callbacks in order.
pub(crate) fn drive<A: Animated>(animated: &mut A, delta: f64) {
    {
        let state = animated.state_mut();
        if !state.started || state.paused || state.killed {
            return;
        }
        state.delta_time = delta;
    }
    let forward = delta >= 0.0;

    if !animated.state().initialized {
        initialize(animated);
        if animated.state().killed {
            animated.state_mut().delta_time = 0.0;
            return;
        }
    }

    if animated.state().initialized {
        relaunch(animated);
        if animated.state().killed {
            animated.state_mut().delta_time = 0.0;
            return;
        }
        step_through(animated, forward);
        if animated.state().killed {
            animated.state_mut().delta_time = 0.0;
            return;
        }
        let state = animated.state_mut();
        state.finished =
            state.repeat_count >= 0 && (state.step > state.repeat_count * 2 || state.step < 0);
    }

    // whatever the phases did not consume accumulates as signed overshoot
    let state = animated.state_mut();
    state.current_time += state.delta_time;
    state.delta_time = 0.0;
}

/// First-ever transition out of pre-delay: run the initialization hook and
/// fire BEGIN then START.
fn initialize<A: Animated>(animated: &mut A) {
    let ready = {
        let state = animated.state();
        state.current_time + state.delta_time >= state.delay
    };
    if !ready {
        return;
    }
    animated.initialize_values();
    {
        let state = animated.state_mut();
        state.initialized = true;
        state.iteration_step = true;
        state.step = 0;
        state.delta_time -= state.delay - state.current_time;
        state.current_time = 0.0;
    }
    fire(animated, Trigger::Begin);
    if animated.state().killed {
        return;
    }
    fire(animated, Trigger::Start);
}

/// Re-entry into the playable window after the cursor previously left it:
/// forward from pre-delay (after a rewind) or backward from terminal.
fn relaunch<A: Animated>(animated: &mut A) {
    let state = animated.state();
    if state.iteration_step || state.repeat_count < 0 {
        return;
    }
    if state.step < 0 && state.current_time + state.delta_time >= 0.0 {
        let d = -state.current_time;
        {
            let state = animated.state_mut();
            state.iteration_step = true;
            state.step = 0;
            state.delta_time -= d;
            state.current_time = 0.0;
        }
        fire(animated, Trigger::Start);
        if animated.state().killed {
            return;
        }
        animated.update_values(0, -1, true, d);
    } else if state.step > state.repeat_count * 2 && state.current_time + state.delta_time < 0.0 {
        let d = -state.current_time;
        let step = state.repeat_count * 2;
        {
            let state = animated.state_mut();
            state.iteration_step = true;
            state.step = step;
            state.delta_time -= d;
            state.current_time = state.duration;
        }
        fire(animated, Trigger::BackStart);
        if animated.state().killed {
            return;
        }
        animated.update_values(step, step + 1, true, d);
    }
}

/// Consume the pending delta, one phase boundary at a time.
fn step_through<A: Animated>(animated: &mut A, forward: bool) {
    loop {
        let state = animated.state();
        if state.killed {
            return;
        }
        let playable =
            (state.step >= 0 && state.step <= state.repeat_count * 2) || state.repeat_count < 0;
        if !playable {
            return;
        }

        if !forward && !state.iteration_step && state.current_time + state.delta_time <= 0.0 {
            // backward across a repeat delay, into the previous iteration
            let d = -state.current_time;
            let step = {
                let state = animated.state_mut();
                state.iteration_step = true;
                state.step -= 1;
                state.delta_time -= d;
                state.current_time = state.duration;
                state.step
            };
            if animated.state().is_reverse(step) {
                animated.force_start_values();
            } else {
                animated.force_end_values();
            }
            fire(animated, Trigger::BackStart);
            if animated.state().killed {
                return;
            }
            animated.update_values(step, step + 1, true, d);
        } else if forward
            && !state.iteration_step
            && state.current_time + state.delta_time >= state.repeat_delay
        {
            // forward across a repeat delay, into the next iteration
            let d = state.repeat_delay - state.current_time;
            let step = {
                let state = animated.state_mut();
                state.iteration_step = true;
                state.step += 1;
                state.delta_time -= d;
                state.current_time = 0.0;
                state.step
            };
            if animated.state().is_reverse(step) {
                animated.force_end_values();
            } else {
                animated.force_start_values();
            }
            fire(animated, Trigger::Start);
            if animated.state().killed {
                return;
            }
            animated.update_values(step, step - 1, true, d);
        } else if !forward && state.iteration_step && state.current_time + state.delta_time <= 0.0 {
            // backward out of the current iteration
            let d = -state.current_time;
            let step = {
                let state = animated.state_mut();
                state.iteration_step = false;
                state.step -= 1;
                state.delta_time -= d;
                state.current_time = 0.0;
                state.step
            };
            animated.update_values(step, step + 1, false, d);
            fire(animated, Trigger::BackEnd);
            if animated.state().killed {
                return;
            }
            if step < 0 && animated.state().repeat_count >= 0 {
                fire(animated, Trigger::BackComplete);
                if animated.state().killed {
                    return;
                }
            } else {
                let state = animated.state_mut();
                state.current_time = state.repeat_delay;
            }
        } else if forward
            && state.iteration_step
            && state.current_time + state.delta_time >= state.duration
        {
            // forward out of the current iteration
            let d = state.duration - state.current_time;
            let step = {
                let state = animated.state_mut();
                state.iteration_step = false;
                state.step += 1;
                state.delta_time -= d;
                state.current_time = state.duration;
                state.step
            };
            animated.update_values(step, step - 1, false, d);
            fire(animated, Trigger::End);
            if animated.state().killed {
                return;
            }
            let state = animated.state();
            if state.repeat_count >= 0 && step > state.repeat_count * 2 {
                fire(animated, Trigger::Complete);
                if animated.state().killed {
                    return;
                }
            }
            animated.state_mut().current_time = 0.0;
        } else if state.iteration_step {
            // plain motion inside the iteration
            let d = state.delta_time;
            let step = state.step;
            {
                let state = animated.state_mut();
                state.delta_time = 0.0;
                state.current_time += d;
            }
            animated.update_values(step, step, true, d);
            return;
        } else {
            // idle inside a repeat delay
            let state = animated.state_mut();
            let d = state.delta_time;
            state.delta_time = 0.0;
            state.current_time += d;
            return;
        }
    }
}

/// Rewind the entity to its pre-delay phase, snapping values to the start of
/// the first iteration. Used when a timeline replays an iteration.
pub(crate) fn force_to_start<A: Animated>(animated: &mut A) {
    {
        let state = animated.state_mut();
        state.current_time = -state.delay;
        state.step = -1;
        state.iteration_step = false;
    }
    if animated.state().is_reverse(0) {
        animated.force_end_values();
    } else {
        animated.force_start_values();
    }
}

/// Fast-forward the entity to its terminal phase, snapping values to the end
/// of the last iteration. `time` is the owner's iteration length, so the
/// overshoot accumulator stays consistent with the owner's cursor.
pub(crate) fn force_to_end<A: Animated>(animated: &mut A, time: f64) {
    let last_step = animated.state().repeat_count * 2;
    {
        let state = animated.state_mut();
        state.current_time = time - state.full_duration();
        state.step = last_step + 1;
        state.iteration_step = false;
    }
    if animated.state().is_reverse(last_step) {
        animated.force_start_values();
    } else {
        animated.force_end_values();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_mask() {
        let mask = Triggers::BEGIN | Triggers::COMPLETE;
        assert!(mask.contains(Trigger::Begin));
        assert!(mask.contains(Trigger::Complete));
        assert!(!mask.contains(Trigger::Start));
        assert!(Triggers::ANY.contains(Trigger::BackComplete));
    }

    #[test]
    fn test_default_mask_is_complete_only() {
        let mask = Triggers::default();
        assert!(mask.contains(Trigger::Complete));
        assert!(!mask.contains(Trigger::Begin));
    }

    #[test]
    fn test_full_duration() {
        let state = TweenState {
            duration: 0.5,
            delay: 0.2,
            repeat_count: 2,
            repeat_delay: 0.1,
            ..TweenState::default()
        };
        assert!((state.full_duration() - (0.2 + 3.0 * 0.5 + 2.0 * 0.1)).abs() < EPS);
    }

    #[test]
    fn test_full_duration_infinite() {
        let state = TweenState {
            duration: 0.5,
            repeat_count: INFINITE,
            ..TweenState::default()
        };
        assert!(state.full_duration().is_infinite());
    }

    #[test]
    fn test_yoyo_reverses_odd_iterations() {
        let state = TweenState {
            yoyo: true,
            ..TweenState::default()
        };
        assert!(!state.is_reverse(0));
        assert!(state.is_reverse(2));
        assert!(!state.is_reverse(4));
        assert!(state.is_reverse(6));
        // repeat delays and the terminal step are never reversed
        assert!(!state.is_reverse(1));
        assert!(!state.is_reverse(3));
    }

    #[test]
    fn test_normal_time_phases() {
        let mut state = TweenState {
            duration: 2.0,
            ..TweenState::default()
        };
        assert_eq!(state.normal_time(), 0.0);

        state.step = 0;
        state.iteration_step = true;
        state.current_time = 0.5;
        assert!((state.normal_time() - 0.25).abs() < EPS);

        state.step = 1;
        state.iteration_step = false;
        assert_eq!(state.normal_time(), 1.0);

        state.step = 1;
        state.repeat_count = 0;
        assert_eq!(state.normal_time(), 1.0);
    }

    #[test]
    fn test_kill_is_idempotent() {
        let mut state = TweenState::default();
        state.kill();
        state.kill();
        assert!(state.is_killed());
        assert!(!state.kill_parent_requested);
    }

    #[test]
    fn test_user_data_roundtrip() {
        let mut state = TweenState::default();
        state.set_user_data(42_u32);
        assert_eq!(state.user_data::<u32>(), Some(&42));
        assert_eq!(state.user_data::<String>(), None);
        if let Some(value) = state.user_data_mut::<u32>() {
            *value = 7;
        }
        assert_eq!(state.user_data::<u32>(), Some(&7));
    }
}
