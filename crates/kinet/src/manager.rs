//! The driver owning top-level animations.
//!
//! A manager holds a flat list of roots, forwards each time delta to all of
//! them, and sweeps finished or killed roots back into the instance pools.
//! It owns no clock: the caller measures time and calls
//! [`update`](TweenManager::update) from its own loop.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::Animation;

/// Owns and advances top-level tweens and timelines.
#[derive(Default)]
pub struct TweenManager {
    objects: Vec<Animation>,
    paused: bool,
}

impl TweenManager {
    pub fn new() -> TweenManager {
        TweenManager::default()
    }

    /// Take ownership of an animation, building and starting it if needed.
    pub fn add(&mut self, object: impl Into<Animation>) {
        let mut object = object.into();
        if !object.state().is_started() {
            object.start_in_place();
        }
        tracing::trace!(roots = self.objects.len() + 1, "animation added to manager");
        self.objects.push(object);
    }

    /// Advance every root by a signed delta (insertion order going forward,
    /// reverse order going backward), then sweep finished and killed roots
    /// back into their pools.
    pub fn update(&mut self, delta: f64) {
        if !self.paused {
            if delta >= 0.0 {
                for object in self.objects.iter_mut() {
                    object.update(delta);
                }
            } else {
                for object in self.objects.iter_mut().rev() {
                    object.update(delta);
                }
            }
        }

        let mut index = 0;
        while index < self.objects.len() {
            let state = self.objects[index].state();
            if state.is_finished() || state.is_killed() {
                let object = self.objects.swap_remove(index);
                object.free();
            } else {
                index += 1;
            }
        }
    }

    /// Kill every root.
    pub fn kill_all(&mut self) {
        tracing::debug!(roots = self.objects.len(), "killing all animations");
        for object in &mut self.objects {
            object.kill();
        }
    }

    /// Kill every root animating `target`: any attribute group when
    /// `type_code` is `None`, exactly that group otherwise. A timeline dies
    /// whole if any of its children matches.
    pub fn kill_target<T: 'static>(&mut self, target: &Rc<RefCell<T>>, type_code: Option<i32>) {
        let object = Rc::clone(target) as Rc<RefCell<dyn Any>>;
        for root in &mut self.objects {
            if root.contains_target(&object, type_code) {
                root.kill();
            }
        }
    }

    /// Whether any root animates `target` (see
    /// [`kill_target`](TweenManager::kill_target) for `type_code` matching).
    pub fn contains_target<T: 'static>(
        &self,
        target: &Rc<RefCell<T>>,
        type_code: Option<i32>,
    ) -> bool {
        let object = Rc::clone(target) as Rc<RefCell<dyn Any>>;
        self.objects
            .iter()
            .any(|root| root.contains_target(&object, type_code))
    }

    /// Stop advancing until [`resume`](TweenManager::resume).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Number of top-level animations.
    pub fn size(&self) -> usize {
        self.objects.len()
    }

    /// Unfinished leaf tweens, counted through nested timelines.
    pub fn running_tweens_count(&self) -> usize {
        self.objects.iter().map(Animation::running_tweens).sum()
    }

    /// Unfinished timelines, counted through nested timelines.
    pub fn running_timelines_count(&self) -> usize {
        self.objects.iter().map(Animation::running_timelines).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{register_accessor, TweenAccessor};
    use crate::timeline::Timeline;
    use crate::tween::Tween;
    use kinet_ease::Easing;

    const VALUE: i32 = 1;

    struct Meter {
        value: f64,
    }

    struct MeterAccessor;

    impl TweenAccessor<Meter> for MeterAccessor {
        fn get_values(&self, target: &Meter, _type_code: i32, out: &mut [f64]) -> usize {
            out[0] = target.value;
            1
        }

        fn set_values(&self, target: &mut Meter, _type_code: i32, values: &[f64]) {
            target.value = values[0];
        }
    }

    fn meter(value: f64) -> Rc<RefCell<Meter>> {
        register_accessor::<Meter>(MeterAccessor);
        Rc::new(RefCell::new(Meter { value }))
    }

    #[test]
    fn test_update_advances_and_reaps() {
        let target = meter(0.0);
        let mut manager = TweenManager::new();
        Tween::to(&target, VALUE, 0.2)
            .target(&[10.0])
            .ease(Easing::Linear)
            .start_in(&mut manager);

        assert_eq!(manager.size(), 1);
        assert_eq!(manager.running_tweens_count(), 1);

        manager.update(0.1);
        assert!((target.borrow().value - 5.0).abs() < 1e-9);

        manager.update(0.1);
        assert!((target.borrow().value - 10.0).abs() < 1e-9);
        assert_eq!(manager.size(), 0);
        assert_eq!(manager.running_tweens_count(), 0);
    }

    #[test]
    fn test_paused_manager_holds_time_still() {
        let target = meter(0.0);
        let mut manager = TweenManager::new();
        Tween::to(&target, VALUE, 0.2)
            .target(&[10.0])
            .ease(Easing::Linear)
            .start_in(&mut manager);

        manager.pause();
        manager.update(1.0);
        assert_eq!(target.borrow().value, 0.0);
        assert_eq!(manager.size(), 1);

        manager.resume();
        manager.update(0.1);
        assert!((target.borrow().value - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_kill_target_with_and_without_type_code() {
        let a = meter(0.0);
        let b = meter(0.0);
        let mut manager = TweenManager::new();
        Tween::to(&a, VALUE, 1.0).target(&[1.0]).start_in(&mut manager);
        Tween::to(&b, VALUE, 1.0).target(&[1.0]).start_in(&mut manager);

        assert!(manager.contains_target(&a, None));
        assert!(manager.contains_target(&a, Some(VALUE)));
        assert!(!manager.contains_target(&a, Some(99)));

        // a mismatched type code kills nothing
        manager.kill_target(&a, Some(99));
        manager.update(0.01);
        assert_eq!(manager.size(), 2);

        manager.kill_target(&a, None);
        manager.update(0.01);
        assert_eq!(manager.size(), 1);
        assert!(!manager.contains_target(&a, None));
        assert!(manager.contains_target(&b, None));
    }

    #[test]
    fn test_kill_all_reaps_everything() {
        let target = meter(0.0);
        let mut manager = TweenManager::new();
        Tween::to(&target, VALUE, 1.0).target(&[1.0]).start_in(&mut manager);
        Timeline::sequence()
            .push(Tween::to(&target, VALUE, 1.0).target(&[2.0]))
            .start_in(&mut manager);

        assert_eq!(manager.size(), 2);
        manager.kill_all();
        manager.update(0.0);
        assert_eq!(manager.size(), 0);
    }

    #[test]
    fn test_running_counts_see_through_timelines() {
        let target = meter(0.0);
        let mut manager = TweenManager::new();
        Timeline::parallel()
            .push(Tween::to(&target, VALUE, 1.0).target(&[1.0]))
            .begin_sequence()
            .push(Tween::to(&target, VALUE, 0.5).target(&[2.0]))
            .end()
            .start_in(&mut manager);

        assert_eq!(manager.size(), 1);
        assert_eq!(manager.running_tweens_count(), 2);
        assert_eq!(manager.running_timelines_count(), 2);
    }

    #[test]
    fn test_negative_delta_advances_in_reverse_order() {
        let target = meter(0.0);
        let mut manager = TweenManager::new();
        Tween::to(&target, VALUE, 0.2)
            .target(&[10.0])
            .ease(Easing::Linear)
            .start_in(&mut manager);

        manager.update(0.1);
        manager.update(-0.05);
        assert!((target.borrow().value - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_finished_root_returns_to_pool() {
        let target = meter(0.0);
        let mut manager = TweenManager::new();
        Tween::to(&target, VALUE, 0.1)
            .target(&[1.0])
            .start_in(&mut manager);

        let pooled_before = crate::pool::pooled_tweens();
        manager.update(0.2);
        assert_eq!(manager.size(), 0);
        assert_eq!(crate::pool::pooled_tweens(), pooled_before + 1);
    }
}
