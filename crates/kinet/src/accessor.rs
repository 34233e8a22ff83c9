//! Accessor registry
//!
//! The engine never interprets a target: it reads and writes flat arrays of
//! numbers through a user-supplied capability. An accessor exposes the
//! attribute groups of one target type, each group named by an arbitrary
//! `type_code` integer the engine treats as opaque.
//!
//! Capabilities are registered per concrete type and looked up by exact
//! runtime type identity; there is no hierarchy walk. A type that animates
//! itself implements [`Animatable`] and registers through
//! [`register_animatable`] instead of providing a separate accessor object.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Read/write capability over one target type's attribute groups.
///
/// `get_values` writes the current components of the group identified by
/// `type_code` into `out` and returns how many it wrote; `set_values` writes
/// them back. The engine sizes its buffers from the returned count.
pub trait TweenAccessor<T>: 'static {
    fn get_values(&self, target: &T, type_code: i32, out: &mut [f64]) -> usize;
    fn set_values(&self, target: &mut T, type_code: i32, values: &[f64]);
}

/// A target type that is its own accessor.
pub trait Animatable: Any {
    fn get_values(&self, type_code: i32, out: &mut [f64]) -> usize;
    fn set_values(&mut self, type_code: i32, values: &[f64]);
}

/// Type-erased accessor stored in the registry.
pub(crate) trait ErasedAccessor {
    fn get_values(&self, target: &dyn Any, type_code: i32, out: &mut [f64]) -> usize;
    fn set_values(&self, target: &mut dyn Any, type_code: i32, values: &[f64]);
}

struct Registered<T, A> {
    accessor: A,
    marker: PhantomData<fn() -> T>,
}

impl<T: 'static, A: TweenAccessor<T>> ErasedAccessor for Registered<T, A> {
    fn get_values(&self, target: &dyn Any, type_code: i32, out: &mut [f64]) -> usize {
        match target.downcast_ref::<T>() {
            Some(target) => self.accessor.get_values(target, type_code, out),
            None => 0,
        }
    }

    fn set_values(&self, target: &mut dyn Any, type_code: i32, values: &[f64]) {
        if let Some(target) = target.downcast_mut::<T>() {
            self.accessor.set_values(target, type_code, values);
        }
    }
}

struct SelfAccessor<T> {
    marker: PhantomData<fn() -> T>,
}

impl<T: Animatable> ErasedAccessor for SelfAccessor<T> {
    fn get_values(&self, target: &dyn Any, type_code: i32, out: &mut [f64]) -> usize {
        match target.downcast_ref::<T>() {
            Some(target) => target.get_values(type_code, out),
            None => 0,
        }
    }

    fn set_values(&self, target: &mut dyn Any, type_code: i32, values: &[f64]) {
        if let Some(target) = target.downcast_mut::<T>() {
            target.set_values(type_code, values);
        }
    }
}

thread_local! {
    static REGISTRY: RefCell<FxHashMap<TypeId, Rc<dyn ErasedAccessor>>> =
        RefCell::new(FxHashMap::default());
}

/// Register an accessor for targets of type `T`.
///
/// Registration is idempotent: a later registration for the same type
/// replaces the earlier one.
pub fn register_accessor<T: 'static>(accessor: impl TweenAccessor<T>) {
    tracing::debug!(target_type = std::any::type_name::<T>(), "registering tween accessor");
    REGISTRY.with(|registry| {
        registry.borrow_mut().insert(
            TypeId::of::<T>(),
            Rc::new(Registered {
                accessor,
                marker: PhantomData,
            }),
        );
    });
}

/// Register a self-accessing type: `T` reads and writes its own groups.
pub fn register_animatable<T: Animatable>() {
    tracing::debug!(target_type = std::any::type_name::<T>(), "registering animatable type");
    REGISTRY.with(|registry| {
        registry.borrow_mut().insert(
            TypeId::of::<T>(),
            Rc::new(SelfAccessor::<T> {
                marker: PhantomData,
            }),
        );
    });
}

/// Whether an accessor is registered for `T`.
pub fn has_accessor<T: 'static>() -> bool {
    REGISTRY.with(|registry| registry.borrow().contains_key(&TypeId::of::<T>()))
}

pub(crate) fn lookup(type_id: TypeId) -> Option<Rc<dyn ErasedAccessor>> {
    REGISTRY.with(|registry| registry.borrow().get(&type_id).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: f64,
        y: f64,
    }

    struct PointAccessor;

    impl TweenAccessor<Point> for PointAccessor {
        fn get_values(&self, target: &Point, _type_code: i32, out: &mut [f64]) -> usize {
            out[0] = target.x;
            out[1] = target.y;
            2
        }

        fn set_values(&self, target: &mut Point, _type_code: i32, values: &[f64]) {
            target.x = values[0];
            target.y = values[1];
        }
    }

    struct Dial {
        angle: f64,
    }

    impl Animatable for Dial {
        fn get_values(&self, _type_code: i32, out: &mut [f64]) -> usize {
            out[0] = self.angle;
            1
        }

        fn set_values(&mut self, _type_code: i32, values: &[f64]) {
            self.angle = values[0];
        }
    }

    #[test]
    fn test_register_and_lookup() {
        assert!(!has_accessor::<Point>());
        register_accessor::<Point>(PointAccessor);
        assert!(has_accessor::<Point>());

        let accessor = lookup(TypeId::of::<Point>()).unwrap();
        let mut point = Point { x: 1.0, y: 2.0 };
        let mut buffer = [0.0; 2];
        assert_eq!(accessor.get_values(&point, 0, &mut buffer), 2);
        assert_eq!(buffer, [1.0, 2.0]);

        accessor.set_values(&mut point, 0, &[5.0, 6.0]);
        assert_eq!(point.x, 5.0);
        assert_eq!(point.y, 6.0);
    }

    #[test]
    fn test_registration_is_idempotent() {
        register_accessor::<Point>(PointAccessor);
        register_accessor::<Point>(PointAccessor);
        assert!(has_accessor::<Point>());
    }

    #[test]
    fn test_self_accessor() {
        register_animatable::<Dial>();
        let accessor = lookup(TypeId::of::<Dial>()).unwrap();

        let mut dial = Dial { angle: 30.0 };
        let mut buffer = [0.0; 1];
        assert_eq!(accessor.get_values(&dial, 0, &mut buffer), 1);
        assert_eq!(buffer[0], 30.0);

        accessor.set_values(&mut dial, 0, &[45.0]);
        assert_eq!(dial.angle, 45.0);
    }

    #[test]
    fn test_mismatched_target_is_ignored() {
        register_accessor::<Point>(PointAccessor);
        let accessor = lookup(TypeId::of::<Point>()).unwrap();

        let mut wrong: i32 = 7;
        let mut buffer = [0.0; 2];
        assert_eq!(accessor.get_values(&wrong, 0, &mut buffer), 0);
        accessor.set_values(&mut wrong, 0, &[1.0, 2.0]);
        assert_eq!(wrong, 7);
    }
}
