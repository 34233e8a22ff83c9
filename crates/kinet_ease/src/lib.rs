//! Easing equations and path evaluators for the kinet interpolation engine.
//!
//! Everything in this crate is pure math over normalized time:
//!
//! - **Easing**: functions `t in [0, 1] -> f64` shaping how an interpolation
//!   accelerates. All the classic Penner families are provided, each with
//!   In/Out/InOut variants, plus a CSS-style cubic bezier.
//! - **Paths**: evaluators fitting a curve through N control points, used
//!   when a tween travels through waypoints instead of a straight segment.

pub mod ease;
pub mod path;

pub use ease::Easing;
pub use path::TweenPath;
