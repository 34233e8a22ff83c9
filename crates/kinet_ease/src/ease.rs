//! Easing equations.
//!
//! The catalog covers the classic Penner families, normalized so that every
//! equation maps `[0, 1] -> f64` with `f(0) = 0` and `f(1) = 1`. The Back and
//! Elastic families overshoot outside `[0, 1]` mid-curve but pin both
//! endpoints exactly.

use std::f64::consts::PI;

/// An easing equation, applied to normalized iteration time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    /// CSS-style bezier through `(0,0) (x1,y1) (x2,y2) (1,1)`.
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// Apply the easing equation to a progress value (0.0 to 1.0).
    pub fn apply(&self, t: f64) -> f64 {
        match *self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::QuartIn => t * t * t * t,
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::QuintIn => t.powi(5),
            Easing::QuintOut => 1.0 - (1.0 - t).powi(5),
            Easing::QuintInOut => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::ExpoIn => {
                if t <= 0.0 {
                    0.0
                } else {
                    (10.0 * t - 10.0).exp2()
                }
            }
            Easing::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - (-10.0 * t).exp2()
                }
            }
            Easing::ExpoInOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    (20.0 * t - 10.0).exp2() / 2.0
                } else {
                    (2.0 - (-20.0 * t + 10.0).exp2()) / 2.0
                }
            }
            Easing::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Easing::CircOut => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Easing::CircInOut => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Easing::BackIn => {
                let c1 = 1.70158;
                (c1 + 1.0) * t * t * t - c1 * t * t
            }
            Easing::BackOut => {
                let c1 = 1.70158;
                let t = t - 1.0;
                1.0 + (c1 + 1.0) * t * t * t + c1 * t * t
            }
            Easing::BackInOut => {
                let c2 = 1.70158 * 1.525;
                if t < 0.5 {
                    let t = 2.0 * t;
                    (t * t * ((c2 + 1.0) * t - c2)) / 2.0
                } else {
                    let t = 2.0 * t - 2.0;
                    (t * t * ((c2 + 1.0) * t + c2) + 2.0) / 2.0
                }
            }
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Easing::ElasticIn => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c4 = 2.0 * PI / 3.0;
                    -(10.0 * t - 10.0).exp2() * ((10.0 * t - 10.75) * c4).sin()
                }
            }
            Easing::ElasticOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c4 = 2.0 * PI / 3.0;
                    (-10.0 * t).exp2() * ((10.0 * t - 0.75) * c4).sin() + 1.0
                }
            }
            Easing::ElasticInOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c5 = 2.0 * PI / 4.5;
                    if t < 0.5 {
                        -((20.0 * t - 10.0).exp2() * ((20.0 * t - 11.125) * c5).sin()) / 2.0
                    } else {
                        ((-20.0 * t + 10.0).exp2() * ((20.0 * t - 11.125) * c5).sin()) / 2.0 + 1.0
                    }
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, x1, y1, x2, y2),
        }
    }
}

/// Penner bounce-out: three decaying parabolic arcs after the main drop.
fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Cubic bezier easing calculation.
fn cubic_bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Newton-Raphson iteration to find the curve parameter for a given x
    let mut guess = t;
    for _ in 0..8 {
        let x = cubic_bezier_sample(guess, x1, x2) - t;
        if x.abs() < 1e-7 {
            break;
        }
        let dx = cubic_bezier_slope(guess, x1, x2);
        if dx.abs() < 1e-9 {
            break;
        }
        guess -= x / dx;
    }
    cubic_bezier_sample(guess, y1, y2)
}

fn cubic_bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;

    3.0 * mt2 * t * p1 + 3.0 * mt * t2 * p2 + t3
}

fn cubic_bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let t2 = t * t;
    let mt = 1.0 - t;

    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t2 * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Easing> {
        use Easing::*;
        vec![
            Linear,
            QuadIn,
            QuadOut,
            QuadInOut,
            CubicIn,
            CubicOut,
            CubicInOut,
            QuartIn,
            QuartOut,
            QuartInOut,
            QuintIn,
            QuintOut,
            QuintInOut,
            SineIn,
            SineOut,
            SineInOut,
            ExpoIn,
            ExpoOut,
            ExpoInOut,
            CircIn,
            CircOut,
            CircInOut,
            BackIn,
            BackOut,
            BackInOut,
            BounceIn,
            BounceOut,
            BounceInOut,
            ElasticIn,
            ElasticOut,
            ElasticInOut,
            CubicBezier(0.25, 0.1, 0.25, 1.0),
        ]
    }

    #[test]
    fn test_every_equation_pins_both_endpoints() {
        for ease in catalog() {
            assert!(
                ease.apply(0.0).abs() < 1e-9,
                "{ease:?} does not start at 0: {}",
                ease.apply(0.0)
            );
            assert!(
                (ease.apply(1.0) - 1.0).abs() < 1e-9,
                "{ease:?} does not end at 1: {}",
                ease.apply(1.0)
            );
        }
    }

    #[test]
    fn test_in_out_symmetry() {
        for (ease_in, ease_out) in [
            (Easing::QuadIn, Easing::QuadOut),
            (Easing::CubicIn, Easing::CubicOut),
            (Easing::SineIn, Easing::SineOut),
            (Easing::CircIn, Easing::CircOut),
        ] {
            for i in 0..=10 {
                let t = i as f64 / 10.0;
                let mirrored = 1.0 - ease_out.apply(1.0 - t);
                assert!(
                    (ease_in.apply(t) - mirrored).abs() < 1e-9,
                    "{ease_in:?}({t}) is not the mirror of {ease_out:?}"
                );
            }
        }
    }

    #[test]
    fn test_in_out_variants_hit_the_midpoint() {
        for ease in [Easing::QuadInOut, Easing::CubicInOut, Easing::SineInOut] {
            assert!((ease.apply(0.5) - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bounce_stays_in_unit_range() {
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let v = Easing::BounceOut.apply(t);
            assert!((-1e-9..=1.0 + 1e-9).contains(&v));
        }
    }

    #[test]
    fn test_back_overshoots_mid_curve() {
        assert!(Easing::BackIn.apply(0.3) < 0.0);
        assert!(Easing::BackOut.apply(0.7) > 1.0);
    }

    #[test]
    fn test_cubic_bezier_is_monotonic_for_standard_curve() {
        let ease = Easing::CubicBezier(0.25, 0.1, 0.25, 1.0);
        let mut last = 0.0;
        for i in 1..=20 {
            let v = ease.apply(i as f64 / 20.0);
            assert!(v >= last - 1e-9);
            last = v;
        }
    }
}
