//! Path evaluators over N control points.
//!
//! A path fits a curve through a control polygon `[start, w0, w1, .., target]`
//! and evaluates it at a normalized parameter `t in [0, 1]`. The knots are
//! spaced uniformly, so `t = i / (n - 1)` lands exactly on control point `i`.

/// Curve shape used when a tween travels through waypoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TweenPath {
    /// Centripetal-style Catmull-Rom: a smooth spline through every control
    /// point, with endpoint tangents derived by duplicating the end points.
    #[default]
    CatmullRom,
    /// Straight segments between consecutive control points.
    Linear,
}

impl TweenPath {
    /// Evaluate the path at `t`, over `points` in travel order.
    pub fn compute(&self, t: f64, points: &[f64]) -> f64 {
        let n = points.len();
        match n {
            0 => 0.0,
            1 => points[0],
            2 => {
                let t = t.clamp(0.0, 1.0);
                points[0] + (points[1] - points[0]) * t
            }
            _ => {
                let t = t.clamp(0.0, 1.0);
                let segments = n - 1;
                let segment = ((t * segments as f64) as usize).min(segments - 1);
                let local = t * segments as f64 - segment as f64;
                match self {
                    TweenPath::Linear => {
                        let a = points[segment];
                        let b = points[segment + 1];
                        a + (b - a) * local
                    }
                    TweenPath::CatmullRom => {
                        if segment == 0 {
                            catmull_rom(points[0], points[0], points[1], points[2], local)
                        } else if segment == segments - 1 {
                            catmull_rom(
                                points[n - 3],
                                points[n - 2],
                                points[n - 1],
                                points[n - 1],
                                local,
                            )
                        } else {
                            catmull_rom(
                                points[segment - 1],
                                points[segment],
                                points[segment + 1],
                                points[segment + 2],
                                local,
                            )
                        }
                    }
                }
            }
        }
    }
}

/// One Catmull-Rom segment between `current` and `next`, in Hermite form with
/// finite-difference tangents:
///
/// - `tangent_start = 0.5 * (next - prev)`
/// - `tangent_end   = 0.5 * (after - current)`
fn catmull_rom(prev: f64, current: f64, next: f64, after: f64, t: f64) -> f64 {
    let tangent_start = (next - prev) * 0.5;
    let tangent_end = (after - current) * 0.5;

    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    current * h00 + tangent_start * h10 + next * h01 + tangent_end * h11
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_points_is_a_lerp() {
        for path in [TweenPath::CatmullRom, TweenPath::Linear] {
            assert_eq!(path.compute(0.0, &[2.0, 6.0]), 2.0);
            assert_eq!(path.compute(0.5, &[2.0, 6.0]), 4.0);
            assert_eq!(path.compute(1.0, &[2.0, 6.0]), 6.0);
        }
    }

    #[test]
    fn test_knots_pass_through_control_points() {
        let points = [0.0, 10.0, -4.0, 7.0, 3.0];
        let n = points.len();
        for path in [TweenPath::CatmullRom, TweenPath::Linear] {
            for (i, p) in points.iter().enumerate() {
                let t = i as f64 / (n - 1) as f64;
                assert!(
                    (path.compute(t, &points) - p).abs() < 1e-9,
                    "{path:?} misses control point {i}"
                );
            }
        }
    }

    #[test]
    fn test_linear_midpoints() {
        let points = [0.0, 10.0, 20.0];
        assert!((TweenPath::Linear.compute(0.25, &points) - 5.0).abs() < 1e-9);
        assert!((TweenPath::Linear.compute(0.75, &points) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_parameter_is_clamped() {
        let points = [1.0, 5.0, 9.0];
        for path in [TweenPath::CatmullRom, TweenPath::Linear] {
            assert_eq!(path.compute(-0.5, &points), 1.0);
            assert_eq!(path.compute(1.5, &points), 9.0);
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(TweenPath::CatmullRom.compute(0.3, &[]), 0.0);
        assert_eq!(TweenPath::CatmullRom.compute(0.3, &[4.0]), 4.0);
    }
}
