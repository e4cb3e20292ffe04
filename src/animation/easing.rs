/// Timing curves for dot and line animations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    /// Cubic Bézier (0.4, 0, 0.2, 1): accelerate quickly, settle slowly.
    FastOutSlowIn,
    /// Cubic Bézier (0, 0, 0.2, 1): start at full speed, settle slowly.
    LinearOutSlowIn,
}

impl Easing {
    /// Maps linear progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
            Easing::LinearOutSlowIn => cubic_bezier(0.0, 0.0, 0.2, 1.0, t),
        }
    }
}

fn bezier(p1: f32, p2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(p1: f32, p2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Evaluates the curve through (0,0), (x1,y1), (x2,y2), (1,1) at `x`.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    if x <= 0.0 || x >= 1.0 {
        return x;
    }

    // Newton first; fall back to bisection where the slope flattens out.
    let mut s = x;
    for _ in 0..8 {
        let err = bezier(x1, x2, s) - x;
        if err.abs() < 1e-5 {
            return bezier(y1, y2, s);
        }
        let slope = bezier_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    s = x;
    for _ in 0..32 {
        let value = bezier(x1, x2, s);
        if (value - x).abs() < 1e-5 {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier(y1, y2, s)
}
