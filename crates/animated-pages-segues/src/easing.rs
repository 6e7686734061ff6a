//! Easing functions for animations

use serde::{Deserialize, Serialize};

/// Ease-in-out cubic function
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Ease-out cubic function
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Ease-in cubic function
#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

/// Linear interpolation (no easing)
#[inline]
pub fn linear(t: f32) -> f32 {
    t
}

/// CSS-style cubic bezier timing curve through (0,0), (x1,y1), (x2,y2), (1,1)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

pub const EASE_IN_CIRC: CubicBezier = CubicBezier::new(0.600, 0.040, 0.980, 0.335);
pub const EASE_OUT_CIRC: CubicBezier = CubicBezier::new(0.075, 0.820, 0.165, 1.000);
pub const EASE_IN_OUT_CIRC: CubicBezier = CubicBezier::new(0.785, 0.135, 0.150, 0.860);
pub const EASE_IN_EXPO: CubicBezier = CubicBezier::new(0.950, 0.050, 0.795, 0.035);
pub const EASE_OUT_EXPO: CubicBezier = CubicBezier::new(0.190, 1.000, 0.220, 1.000);
pub const EASE_IN_OUT_EXPO: CubicBezier = CubicBezier::new(1.000, 0.000, 0.000, 1.000);
pub const EASE_IN_BACK: CubicBezier = CubicBezier::new(0.600, -0.280, 0.735, 0.045);
pub const EASE_OUT_BACK: CubicBezier = CubicBezier::new(0.175, 0.885, 0.320, 1.275);
pub const EASE_IN_OUT_BACK: CubicBezier = CubicBezier::new(0.680, -0.550, 0.265, 1.550);

impl CubicBezier {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Eased value at time `t`
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let s = self.solve_x(f64::from(t));
        bezier(s, f64::from(self.y1), f64::from(self.y2)) as f32
    }

    /// Curve parameter whose x coordinate is `x`
    fn solve_x(&self, x: f64) -> f64 {
        let (x1, x2) = (f64::from(self.x1), f64::from(self.x2));

        // Newton first, it converges in a few steps for sane curves
        let mut s = x;
        for _ in 0..8 {
            let error = bezier(s, x1, x2) - x;
            if error.abs() < 1e-6 {
                return s;
            }
            let slope = bezier_slope(s, x1, x2);
            if slope.abs() < 1e-6 {
                break;
            }
            s -= error / slope;
        }

        let (mut low, mut high) = (0.0, 1.0);
        s = x;
        while high - low > 1e-6 {
            if bezier(s, x1, x2) < x {
                low = s;
            } else {
                high = s;
            }
            s = (low + high) / 2.0;
        }
        s
    }
}

fn bezier(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Timing curve of a tween
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    EaseInOut,
    EaseInCubic,
    EaseOutCubic,
    CubicBezier(CubicBezier),
}

impl Easing {
    #[inline]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => linear(t),
            Easing::EaseInOut => ease_in_out(t),
            Easing::EaseInCubic => ease_in_cubic(t),
            Easing::EaseOutCubic => ease_out_cubic(t),
            Easing::CubicBezier(curve) => curve.apply(t),
        }
    }
}

impl From<CubicBezier> for Easing {
    fn from(curve: CubicBezier) -> Self {
        Easing::CubicBezier(curve)
    }
}
