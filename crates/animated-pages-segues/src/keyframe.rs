//! Keyframes and their interpolation

use animated_pages::Style;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// One end of an animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Keyframe {
    pub opacity: f32,
    /// Translation in pixels (x, y, z)
    pub translate: [f32; 3],
    pub z_index: i32,
}

impl Default for Keyframe {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate: [0.0; 3],
            z_index: 0,
        }
    }
}

impl Keyframe {
    pub const fn new(opacity: f32, translate: [f32; 3], z_index: i32) -> Self {
        Self {
            opacity,
            translate,
            z_index,
        }
    }

    /// Fully opaque, untranslated
    pub const fn resting(z_index: i32) -> Self {
        Self::new(1.0, [0.0; 3], z_index)
    }

    /// Interpolate between two keyframes
    ///
    /// The stacking order is discrete: it switches to `b` at the very end.
    pub fn lerp(a: &Keyframe, b: &Keyframe, t: f32) -> Keyframe {
        let mix = |x: f32, y: f32| x + (y - x) * t;
        Keyframe {
            opacity: mix(a.opacity, b.opacity).clamp(0.0, 1.0),
            translate: [
                mix(a.translate[0], b.translate[0]),
                mix(a.translate[1], b.translate[1]),
                mix(a.translate[2], b.translate[2]),
            ],
            z_index: if t < 1.0 { a.z_index } else { b.z_index },
        }
    }
}

impl From<Keyframe> for Style {
    fn from(frame: Keyframe) -> Self {
        Style {
            opacity: frame.opacity,
            translate: frame.translate,
            z_index: frame.z_index,
        }
    }
}

/// Two-keyframe animation of a single element
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Effect {
    pub from: Keyframe,
    pub to: Keyframe,
    pub easing: Easing,
    /// Play from `to` back to `from`, easing curve included
    pub reverse: bool,
}

impl Effect {
    pub fn new(from: Keyframe, to: Keyframe) -> Self {
        Self {
            from,
            to,
            easing: Easing::Linear,
            reverse: false,
        }
    }

    pub fn with_easing(mut self, easing: impl Into<Easing>) -> Self {
        self.easing = easing.into();
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }

    /// Keyframe at `progress` (0.0 to 1.0)
    pub fn sample(&self, progress: f32) -> Keyframe {
        let progress = progress.clamp(0.0, 1.0);
        if self.reverse {
            Keyframe::lerp(&self.to, &self.from, 1.0 - self.easing.apply(1.0 - progress))
        } else {
            Keyframe::lerp(&self.from, &self.to, self.easing.apply(progress))
        }
    }
}
