//! 2D size type for stage dimensions

use serde::{Deserialize, Serialize};

/// 2D size for width and height
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Zero size
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Check if size is zero or negative in both dimensions
    ///
    /// A box that is zero wide but has height still occupies layout space,
    /// so only a box collapsed in both directions counts as empty.
    #[inline]
    pub fn is_collapsed(self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}
