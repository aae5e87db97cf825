use serde::{Deserialize, Serialize};

/// Drawable surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Build a viewport, clamping both dimensions to at least one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Width over height, used for the projection matrix.
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_aspect() {
        let v = Viewport::new(1280, 720);
        assert!((v.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_viewport_is_clamped() {
        let v = Viewport::new(0, 0);
        assert_eq!(v, Viewport { width: 1, height: 1 });
        assert_eq!(v.aspect(), 1.0);
    }
}
