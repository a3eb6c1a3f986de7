/// Drawable size in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or `None` when either side is zero.
    #[inline]
    pub fn aspect(self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_regular_viewport() {
        assert_eq!(Viewport::new(1920, 1080).aspect(), Some(1920.0 / 1080.0));
    }

    #[test]
    fn zero_sized_viewport_has_no_aspect() {
        assert_eq!(Viewport::new(0, 0).aspect(), None);
        assert_eq!(Viewport::new(800, 0).aspect(), None);
        assert_eq!(Viewport::new(0, 600).aspect(), None);
    }
}
