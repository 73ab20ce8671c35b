/// Pixel dimensions of an image, window or render target.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`. Infinite or NaN for a zero height.
    #[inline]
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bytes of a tightly packed RGBA8 image of this size.
    #[inline]
    pub fn rgba8_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    #[inline]
    pub fn to_f32(self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

impl From<(u32, u32)> for Size {
    #[inline]
    fn from((width, height): (u32, u32)) -> Self {
        Size::new(width, height)
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Size {
    #[inline]
    fn from(s: winit::dpi::PhysicalSize<u32>) -> Self {
        Size::new(s.width, s.height)
    }
}
