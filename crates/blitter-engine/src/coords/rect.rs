use super::{Size, Vec2};

/// Axis-aligned rectangle in pixels (top-left origin).
///
/// Used both as a source selection into a texture and as a destination
/// selection into a render target. A rect with a non-positive width or height
/// is degenerate: drawing it produces a zero-area quad.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rect covering `(0, 0, size.width, size.height)`.
    #[inline]
    pub fn from_size(size: Size) -> Self {
        Rect::new(0.0, 0.0, size.width as f32, size.height as f32)
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.origin.x + self.size.x * 0.5,
            self.origin.y + self.size.y * 0.5,
        )
    }

    #[inline]
    pub fn top_left(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn top_right(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y)
    }

    #[inline]
    pub fn bottom_right(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn bottom_left(self) -> Vec2 {
        Vec2::new(self.origin.x, self.origin.y + self.size.y)
    }

    /// Corners in top-left, top-right, bottom-right, bottom-left order.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        [
            self.top_left(),
            self.top_right(),
            self.bottom_right(),
            self.bottom_left(),
        ]
    }

    /// Same size, moved so that its center sits on `center`.
    #[inline]
    pub fn centered_on(self, center: Vec2) -> Self {
        Rect::from_origin_size(
            Vec2::new(center.x - self.size.x * 0.5, center.y - self.size.y * 0.5),
            self.size,
        )
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }
}

impl From<[f32; 4]> for Rect {
    #[inline]
    fn from([x, y, w, h]: [f32; 4]) -> Self {
        Rect::new(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    #[test]
    fn corners_follow_clockwise_screen_order() {
        let c = r(10.0, 20.0, 30.0, 40.0).corners();
        assert_eq!(c[0], Vec2::new(10.0, 20.0));
        assert_eq!(c[1], Vec2::new(40.0, 20.0));
        assert_eq!(c[2], Vec2::new(40.0, 60.0));
        assert_eq!(c[3], Vec2::new(10.0, 60.0));
    }

    #[test]
    fn center_of_odd_sized_rect_is_fractional() {
        assert_eq!(r(0.0, 0.0, 5.0, 3.0).center(), Vec2::new(2.5, 1.5));
    }

    #[test]
    fn centered_on_keeps_size() {
        let moved = r(100.0, 100.0, 8.0, 4.0).centered_on(Vec2::zero());
        assert_eq!(moved, r(-4.0, -2.0, 8.0, 4.0));
    }

    #[test]
    fn from_size_starts_at_origin() {
        assert_eq!(Rect::from_size(Size::new(800, 400)), r(0.0, 0.0, 800.0, 400.0));
    }

    #[test]
    fn is_empty_zero_or_negative() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(r(0.0, 0.0, 5.0, -1.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
