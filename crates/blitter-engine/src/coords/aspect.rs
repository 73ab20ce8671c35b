use super::{Rect, Size};

/// Largest size with `content`'s aspect ratio that fits inside `container`.
///
/// When the container is relatively wider the height is pinned and the width
/// derived; otherwise the width is pinned. Derived dimensions are truncated.
///
/// Both sizes must have a positive height; a zero height is a caller bug.
pub fn fit_within_preserving_aspect(container: Size, content: Size) -> Size {
    debug_assert!(
        container.height > 0 && content.height > 0,
        "fit_within_preserving_aspect: zero height ({container:?}, {content:?})"
    );

    let content_aspect = content.width as f64 / content.height as f64;
    let container_aspect = container.width as f64 / container.height as f64;

    if container_aspect >= content_aspect {
        let height = container.height;
        let width = (height as f64 * content_aspect) as u32;
        Size::new(width.min(container.width), height)
    } else {
        let width = container.width;
        let height = (width as f64 / content_aspect) as u32;
        Size::new(width, height.min(container.height))
    }
}

/// Places `inner` at the center of `container`, in pixels.
///
/// Offsets are rounded down so the viewport stays on whole pixels.
pub fn centered_viewport(container: Size, inner: Size) -> Rect {
    let x = container.width.saturating_sub(inner.width) / 2;
    let y = container.height.saturating_sub(inner.height) / 2;
    Rect::new(x as f32, y as f32, inner.width as f32, inner.height as f32)
}
