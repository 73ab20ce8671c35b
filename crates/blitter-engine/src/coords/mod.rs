//! Coordinate and geometry types for sprite drawing.
//!
//! Pixel space:
//! - origin top-left
//! - +X right, +Y down
//!
//! Quads are built in pixel space and converted to clip space on the CPU
//! before upload; shaders receive final clip-space positions.

mod aspect;
mod rect;
mod size;
mod transform;
mod vec2;

pub use aspect::{centered_viewport, fit_within_preserving_aspect};
pub use rect::Rect;
pub use size::Size;
pub use transform::{
    denormalize_point, normalize_point, normalize_rect, quad_triangle_areas, rotate_scale_rect,
    signed_area, triangle_signed_area, Quad, QUAD_INDICES,
};
pub use vec2::Vec2;
