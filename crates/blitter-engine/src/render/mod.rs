//! Sprite rendering on top of a [`GraphicsDevice`](crate::device::GraphicsDevice).
//!
//! Convention:
//! - rects are in pixels of the image they select from (top-left origin, +Y down)
//! - vertex positions reach the shaders already in clip space
//! - every draw uses its own short-lived pipeline

mod frame;
mod pipeline;
mod registry;
mod surface;
mod texture;

pub use frame::Frame;
pub use pipeline::{QuadVertex, QUAD_VERTEX_FORMAT, TEXTURE_SAMPLER};
pub use registry::SurfaceRegistry;
pub use surface::{DrawParams, RenderSurface, SurfaceConfig};
pub use texture::Texture;
