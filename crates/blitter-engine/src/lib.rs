//! Minimal sprite blitting on wgpu.
//!
//! Textures are drawn onto an offscreen canvas (or onto other textures) with
//! optional rotation and scaling, then the canvas is letterboxed into the
//! window. GPU work goes through the [`device::GraphicsDevice`] trait so the
//! drawing logic also runs against [`device::HeadlessDevice`].

pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;

mod error;

pub use error::{RenderError, Result};
