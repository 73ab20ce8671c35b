//! Window + runtime loop.
//!
//! Owns the `winit` event loop and a single window whose render surface
//! borrows it, forwards keyboard and resize events, and drives an [`App`].

mod app;
mod keys;
mod runtime;

pub use app::{App, AppControl, FrameCtx, WindowSurface};
pub use keys::KeyboardState;
pub use runtime::{Runtime, RuntimeConfig};
pub use winit::keyboard::KeyCode;
