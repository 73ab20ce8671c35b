use winit::event::WindowEvent;
use winit::window::Window;

use crate::device::WgpuDevice;
use crate::render::RenderSurface;
use crate::time::FrameTime;

use super::keys::KeyboardState;

/// Render surface type the runtime hands to applications.
pub type WindowSurface<'w> = RenderSurface<WgpuDevice<'w>>;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Everything an app can touch while producing one frame.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub surface: &'a mut WindowSurface<'w>,
    pub keys: &'a KeyboardState,
    pub time: FrameTime,
    /// Smoothed frames per second.
    pub fps: f32,
}

/// Application contract driven by [`Runtime`](super::Runtime).
pub trait App {
    /// Called once the window and its surface exist. Create textures here.
    fn on_start(&mut self, surface: &mut WindowSurface<'_>) -> anyhow::Result<()> {
        let _ = surface;
        Ok(())
    }

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw. Errors end the run unless they come from a
    /// surface that could not hand out a frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<AppControl>;

    /// Called before the surface is destroyed. Release textures here.
    fn on_exit(&mut self, surface: &mut WindowSurface<'_>) {
        let _ = surface;
    }
}
